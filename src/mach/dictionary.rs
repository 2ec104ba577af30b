use super::op::Op;
use crate::lang::Node;

/// The outcome of forcing a definition: the bytes a call site inlines, and
/// the device address the body was committed to, if it migrated.
#[derive(Debug, Clone, PartialEq)]
pub struct Forced {
    pub bytes: Vec<u8>,
    pub committed: Option<i16>,
}

/// Suspended byte-code generation.
///
/// A definition starts as unassembled source and becomes a memoized
/// `Forced` record the first time a call site needs its bytes. `Forcing`
/// marks a definition whose generator is on the stack right now; the word
/// is invisible to its own body.
#[derive(Debug, Clone, PartialEq)]
pub enum Lazy {
    Source(Vec<Node>),
    Forcing,
    Done(Forced),
}

impl Lazy {
    pub fn done(bytes: Vec<u8>) -> Lazy {
        Lazy::Done(Forced {
            bytes,
            committed: None,
        })
    }

    /// Bytes already produced, if this has been forced.
    pub fn produced(&self) -> Option<&[u8]> {
        match self {
            Lazy::Done(forced) => Some(&forced.bytes),
            _ => None,
        }
    }

    pub fn committed(&self) -> Option<i16> {
        match self {
            Lazy::Done(forced) => forced.committed,
            _ => None,
        }
    }
}

/// One named entry. `brief` is set when the word is a host-visible alias
/// for a primitive instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub brief: Option<Op>,
    pub word: String,
    pub code: Lazy,
}

/// An ordered list of definitions. All lookups walk newest-first so that a
/// redefinition shadows everything before it; entries are appended, never
/// patched.
#[derive(Debug, Default)]
pub struct Dictionary {
    defs: Vec<Definition>,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary::default()
    }

    pub fn define(&mut self, brief: Option<Op>, word: &str, code: Lazy) {
        self.defs.push(Definition {
            brief,
            word: word.to_string(),
            code,
        });
    }

    pub fn find_by_name(&self, word: &str) -> Option<&Definition> {
        self.defs.iter().rev().find(|def| def.word == word)
    }

    pub fn find_by_brief(&self, op: &Op) -> Option<&Definition> {
        self.defs.iter().rev().find(|def| def.brief.as_ref() == Some(op))
    }

    /// Exact produced-byte lookup; only the disassembler wants this.
    pub fn find_by_code(&self, bytes: &[u8]) -> Option<&Definition> {
        self.defs
            .iter()
            .rev()
            .find(|def| def.code.produced() == Some(bytes))
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Definition> {
        self.defs.iter().rev()
    }

    pub(crate) fn position_by_name(&self, word: &str) -> Option<usize> {
        self.defs.iter().rposition(|def| def.word == word)
    }

    pub(crate) fn get(&self, index: usize) -> &Definition {
        &self.defs[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut Definition {
        &mut self.defs[index]
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn clear(&mut self) {
        self.defs.clear();
    }
}
