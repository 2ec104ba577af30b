use super::dictionary::{Dictionary, Forced, Lazy};
use super::op::{disassemble, opcode, Op};
use crate::lang::{self, Error, Node};

type Result<T> = std::result::Result<T, Error>;

/// Secondary definitions compiled lazily from source, newest last. The
/// truth value is -1 so the bitwise words double as logical ones.
const LIBRARY: &[(&str, &str)] = &[
    ("true", "-1"),
    ("high", "-1"),
    ("on", "-1"),
    ("false", "0"),
    ("low", "0"),
    ("off", "0"),
    ("input", "0"),
    ("output", "1"),
    ("change", "1"),
    ("falling", "2"),
    ("rising", "3"),
    ("data", "data16"),
    ("over", "1 pick"),
    ("rot", "2 roll"),
    ("nip", "swap drop"),
    ("tuck", "dup push swap pop"),
    ("dip", "swap push call pop"),
    ("keep", "over push call pop"),
    ("bi", "push keep pop call"),
    ("tri", "push push keep pop keep pop call"),
    ("bi@", "dup push dip pop call"),
    ("both?", "bi@ and"),
    ("either?", "bi@ or"),
    ("square", "dup *"),
    ("abs", "dup 0 < 'neg if"),
    ("min", "over over > 'swap if drop"),
    ("max", "over over < 'swap if drop"),
    ("clamp", "push max pop min"),
    ("sign", "dup 0 < swap 0 > -"),
    ("+!", "dup push @ + pop !"),
    ("-!", "push neg pop +!"),
    ("sum", "dup 1+ * 2 /"),
    ("elapsed", "milliseconds swap -"),
    ("after?", "push elapsed pop >="),
];

/// Compiler state for one tethered device: the dictionary, the next free
/// device address, and byte code shrunk out of definitions but not yet
/// flushed down the wire.
#[derive(Debug, Default)]
pub struct Compiler {
    dict: Dictionary,
    address: i16,
    pending: Vec<u8>,
}

impl Compiler {
    pub fn new() -> Compiler {
        let mut compiler = Compiler::default();
        compiler.reset();
        compiler
    }

    /// Drop everything and rebuild the initial dictionary. The paired
    /// device reset is the caller's business.
    pub fn reset(&mut self) {
        self.dict.clear();
        self.address = 0;
        self.pending.clear();
        for op in Op::primitives() {
            let byte = op.code().expect("primitive opcode");
            let name = op.name().expect("primitive name");
            self.dict.define(Some(op.clone()), name, Lazy::done(vec![byte]));
        }
        for &(name, byte) in &[
            ("(lit8)", opcode::LIT8),
            ("(lit16)", opcode::LIT16),
            ("(branch)", opcode::BRANCH),
            ("(0branch)", opcode::ZBRANCH),
            ("(quote)", opcode::QUOTE),
        ] {
            self.dict.define(None, name, Lazy::done(vec![byte]));
        }
        for (name, source) in LIBRARY {
            let nodes = lang::read(source).expect("library source");
            self.dict.define(None, name, Lazy::Source(nodes));
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Next free device dictionary byte.
    pub fn address(&self) -> i16 {
        self.address
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn take_pending(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.pending)
    }

    /// Register a named definition; nothing is assembled until first use.
    pub fn define(&mut self, name: &str, body: Vec<Node>) {
        self.dict.define(None, name, Lazy::Source(body));
    }

    /// Bind a name to a raw one-byte device extension opcode.
    pub fn define_instruction(&mut self, name: &str, byte: u8) {
        self.dict
            .define(Some(Op::User(byte)), name, Lazy::done(vec![byte]));
    }

    /// Register a variable: a quotation around a bare return. Executed, it
    /// pushes the address of its own two-byte body, which is the cell.
    pub fn define_variable(&mut self, name: &str) {
        let cell = Node::Quotation(vec![Node::Token("(return)".to_string())]);
        self.dict.define(None, name, Lazy::Source(vec![cell]));
    }

    /// Assemble a node list to byte code, now. Tokens inline the forced
    /// code of their definition; numbers become literals; addresses become
    /// calls; quotations nest.
    pub fn eager(&mut self, nodes: &[Node]) -> Result<Vec<u8>> {
        let mut code = vec![];
        for node in nodes {
            match node {
                Node::Token(token) => code.extend(self.force(token)?),
                Node::Number(number) => {
                    code.extend(Op::Literal(*number).encode(&self.dict)?)
                }
                Node::Address(addr) => {
                    let word = Op::Word {
                        addr: *addr,
                        name: format!("({})", addr),
                    };
                    code.extend(word.encode(&self.dict)?);
                }
                Node::Quotation(children) => code.extend(self.quotation(children)?),
            }
        }
        Ok(code)
    }

    fn quotation(&mut self, children: &[Node]) -> Result<Vec<u8>> {
        let body = self.eager(children)?;
        // a single-call quotation degenerates to pushing the callee address
        if let [Op::Word { addr, .. }] = disassemble(&body, &self.dict).as_slice() {
            return Op::Literal(*addr).encode(&self.dict);
        }
        let len = body.len() + 1; // the trailing return makes it callable
        if len > u8::max_value() as usize {
            return Err(error!(QuoteTooLarge));
        }
        let mut code = vec![opcode::QUOTE, len as u8];
        code.extend(body);
        code.push(opcode::RETURN);
        Ok(code)
    }

    /// Produce the call-site bytes for a word, running its generator the
    /// first time. Forcing is idempotent: the second force returns the same
    /// bytes without touching `address` or `pending`.
    pub fn force(&mut self, name: &str) -> Result<Vec<u8>> {
        let index = match self.dict.position_by_name(name) {
            Some(index) => index,
            None => return Err(error!(UnknownWord; name)),
        };
        match &self.dict.get(index).code {
            Lazy::Done(forced) => return Ok(forced.bytes.clone()),
            Lazy::Forcing => return Err(error!(UnknownWord; name)),
            Lazy::Source(_) => {}
        }
        let source = match std::mem::replace(&mut self.dict.get_mut(index).code, Lazy::Forcing)
        {
            Lazy::Source(source) => source,
            _ => return Err(error!(InternalError; "LAZY STATE")),
        };
        let produced = self
            .eager(&source)
            .and_then(|code| self.shrink(name, code));
        match produced {
            Ok(forced) => {
                let bytes = forced.bytes.clone();
                self.dict.get_mut(index).code = Lazy::Done(forced);
                Ok(bytes)
            }
            Err(error) => {
                self.dict.get_mut(index).code = Lazy::Source(source);
                Err(error)
            }
        }
    }

    /// Decide whether freshly assembled code stays inline or migrates to
    /// the device. Two bytes or fewer inline as-is; anything larger is
    /// queued for commitment (with a trailing return) and call sites get a
    /// two-byte call to its address.
    fn shrink(&mut self, name: &str, code: Vec<u8>) -> Result<Forced> {
        if code.len() <= 2 {
            return Ok(Forced {
                bytes: code,
                committed: None,
            });
        }
        let addr = self.address;
        let call = Op::Word {
            addr,
            name: name.to_string(),
        }
        .encode(&self.dict)?;
        let next = addr as i32 + code.len() as i32 + 1;
        if next > i16::max_value() as i32 {
            return Err(error!(AddressOutOfRange; name));
        }
        self.pending.extend(&code);
        self.pending.push(opcode::RETURN);
        self.address = next as i16;
        Ok(Forced {
            bytes: call,
            committed: Some(addr),
        })
    }
}
