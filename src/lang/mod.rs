/*!
## Language Module

Lexical analysis and parsing for the concatenative source language.
A line of text becomes a flat token list, then a tree of nodes with
quotations nested under their brackets.

*/

pub type Column = std::ops::Range<usize>;

#[macro_use]
mod error;
mod lex;
mod node;
mod parse;

pub use error::Error;
pub use error::ErrorCode;
pub use lex::lex;
pub use node::Node;
pub use parse::parse;

/// Lex and parse a full source line.
pub fn read(source_line: &str) -> Result<Vec<Node>, Error> {
    parse(&lex(source_line)?)
}
