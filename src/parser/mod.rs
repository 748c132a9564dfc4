//! Parser for snippet class definitions

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse_snippet;
pub(crate) use grammar::rfind_word;
