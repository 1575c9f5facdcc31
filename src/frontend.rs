//! # Frontend for CSawIR
//!
//! The textual form is line-oriented: every line is split into tokens by
//! [Lexer], and [Parser] reads a module line by line into a
//! [Context](crate::ir::Context).

mod lexer;
mod parser;
mod tokens;

pub use lexer::Lexer;
pub use parser::{parse_file, parse_str, ParseError, Parser};
pub use tokens::{Token, TokenKind};
