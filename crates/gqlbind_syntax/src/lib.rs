//! Syntax layer for gqlbind.
//!
//! This crate provides:
//! - `token`: Token kinds and token structures
//! - `lexer`: Tokenization
//! - `ast`: Owned abstract syntax tree for type-system documents
//! - `parser`: Fail-fast recursive descent parser

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{parse, Parser, SyntaxError};
pub use token::{Token, TokenKind};
