mod ast;
mod error;
mod grammar;
mod locations;
pub mod tokenizer;

pub use ast::*;
pub use error::Error;
pub use grammar::{parse, Parser};
pub use locations::{Location, Span};
pub use tokenizer::{tokenize_file, tokenize_string, Token, TokenType, Tokenizer};
