pub mod interpreter;
pub mod parser;

pub use interpreter::{evaluate, Environment, Evaluator, Object};
pub use parser::{parse, tokenize_file, tokenize_string, Parser, Program};
