pub mod ast;
pub mod driver;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod loc;
pub mod parser;
pub mod token;

pub use error::CompileError;

use lexer::Lexer;
use parser::Parser;

/// Runs the whole pipeline on in-memory source and returns the assembly text.
pub fn compile(filename: &str, source: String) -> Result<String, CompileError> {
    let tokens = Lexer::new(filename.to_string(), source).tokenize()?;
    let program = Parser::new(tokens).parse_program()?;
    let asm = generator::generate(&program)?;
    Ok(asm)
}
