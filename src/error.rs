use crate::generator::CodegenError;
use crate::lexer::LexerError;
use crate::parser::ParseError;
use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Every way a compilation can fail. All of them abort the run.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        action: &'static str,
        source: io::Error,
    },
    #[error("out of memory while reading {}: {source}", .path.display())]
    Allocation {
        path: PathBuf,
        source: TryReserveError,
    },
    #[error("{}: can only compile .c files", .path.display())]
    InvalidExtension { path: PathBuf },
    #[error(transparent)]
    Lex(#[from] LexerError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
