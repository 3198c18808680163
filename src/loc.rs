use std::fmt;

/// A position in a source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loc {
    pub filename: String,
    pub line: usize,
    pub col: usize,
}

impl Loc {
    pub fn start(filename: impl Into<String>) -> Loc {
        Loc {
            filename: filename.into(),
            line: 1,
            col: 1,
        }
    }

    /// Moves past `c`, starting a new line after `'\n'`.
    pub fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.col)
    }
}

pub trait Locatable {
    fn loc(&self) -> &Loc;
}
