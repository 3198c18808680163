use crate::loc::Loc;
use derive_more::Display;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TokenKind {
    #[display(fmt = "'{{'")]
    OpenBrace,
    #[display(fmt = "'}}'")]
    CloseBrace,
    #[display(fmt = "'('")]
    OpenParen,
    #[display(fmt = "')'")]
    CloseParen,
    #[display(fmt = "';'")]
    Semicolon,

    #[display(fmt = "'int'")]
    Int,
    #[display(fmt = "'return'")]
    Return,

    #[display(fmt = "integer literal")]
    IntLit,
    #[display(fmt = "identifier")]
    Ident,

    // `-` doubles as binary subtraction
    #[display(fmt = "'-'")]
    Minus,
    #[display(fmt = "'~'")]
    Tilde,
    #[display(fmt = "'!'")]
    Bang,

    #[display(fmt = "'+'")]
    Plus,
    #[display(fmt = "'*'")]
    Star,
    #[display(fmt = "'/'")]
    Slash,
    #[display(fmt = "'%'")]
    Percent,
    #[display(fmt = "'&'")]
    Amp,
    #[display(fmt = "'|'")]
    Pipe,
    #[display(fmt = "'^'")]
    Caret,
    #[display(fmt = "'&&'")]
    AmpAmp,
    #[display(fmt = "'||'")]
    PipePipe,
    #[display(fmt = "'=='")]
    EqEq,
    #[display(fmt = "'!='")]
    BangEq,
    #[display(fmt = "'<'")]
    Lt,
    #[display(fmt = "'<='")]
    Le,
    #[display(fmt = "'>'")]
    Gt,
    #[display(fmt = "'>='")]
    Ge,
    #[display(fmt = "'<<'")]
    Shl,
    #[display(fmt = "'>>'")]
    Shr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub loc: Loc,
}

impl Token {
    pub fn line(&self) -> usize {
        self.loc.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} '{}' at line {}", self.kind, self.lexeme, self.loc.line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyStream;

/// Tokens of one compilation unit, drained front to back by the parser.
///
/// Popping only advances a cursor; the backing vector is never shifted.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    idx: usize,
    eof: Loc,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, eof: Loc) -> TokenStream {
        TokenStream {
            tokens,
            idx: 0,
            eof,
        }
    }

    pub fn pop_front(&mut self) -> Result<Token, EmptyStream> {
        let token = self.tokens.get(self.idx).cloned().ok_or(EmptyStream)?;
        self.idx += 1;
        Ok(token)
    }

    pub fn peek_front(&self) -> Result<&Token, EmptyStream> {
        self.tokens.get(self.idx).ok_or(EmptyStream)
    }

    /// Puts `token` back in front of the remaining tokens.
    pub fn push_front(&mut self, token: Token) {
        if self.idx > 0 {
            self.idx -= 1;
            self.tokens[self.idx] = token;
        } else {
            self.tokens.insert(0, token);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.idx >= self.tokens.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len() - self.idx.min(self.tokens.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens[self.idx..].iter()
    }

    /// Where the source ended, used to report a premature end of input.
    pub fn eof_loc(&self) -> &Loc {
        &self.eof
    }
}
