use crate::loc::Loc;
use crate::token::{Token, TokenKind, TokenStream};
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("{loc} - invalid character: {c:?}")]
    InvalidCharacter { loc: Loc, c: char },
}

/// Fixed lexemes in priority order: multi-character operators come before
/// their single-character prefixes.
const PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("&&", TokenKind::AmpAmp),
    ("||", TokenKind::PipePipe),
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::BangEq),
    ("<=", TokenKind::Le),
    (">=", TokenKind::Ge),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("{", TokenKind::OpenBrace),
    ("}", TokenKind::CloseBrace),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    (";", TokenKind::Semicolon),
    ("-", TokenKind::Minus),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("+", TokenKind::Plus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("&", TokenKind::Amp),
    ("|", TokenKind::Pipe),
    ("^", TokenKind::Caret),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
];

const KEYWORDS: &[(&str, TokenKind)] = &[
    ("int", TokenKind::Int),
    ("return", TokenKind::Return),
];

#[derive(Debug)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    virtual_pos: Loc,
}

impl Lexer {
    pub fn new(filename: String, input: String) -> Lexer {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            virtual_pos: Loc::start(filename),
        }
    }

    fn inc_pos(&mut self) {
        self.virtual_pos.advance(self.input[self.pos]);
        self.pos += 1;
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn rest(&self) -> &[char] {
        &self.input[self.pos..]
    }

    // [a-zA-Z][a-zA-Z0-9_]*
    fn word_len(&self) -> usize {
        let rest = self.rest();
        match rest.first() {
            Some(c) if c.is_ascii_alphabetic() => rest
                .iter()
                .take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
                .count(),
            _ => 0,
        }
    }

    // [0-9]+
    fn digits_len(&self) -> usize {
        self.rest().iter().take_while(|c| c.is_ascii_digit()).count()
    }

    fn starts_with(&self, lexeme: &str) -> bool {
        let rest = self.rest();
        lexeme.chars().count() <= rest.len() && lexeme.chars().zip(rest).all(|(a, b)| a == *b)
    }

    /// Longest match at the current position. Candidates are tried in
    /// priority order and only a strictly longer match replaces the current
    /// best, so equal-length ties go to the earlier candidate.
    fn longest_match(&self) -> Option<(usize, TokenKind)> {
        let mut best: Option<(usize, TokenKind)> = None;
        let mut consider = |len: usize, kind: TokenKind| {
            if len > 0 && best.map_or(true, |(best_len, _)| len > best_len) {
                best = Some((len, kind));
            }
        };

        let word_len = self.word_len();
        if word_len > 0 {
            let word = self.rest()[..word_len].iter().collect::<String>();
            let kind = KEYWORDS
                .iter()
                .find(|(keyword, _)| *keyword == word)
                .map_or(TokenKind::Ident, |(_, kind)| *kind);
            consider(word_len, kind);
        }

        consider(self.digits_len(), TokenKind::IntLit);

        for (lexeme, kind) in PUNCTUATORS {
            if self.starts_with(lexeme) {
                consider(lexeme.chars().count(), *kind);
            }
        }

        best
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.inc_pos();
        }
    }

    fn next_token_opt(&mut self) -> Result<Option<Token>, LexerError> {
        self.skip_whitespace();
        let Some(c) = self.peek() else {
            return Ok(None);
        };
        let begin_pos = self.virtual_pos.clone();
        let Some((len, kind)) = self.longest_match() else {
            return Err(LexerError::InvalidCharacter { loc: begin_pos, c });
        };

        let lexeme = self.rest()[..len].iter().collect::<String>();
        for _ in 0..len {
            self.inc_pos();
        }

        Ok(Some(Token {
            kind,
            lexeme,
            loc: begin_pos,
        }))
    }

    pub fn tokenize(&mut self) -> Result<TokenStream, LexerError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token_opt()? {
            trace!(%token, "lexed token");
            tokens.push(token);
        }
        debug!(
            file = %self.virtual_pos.filename,
            count = tokens.len(),
            "tokenized source"
        );
        Ok(TokenStream::new(tokens, self.virtual_pos.clone()))
    }
}

pub fn tokenize(
    filename: impl Into<String>,
    source: impl Into<String>,
) -> Result<TokenStream, LexerError> {
    Lexer::new(filename.into(), source.into()).tokenize()
}
