use crate::ast::{
    BinOp, Expr, ExprBinOp, ExprIntLit, ExprUnaryOp, Function, Program, Stmt, StmtReturn, UnaryOp,
};
use crate::loc::Loc;
use crate::token::{Token, TokenKind, TokenStream};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{loc} - expected {expected}, found '{}'", .found.lexeme)]
    UnexpectedToken {
        loc: Loc,
        found: Token,
        expected: String,
    },
    #[error("{loc} - expected {expected}, found end of input")]
    UnexpectedEof { loc: Loc, expected: String },
    #[error("{loc} - unexpected '{}' after end of function", .found.lexeme)]
    TrailingInput { loc: Loc, found: Token },
    #[error("{loc} - integer literal out of range: {lexeme}")]
    IntegerOutOfRange { loc: Loc, lexeme: String },
    #[error("{loc} - expression nested deeper than {limit} levels")]
    TooDeep { loc: Loc, limit: usize },
}

impl ParseError {
    pub fn loc(&self) -> &Loc {
        match self {
            ParseError::UnexpectedToken { loc, .. }
            | ParseError::UnexpectedEof { loc, .. }
            | ParseError::TrailingInput { loc, .. }
            | ParseError::IntegerOutOfRange { loc, .. }
            | ParseError::TooDeep { loc, .. } => loc,
        }
    }

    pub fn line(&self) -> usize {
        self.loc().line
    }
}

const LOGICAL_OR: &[(TokenKind, BinOp)] = &[(TokenKind::PipePipe, BinOp::Or)];
const LOGICAL_AND: &[(TokenKind, BinOp)] = &[(TokenKind::AmpAmp, BinOp::And)];
const EQUALITY: &[(TokenKind, BinOp)] = &[
    (TokenKind::EqEq, BinOp::Eq),
    (TokenKind::BangEq, BinOp::Ne),
];
const RELATIONAL: &[(TokenKind, BinOp)] = &[
    (TokenKind::Lt, BinOp::Lt),
    (TokenKind::Gt, BinOp::Gt),
    (TokenKind::Le, BinOp::Le),
    (TokenKind::Ge, BinOp::Ge),
];
const BIT_OR: &[(TokenKind, BinOp)] = &[(TokenKind::Pipe, BinOp::BitOr)];
const BIT_XOR: &[(TokenKind, BinOp)] = &[(TokenKind::Caret, BinOp::BitXor)];
const BIT_AND: &[(TokenKind, BinOp)] = &[(TokenKind::Amp, BinOp::BitAnd)];
const SHIFT: &[(TokenKind, BinOp)] = &[
    (TokenKind::Shl, BinOp::Shl),
    (TokenKind::Shr, BinOp::Shr),
];
const ADDITIVE: &[(TokenKind, BinOp)] = &[
    (TokenKind::Plus, BinOp::Add),
    (TokenKind::Minus, BinOp::Sub),
];
const TERM: &[(TokenKind, BinOp)] = &[
    (TokenKind::Star, BinOp::Mul),
    (TokenKind::Slash, BinOp::Div),
    (TokenKind::Percent, BinOp::Mod),
];

/// Bounds the height of the expression tree. Parentheses, unary operators
/// and each operator in a left-folded chain count one level.
pub const MAX_DEPTH: usize = 128;

// magnitude of i32::MIN, only valid right after a unary minus
const MIN_INT_MAGNITUDE: i64 = -(i32::MIN as i64);

#[derive(Debug)]
pub struct Parser {
    tokens: TokenStream,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: TokenStream) -> Parser {
        Parser { tokens, depth: 0 }
    }

    fn enter(&mut self, loc: &Loc) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                loc: loc.clone(),
                limit: MAX_DEPTH,
            });
        }
        Ok(())
    }

    fn next(&mut self, expected: &str) -> Result<Token, ParseError> {
        self.tokens.pop_front().map_err(|_| ParseError::UnexpectedEof {
            loc: self.tokens.eof_loc().clone(),
            expected: expected.to_string(),
        })
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.next(&kind.to_string())?;
        if token.kind != kind {
            return Err(ParseError::UnexpectedToken {
                loc: token.loc.clone(),
                found: token,
                expected: kind.to_string(),
            });
        }
        Ok(token)
    }

    /// Pops the next token if it is one of `ops`, otherwise leaves the stream untouched.
    fn next_op(&mut self, ops: &[(TokenKind, BinOp)]) -> Option<(Token, BinOp)> {
        let token = self.tokens.pop_front().ok()?;
        match ops.iter().find(|(kind, _)| *kind == token.kind) {
            Some((_, op)) => Some((token, *op)),
            None => {
                self.tokens.push_front(token);
                None
            }
        }
    }

    // operand { op operand }, folded to the left
    fn bin_op_left(
        &mut self,
        ops: &[(TokenKind, BinOp)],
        operand: fn(&mut Parser) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let depth = self.depth;
        let mut lhs = operand(self)?;
        while let Some((token, op)) = self.next_op(ops) {
            self.enter(&token.loc)?;
            let rhs = operand(self)?;
            lhs = Expr::BinOp(ExprBinOp {
                loc: token.loc,
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });
        }
        self.depth = depth;
        Ok(lhs)
    }

    pub fn expr(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(LOGICAL_OR, Parser::logical_and)
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(LOGICAL_AND, Parser::equality)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(EQUALITY, Parser::relational)
    }

    fn relational(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(RELATIONAL, Parser::bit_or)
    }

    fn bit_or(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(BIT_OR, Parser::bit_xor)
    }

    fn bit_xor(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(BIT_XOR, Parser::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(BIT_AND, Parser::shift)
    }

    fn shift(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(SHIFT, Parser::additive)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(ADDITIVE, Parser::term)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        self.bin_op_left(TERM, Parser::factor)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let token = self.next("expression")?;
        let op = match token.kind {
            TokenKind::OpenParen => {
                self.enter(&token.loc)?;
                let expr = self.expr()?;
                self.expect(TokenKind::CloseParen)?;
                self.depth -= 1;
                return Ok(expr);
            }
            TokenKind::IntLit => return Self::int_lit(token),
            TokenKind::Minus => {
                if let Some(expr) = self.min_int_lit(&token) {
                    return Ok(expr);
                }
                UnaryOp::Neg
            }
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Bang => UnaryOp::Not,
            _ => {
                return Err(ParseError::UnexpectedToken {
                    loc: token.loc.clone(),
                    found: token,
                    expected: "expression".to_string(),
                })
            }
        };
        self.enter(&token.loc)?;
        let expr = self.factor()?;
        self.depth -= 1;
        Ok(Expr::UnaryOp(ExprUnaryOp {
            loc: token.loc,
            op,
            expr: Box::new(expr),
        }))
    }

    fn int_lit(token: Token) -> Result<Expr, ParseError> {
        let Ok(value) = token.lexeme.parse::<i32>() else {
            return Err(ParseError::IntegerOutOfRange {
                loc: token.loc,
                lexeme: token.lexeme,
            });
        };
        Ok(Expr::IntLit(ExprIntLit {
            loc: token.loc,
            value,
        }))
    }

    /// `-2147483648` is folded into one literal, since its magnitude alone
    /// does not fit in an `i32`.
    fn min_int_lit(&mut self, minus: &Token) -> Option<Expr> {
        let token = self.tokens.pop_front().ok()?;
        if token.kind == TokenKind::IntLit && token.lexeme.parse::<i64>() == Ok(MIN_INT_MAGNITUDE) {
            return Some(Expr::IntLit(ExprIntLit {
                loc: minus.loc.clone(),
                value: i32::MIN,
            }));
        }
        self.tokens.push_front(token);
        None
    }

    fn stmt(&mut self) -> Result<Stmt, ParseError> {
        let token = self.expect(TokenKind::Return)?;
        let expr = self.expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Return(StmtReturn {
            loc: token.loc,
            expr,
        }))
    }

    fn func(&mut self) -> Result<Function, ParseError> {
        let token = self.expect(TokenKind::Int)?;
        let name = self.expect(TokenKind::Ident)?.lexeme;
        self.expect(TokenKind::OpenParen)?;
        self.expect(TokenKind::CloseParen)?;
        self.expect(TokenKind::OpenBrace)?;
        let body = self.stmt()?;
        self.expect(TokenKind::CloseBrace)?;
        Ok(Function {
            loc: token.loc,
            name,
            body,
        })
    }

    fn eof(&mut self) -> Result<(), ParseError> {
        match self.tokens.pop_front() {
            Ok(token) => Err(ParseError::TrailingInput {
                loc: token.loc.clone(),
                found: token,
            }),
            Err(_) => Ok(()),
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let func = self.func()?;
        self.eof()?;
        let program = Program { func };
        debug!(ast = %program, "parsed program");
        Ok(program)
    }
}

pub fn parse(tokens: TokenStream) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}
