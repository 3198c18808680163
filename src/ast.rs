use crate::loc::{Loc, Locatable};
use derive_more::Display;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub func: Function,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub loc: Loc,
    pub name: String,
    pub body: Stmt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Return(StmtReturn),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StmtReturn {
    pub loc: Loc,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    IntLit(ExprIntLit),
    UnaryOp(ExprUnaryOp),
    BinOp(ExprBinOp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprIntLit {
    pub loc: Loc,
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum UnaryOp {
    #[display(fmt = "-")]
    Neg,
    #[display(fmt = "~")]
    BitNot,
    #[display(fmt = "!")]
    Not,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprUnaryOp {
    pub loc: Loc,
    pub op: UnaryOp,
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinOp {
    #[display(fmt = "+")]
    Add,
    #[display(fmt = "-")]
    Sub,
    #[display(fmt = "*")]
    Mul,
    #[display(fmt = "/")]
    Div,
    #[display(fmt = "%")]
    Mod,
    #[display(fmt = "<<")]
    Shl,
    #[display(fmt = ">>")]
    Shr,
    #[display(fmt = "&")]
    BitAnd,
    #[display(fmt = "^")]
    BitXor,
    #[display(fmt = "|")]
    BitOr,
    #[display(fmt = "<")]
    Lt,
    #[display(fmt = "<=")]
    Le,
    #[display(fmt = ">")]
    Gt,
    #[display(fmt = ">=")]
    Ge,
    #[display(fmt = "==")]
    Eq,
    #[display(fmt = "!=")]
    Ne,
    #[display(fmt = "&&")]
    And,
    #[display(fmt = "||")]
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprBinOp {
    pub loc: Loc,
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

impl Locatable for Expr {
    fn loc(&self) -> &Loc {
        match self {
            Expr::IntLit(x) => &x.loc,
            Expr::UnaryOp(x) => &x.loc,
            Expr::BinOp(x) => &x.loc,
        }
    }
}

impl Locatable for Stmt {
    fn loc(&self) -> &Loc {
        match self {
            Stmt::Return(x) => &x.loc,
        }
    }
}

impl Locatable for Function {
    fn loc(&self) -> &Loc {
        &self.loc
    }
}

// Fully parenthesised prefix form, e.g. `(+ 1 (* 2 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::IntLit(x) => write!(f, "{}", x.value),
            Expr::UnaryOp(x) => write!(f, "({} {})", x.op, x.expr),
            Expr::BinOp(x) => write!(f, "({} {} {})", x.op, x.lhs, x.rhs),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Return(x) => write!(f, "return {};", x.expr),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "int {}() {{ {} }}", self.func.name, self.func.body)
    }
}
