use crate::ast::{
    BinOp, Expr, ExprBinOp, ExprIntLit, ExprUnaryOp, Function, Program, Stmt, UnaryOp,
};
use crate::loc::{Loc, Locatable};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{loc}: {message}")]
pub struct CodegenError {
    loc: Loc,
    message: String,
}

/// Lowers one program to 32-bit AT&T assembly.
///
/// Every expression leaves its value in `%eax`. A binary operator saves one
/// operand on the stack while the other is computed, then pops it into
/// `%ecx`. Label numbers are only unique within one `Generator`.
#[derive(Debug)]
struct Generator {
    output: String,
    label_count: usize,
}

impl Generator {
    fn new() -> Generator {
        Generator {
            output: String::new(),
            label_count: 0,
        }
    }

    fn instr(&mut self, instr: impl AsRef<str>) {
        self.output.push_str("    ");
        self.output.push_str(instr.as_ref());
        self.output.push('\n');
    }

    fn label(&mut self, label: &str) {
        self.output.push_str(label);
        self.output.push_str(":\n");
    }

    fn new_label(&mut self, prefix: &str) -> String {
        let label = format!(".L{}{}", prefix, self.label_count);
        self.label_count += 1;
        label
    }

    fn program(&mut self, program: &Program) -> Result<(), CodegenError> {
        self.func(&program.func)?;
        self.instr(".section .note.GNU-stack,\"\",@progbits");
        Ok(())
    }

    fn func(&mut self, x: &Function) -> Result<(), CodegenError> {
        if !is_symbol(&x.name) {
            return Err(CodegenError {
                loc: x.loc().clone(),
                message: format!("invalid function name: {:?}", x.name),
            });
        }
        self.instr(format!(".globl {}", x.name));
        self.label(&x.name);
        self.stmt(&x.body);
        self.instr("ret");
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            // the epilogue returns whatever is left in %eax
            Stmt::Return(x) => self.expr(&x.expr),
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::IntLit(x) => self.expr_int_lit(x),
            Expr::UnaryOp(x) => self.expr_unary_op(x),
            Expr::BinOp(x) => self.expr_bin_op(x),
        }
    }

    fn expr_int_lit(&mut self, x: &ExprIntLit) {
        self.instr(format!("movl ${}, %eax", x.value));
    }

    fn expr_unary_op(&mut self, x: &ExprUnaryOp) {
        self.expr(&x.expr);
        match x.op {
            UnaryOp::Neg => self.instr("negl %eax"),
            UnaryOp::BitNot => self.instr("notl %eax"),
            UnaryOp::Not => {
                self.instr("cmpl $0, %eax");
                self.instr("movl $0, %eax");
                self.instr("sete %al");
            }
        }
    }

    /// Leaves `first` in `%ecx` and `second` in `%eax`.
    fn operands(&mut self, first: &Expr, second: &Expr) {
        self.expr(first);
        self.instr("pushl %eax");
        self.expr(second);
        self.instr("popl %ecx");
    }

    fn expr_bin_op(&mut self, x: &ExprBinOp) {
        match x.op {
            BinOp::Add => self.bin_op_commutative(&x.lhs, &x.rhs, "addl %ecx, %eax"),
            BinOp::Mul => self.bin_op_commutative(&x.lhs, &x.rhs, "imull %ecx, %eax"),
            BinOp::BitAnd => self.bin_op_commutative(&x.lhs, &x.rhs, "andl %ecx, %eax"),
            BinOp::BitOr => self.bin_op_commutative(&x.lhs, &x.rhs, "orl %ecx, %eax"),
            BinOp::BitXor => self.bin_op_commutative(&x.lhs, &x.rhs, "xorl %ecx, %eax"),
            BinOp::Sub => {
                self.operands(&x.rhs, &x.lhs);
                self.instr("subl %ecx, %eax");
            }
            BinOp::Div => {
                self.operands(&x.rhs, &x.lhs);
                self.instr("cdq");
                self.instr("idivl %ecx");
            }
            BinOp::Mod => {
                self.operands(&x.rhs, &x.lhs);
                self.instr("cdq");
                self.instr("idivl %ecx");
                self.instr("movl %edx, %eax");
            }
            BinOp::Shl => {
                self.operands(&x.rhs, &x.lhs);
                self.instr("shll %cl, %eax");
            }
            BinOp::Shr => {
                self.operands(&x.rhs, &x.lhs);
                self.instr("sarl %cl, %eax");
            }
            BinOp::Eq => self.bin_op_compare(&x.lhs, &x.rhs, "sete"),
            BinOp::Ne => self.bin_op_compare(&x.lhs, &x.rhs, "setne"),
            BinOp::Lt => self.bin_op_compare(&x.lhs, &x.rhs, "setl"),
            BinOp::Le => self.bin_op_compare(&x.lhs, &x.rhs, "setle"),
            BinOp::Gt => self.bin_op_compare(&x.lhs, &x.rhs, "setg"),
            BinOp::Ge => self.bin_op_compare(&x.lhs, &x.rhs, "setge"),
            BinOp::And => self.bin_op_and(&x.lhs, &x.rhs),
            BinOp::Or => self.bin_op_or(&x.lhs, &x.rhs),
        }
    }

    fn bin_op_commutative(&mut self, lhs: &Expr, rhs: &Expr, instr: &str) {
        self.operands(lhs, rhs);
        self.instr(instr);
    }

    fn bin_op_compare(&mut self, lhs: &Expr, rhs: &Expr, set: &str) {
        self.operands(lhs, rhs);
        self.instr("cmpl %eax, %ecx");
        self.instr("movl $0, %eax");
        self.instr(format!("{} %al", set));
    }

    // %eax = (%eax != 0)
    fn normalize_bool(&mut self) {
        self.instr("cmpl $0, %eax");
        self.instr("movl $0, %eax");
        self.instr("setne %al");
    }

    fn bin_op_and(&mut self, lhs: &Expr, rhs: &Expr) {
        let clause = self.new_label("clause");
        let end = self.new_label("end");
        self.expr(lhs);
        self.instr("cmpl $0, %eax");
        self.instr(format!("jne {}", clause));
        // %eax is already 0
        self.instr(format!("jmp {}", end));
        self.label(&clause);
        self.expr(rhs);
        self.normalize_bool();
        self.label(&end);
    }

    fn bin_op_or(&mut self, lhs: &Expr, rhs: &Expr) {
        let clause = self.new_label("clause");
        let end = self.new_label("end");
        self.expr(lhs);
        self.instr("cmpl $0, %eax");
        self.instr(format!("je {}", clause));
        self.instr("movl $1, %eax");
        self.instr(format!("jmp {}", end));
        self.label(&clause);
        self.expr(rhs);
        self.normalize_bool();
        self.label(&end);
    }
}

fn is_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn generate(program: &Program) -> Result<String, CodegenError> {
    let mut gen = Generator::new();
    gen.program(program)?;
    debug!(
        bytes = gen.output.len(),
        labels = gen.label_count,
        "generated assembly"
    );
    Ok(gen.output)
}
