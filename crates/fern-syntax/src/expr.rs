//! Expression syntax nodes.
//! 表达式语法节点。

use crate::{ExprId, Ident};
use fern_common::Span;

/// An expression.
/// 表达式。
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression kind.
/// 表达式类型。
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Variable reference / 名字引用
    Name(Ident),
    /// `f(x)` or `a(i)`; the parser cannot tell them apart / 函数调用或数组元素
    FuncCallOrArray { name: Ident, args: Vec<ExprId> },
    /// Integer literal / 整数字面量
    Int(i64),
    /// Real literal, as written / 实数字面量（原文）
    Real(String),
    /// `.true.` / `.false.` / 逻辑字面量
    Logical(bool),
    /// Character literal / 字符字面量
    Str(String),
    /// Arithmetic `a + b` / 算术运算
    BinOp {
        op: BinOp,
        left: ExprId,
        right: ExprId,
    },
    /// `-a` / `+a` / 一元运算
    UnaryOp { op: UnaryOp, operand: ExprId },
    /// Relational `a < b` / 关系运算
    Compare {
        op: CmpOp,
        left: ExprId,
        right: ExprId,
    },
    /// `.and.` / `.or.` / 逻辑运算
    BoolOp {
        op: BoolOp,
        left: ExprId,
        right: ExprId,
    },
    /// `.not. a` / 逻辑非
    Not(ExprId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::NotEq => "/=",
            CmpOp::Lt => "<",
            CmpOp::LtEq => "<=",
            CmpOp::Gt => ">",
            CmpOp::GtEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BoolOp::And => ".and.",
            BoolOp::Or => ".or.",
        }
    }
}
