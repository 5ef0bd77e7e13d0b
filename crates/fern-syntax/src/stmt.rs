//! Statement syntax nodes.
//! 语句语法节点。

use crate::{ExprId, Ident, StmtId};
use fern_common::Span;

/// An executable statement.
/// 可执行语句。
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kind.
/// 语句类型。
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `x = expr` / 赋值
    Assignment { target: ExprId, value: ExprId },
    /// `allocate(a(n), b(n, m))` / 分配
    Allocate(Vec<ExprId>),
    /// `deallocate(a, b)` / 释放
    Deallocate(Vec<Ident>),
    /// `if (cond) then ... else ... end if` / 条件语句
    If {
        cond: ExprId,
        then_body: Vec<StmtId>,
        else_body: Vec<StmtId>,
    },
    /// `do i = start, end[, step] ... end do` / 计数循环
    Do {
        var: Ident,
        start: ExprId,
        end: ExprId,
        step: Option<ExprId>,
        body: Vec<StmtId>,
    },
    /// `call name(args)` / 子程序调用
    Call { name: Ident, args: Vec<ExprId> },
    /// `print *, items` / 输出
    Print(Vec<ExprId>),
    Return,
}
