//! Storage for syntax nodes.
//! 语法节点的存储。

use crate::{Expr, Ident, Stmt};
use fern_common::{Arena, Idx, Interner, Name, Span};

pub type ExprId = Idx<Expr>;
pub type StmtId = Idx<Stmt>;

/// Owns every expression, statement and name of one parse.
/// 拥有一次解析的全部表达式、语句与名字。
#[derive(Debug, Default)]
pub struct AstArena {
    pub exprs: Arena<Expr>,
    pub stmts: Arena<Stmt>,
    pub names: Interner,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.alloc(stmt)
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    /// Intern `text` and pair it with `span`.
    pub fn ident(&mut self, text: &str, span: Span) -> Ident {
        Ident::new(self.names.intern(text), span)
    }

    pub fn name(&self, name: Name) -> &str {
        self.names.get(name)
    }

    /// Bytes occupied by expression and statement nodes.
    pub fn bytes_in_use(&self) -> usize {
        self.exprs.bytes_in_use() + self.stmts.bytes_in_use()
    }
}
