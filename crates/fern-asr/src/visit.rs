//! Generic ASR traversal.
//! 通用 ASR 遍历。
//!
//! Two walkers share one children accessor table (`*Kind::children`):
//!
//! - [`Visitor`] is read-only. Each `visit_*` method defaults to the matching
//!   `walk_*` function, so an implementation overrides only the node kinds it
//!   cares about and calls `walk_*` to keep descending.
//! - [`Rewriter`] holds `&mut Asr`. `rewrite_stmt` and `rewrite_expr` return
//!   the handle to store in the parent slot, and `walk_*_mut` writes every
//!   changed handle back with `replace_child`. `visit_scope` fires once per
//!   Program or Function before its children are walked.
//!
//! Traversal is pre-order: a node comes before its children and children come
//! in declaration order. A scope yields its symbol table (entries in name
//! order), then its arguments, body statements and return variable. Weak
//! symbol references are never followed.
//!
//! ```text
//! struct CountVars(usize);
//!
//! impl<'asr> Visitor<'asr> for CountVars {
//!     fn visit_expr(&mut self, id: ExprId, asr: &'asr Asr) {
//!         if asr.expr(id).kind.is_a(ExprTag::Var) {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, id, asr);
//!     }
//! }
//! ```

use fern_common::ice;
use tracing::trace;

use crate::Asr;
use crate::node::{ExprId, NodeId, StmtId, SymbolId, SymtabId};

// ========== Read-only walk ==========

/// Read-only pre-order walker. / 只读的前序遍历器。
pub trait Visitor<'asr> {
    fn visit_unit(&mut self, asr: &'asr Asr) {
        walk_unit(self, asr);
    }

    fn visit_symtab(&mut self, id: SymtabId, asr: &'asr Asr) {
        walk_symtab(self, id, asr);
    }

    fn visit_symbol(&mut self, id: SymbolId, asr: &'asr Asr) {
        walk_symbol(self, id, asr);
    }

    fn visit_stmt(&mut self, id: StmtId, asr: &'asr Asr) {
        walk_stmt(self, id, asr);
    }

    fn visit_expr(&mut self, id: ExprId, asr: &'asr Asr) {
        walk_expr(self, id, asr);
    }
}

pub fn walk_unit<'asr, V: Visitor<'asr> + ?Sized>(visitor: &mut V, asr: &'asr Asr) {
    trace!("visit: unit");
    visitor.visit_symtab(asr.global_scope(), asr);
}

pub fn walk_node<'asr, V: Visitor<'asr> + ?Sized>(visitor: &mut V, node: NodeId, asr: &'asr Asr) {
    match node {
        NodeId::Symbol(id) => visitor.visit_symbol(id, asr),
        NodeId::Symtab(id) => visitor.visit_symtab(id, asr),
        NodeId::Stmt(id) => visitor.visit_stmt(id, asr),
        NodeId::Expr(id) => visitor.visit_expr(id, asr),
    }
}

pub fn walk_symtab<'asr, V: Visitor<'asr> + ?Sized>(
    visitor: &mut V,
    id: SymtabId,
    asr: &'asr Asr,
) {
    for symbol in asr.symtab(id).symbols() {
        visitor.visit_symbol(symbol, asr);
    }
}

pub fn walk_symbol<'asr, V: Visitor<'asr> + ?Sized>(
    visitor: &mut V,
    id: SymbolId,
    asr: &'asr Asr,
) {
    for child in asr.symbol(id).kind.children() {
        walk_node(visitor, child, asr);
    }
}

pub fn walk_stmt<'asr, V: Visitor<'asr> + ?Sized>(visitor: &mut V, id: StmtId, asr: &'asr Asr) {
    for child in asr.stmt(id).kind.children() {
        walk_node(visitor, child, asr);
    }
}

pub fn walk_expr<'asr, V: Visitor<'asr> + ?Sized>(visitor: &mut V, id: ExprId, asr: &'asr Asr) {
    for child in asr.expr(id).kind.children() {
        walk_node(visitor, child, asr);
    }
}

// ========== Rewrite walk ==========

/// In-place rewriter over `&mut Asr`. / 基于 `&mut Asr` 的原地重写器。
pub trait Rewriter {
    /// Called once for every Program and Function, before its children.
    fn visit_scope(&mut self, _scope: SymbolId, _asr: &mut Asr) {}

    fn rewrite_symtab(&mut self, id: SymtabId, asr: &mut Asr) {
        walk_symtab_mut(self, id, asr);
    }

    fn rewrite_symbol(&mut self, id: SymbolId, asr: &mut Asr) {
        walk_symbol_mut(self, id, asr);
    }

    /// Returns the statement to store in the parent slot.
    fn rewrite_stmt(&mut self, id: StmtId, asr: &mut Asr) -> StmtId {
        walk_stmt_mut(self, id, asr);
        id
    }

    /// Returns the expression to store in the parent slot.
    fn rewrite_expr(&mut self, id: ExprId, asr: &mut Asr) -> ExprId {
        walk_expr_mut(self, id, asr);
        id
    }
}

/// Rewrite the whole translation unit.
pub fn rewrite_unit<R: Rewriter + ?Sized>(rewriter: &mut R, asr: &mut Asr) {
    trace!("rewrite: unit");
    let global = asr.global_scope();
    rewriter.rewrite_symtab(global, asr);
}

pub fn walk_symtab_mut<R: Rewriter + ?Sized>(rewriter: &mut R, id: SymtabId, asr: &mut Asr) {
    // Copied out so the rewriter can take `asr` mutably.
    let symbols: Vec<SymbolId> = asr.symtab(id).symbols().collect();
    for symbol in symbols {
        rewriter.rewrite_symbol(symbol, asr);
    }
}

pub fn walk_symbol_mut<R: Rewriter + ?Sized>(rewriter: &mut R, id: SymbolId, asr: &mut Asr) {
    if asr.symbol(id).kind.is_scope() {
        rewriter.visit_scope(id, asr);
    }

    let children = asr.symbol(id).kind.children();
    for (index, child) in children.into_iter().enumerate() {
        match child {
            NodeId::Symtab(table) => rewriter.rewrite_symtab(table, asr),
            NodeId::Stmt(stmt) => {
                let new = rewriter.rewrite_stmt(stmt, asr);
                if new != stmt {
                    asr.symbols[id].kind.replace_child(index, NodeId::Stmt(new));
                }
            }
            NodeId::Expr(expr) => {
                let new = rewriter.rewrite_expr(expr, asr);
                if new != expr {
                    asr.symbols[id].kind.replace_child(index, NodeId::Expr(new));
                }
            }
            NodeId::Symbol(symbol) => ice!("symbol {id:?} lists symbol {symbol:?} as a child"),
        }
    }
}

pub fn walk_stmt_mut<R: Rewriter + ?Sized>(rewriter: &mut R, id: StmtId, asr: &mut Asr) {
    let children = asr.stmt(id).kind.children();
    for (index, child) in children.into_iter().enumerate() {
        match child {
            NodeId::Stmt(stmt) => {
                let new = rewriter.rewrite_stmt(stmt, asr);
                if new != stmt {
                    asr.stmts[id].kind.replace_child(index, NodeId::Stmt(new));
                }
            }
            NodeId::Expr(expr) => {
                let new = rewriter.rewrite_expr(expr, asr);
                if new != expr {
                    asr.stmts[id].kind.replace_child(index, NodeId::Expr(new));
                }
            }
            other => ice!("statement {id:?} lists {other:?} as a child"),
        }
    }
}

pub fn walk_expr_mut<R: Rewriter + ?Sized>(rewriter: &mut R, id: ExprId, asr: &mut Asr) {
    let children = asr.expr(id).kind.children();
    for (index, child) in children.into_iter().enumerate() {
        let NodeId::Expr(expr) = child else {
            ice!("expression {id:?} lists {child:?} as a child");
        };
        let new = rewriter.rewrite_expr(expr, asr);
        if new != expr {
            asr.exprs[id].kind.replace_child(index, NodeId::Expr(new));
        }
    }
}
