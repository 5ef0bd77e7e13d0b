//! Read-only syntax tree walker.
//!
//! Override `visit_*` methods to add behavior at specific nodes and call the
//! matching `walk_*` function to continue into children. Children are visited
//! in source order, each node before its children.
//!
//! ```text
//! struct CountNames(usize);
//!
//! impl<'ast> Visitor<'ast> for CountNames {
//!     fn visit_expr(&mut self, expr: &'ast Expr, arena: &'ast AstArena) {
//!         if let ExprKind::Name(_) = expr.kind {
//!             self.0 += 1;
//!         }
//!         walk_expr(self, expr, arena);
//!     }
//! }
//! ```

use crate::{
    AstArena, Attr, Decl, DimSpec, Expr, ExprId, ExprKind, Item, ProgramUnit, Stmt, StmtId,
    StmtKind, TranslationUnit,
};

pub trait Visitor<'ast> {
    fn visit_unit(&mut self, unit: &'ast TranslationUnit, arena: &'ast AstArena) {
        walk_unit(self, unit, arena);
    }

    fn visit_program_unit(&mut self, unit: &'ast ProgramUnit, arena: &'ast AstArena) {
        walk_program_unit(self, unit, arena);
    }

    fn visit_decl(&mut self, decl: &'ast Decl, arena: &'ast AstArena) {
        walk_decl(self, decl, arena);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt, arena: &'ast AstArena) {
        walk_stmt(self, stmt, arena);
    }

    fn visit_stmt_id(&mut self, id: StmtId, arena: &'ast AstArena) {
        self.visit_stmt(arena.stmt(id), arena);
    }

    fn visit_expr(&mut self, expr: &'ast Expr, arena: &'ast AstArena) {
        walk_expr(self, expr, arena);
    }

    fn visit_expr_id(&mut self, id: ExprId, arena: &'ast AstArena) {
        self.visit_expr(arena.expr(id), arena);
    }
}

pub fn walk_unit<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    unit: &'ast TranslationUnit,
    arena: &'ast AstArena,
) {
    for item in &unit.items {
        match item {
            Item::Unit(program_unit) => visitor.visit_program_unit(program_unit, arena),
            Item::Stmt(id) => visitor.visit_stmt_id(*id, arena),
            Item::Expr(id) => visitor.visit_expr_id(*id, arena),
        }
    }
}

pub fn walk_program_unit<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    unit: &'ast ProgramUnit,
    arena: &'ast AstArena,
) {
    for decl in &unit.decls {
        visitor.visit_decl(decl, arena);
    }
    for id in &unit.body {
        visitor.visit_stmt_id(*id, arena);
    }
    for contained in &unit.contains {
        visitor.visit_program_unit(contained, arena);
    }
}

pub fn walk_decl<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    decl: &'ast Decl,
    arena: &'ast AstArena,
) {
    for attr in &decl.attrs {
        if let Attr::Dimension(dims) = attr {
            walk_dims(visitor, dims, arena);
        }
    }
    for entity in &decl.entities {
        if let Some(dims) = &entity.dims {
            walk_dims(visitor, dims, arena);
        }
        if let Some(init) = entity.init {
            visitor.visit_expr_id(init, arena);
        }
    }
}

fn walk_dims<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    dims: &'ast [DimSpec],
    arena: &'ast AstArena,
) {
    for dim in dims {
        if let DimSpec::Extent(id) = dim {
            visitor.visit_expr_id(*id, arena);
        }
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    stmt: &'ast Stmt,
    arena: &'ast AstArena,
) {
    match &stmt.kind {
        StmtKind::Assignment { target, value } => {
            visitor.visit_expr_id(*target, arena);
            visitor.visit_expr_id(*value, arena);
        }
        StmtKind::Allocate(items) | StmtKind::Print(items) => {
            for id in items {
                visitor.visit_expr_id(*id, arena);
            }
        }
        StmtKind::Deallocate(_) | StmtKind::Return => {}
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            visitor.visit_expr_id(*cond, arena);
            for id in then_body.iter().chain(else_body) {
                visitor.visit_stmt_id(*id, arena);
            }
        }
        StmtKind::Do {
            start,
            end,
            step,
            body,
            ..
        } => {
            visitor.visit_expr_id(*start, arena);
            visitor.visit_expr_id(*end, arena);
            if let Some(step) = step {
                visitor.visit_expr_id(*step, arena);
            }
            for id in body {
                visitor.visit_stmt_id(*id, arena);
            }
        }
        StmtKind::Call { args, .. } => {
            for id in args {
                visitor.visit_expr_id(*id, arena);
            }
        }
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    expr: &'ast Expr,
    arena: &'ast AstArena,
) {
    match &expr.kind {
        ExprKind::Name(_)
        | ExprKind::Int(_)
        | ExprKind::Real(_)
        | ExprKind::Logical(_)
        | ExprKind::Str(_) => {}
        ExprKind::FuncCallOrArray { args, .. } => {
            for id in args {
                visitor.visit_expr_id(*id, arena);
            }
        }
        ExprKind::BinOp { left, right, .. }
        | ExprKind::Compare { left, right, .. }
        | ExprKind::BoolOp { left, right, .. } => {
            visitor.visit_expr_id(*left, arena);
            visitor.visit_expr_id(*right, arena);
        }
        ExprKind::UnaryOp { operand, .. } => visitor.visit_expr_id(*operand, arena),
        ExprKind::Not(operand) => visitor.visit_expr_id(*operand, arena),
    }
}
