//! The `fern ast` command.

use fern_syntax::visit::{self, Visitor};
use fern_syntax::{AstArena, Decl, Expr, ExprKind, ProgramUnit, Stmt};

use super::{parse_source, read_source};
use crate::output;

/// Node counts of one syntax tree.
#[derive(Debug, Default)]
struct Stats {
    units: usize,
    decls: usize,
    stmts: usize,
    exprs: usize,
    names: usize,
}

impl<'ast> Visitor<'ast> for Stats {
    fn visit_program_unit(&mut self, unit: &'ast ProgramUnit, arena: &'ast AstArena) {
        self.units += 1;
        visit::walk_program_unit(self, unit, arena);
    }

    fn visit_decl(&mut self, decl: &'ast Decl, arena: &'ast AstArena) {
        self.decls += 1;
        visit::walk_decl(self, decl, arena);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt, arena: &'ast AstArena) {
        self.stmts += 1;
        visit::walk_stmt(self, stmt, arena);
    }

    fn visit_expr(&mut self, expr: &'ast Expr, arena: &'ast AstArena) {
        self.exprs += 1;
        if matches!(expr.kind, ExprKind::Name(_)) {
            self.names += 1;
        }
        visit::walk_expr(self, expr, arena);
    }
}

pub fn run(file: &str, verbose: bool) -> Result<(), String> {
    let source = read_source(file)?;
    let mut arena = AstArena::new();
    let unit = parse_source(&mut arena, &source, file)?;

    let mut stats = Stats::default();
    stats.visit_unit(&unit, &arena);

    println!("items:       {}", unit.items.len());
    println!("units:       {}", stats.units);
    println!("decls:       {}", stats.decls);
    println!("statements:  {}", stats.stmts);
    println!("expressions: {}", stats.exprs);
    println!("name leaves: {}", stats.names);
    if verbose {
        output::info(&format!(
            "{} distinct names, {} bytes in the syntax arena",
            arena.names.len(),
            arena.bytes_in_use()
        ));
    }
    Ok(())
}
