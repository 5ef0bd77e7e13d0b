//! Release local allocatable arrays at the end of their scope.
//! 在作用域末尾释放局部可分配数组。
//!
//! For every Program and Function the pass appends one `ImplicitDeallocate`
//! naming each local allocatable array of the scope's table that no release
//! statement among the scope's direct statements already names. Releases
//! nested inside `if` or `do` bodies are not looked at. The body is only
//! appended to, and a scope with nothing left to release is not touched, so
//! running the pass twice changes nothing the second time.

use fern_asr::visit::{self, Rewriter};
use fern_asr::{Asr, ExprId, StmtId, SymbolId, Variable};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::manager::verify_after;
use crate::{Pass, PassOptions};

#[derive(Debug, Default)]
pub struct InsertDeallocate {
    /// Scopes that received a release statement in the last run.
    /// 上一次运行中新增释放语句的作用域数量。
    modified: usize,
}

impl InsertDeallocate {
    pub fn modified_scopes(&self) -> usize {
        self.modified
    }
}

/// Run [`InsertDeallocate`] over the whole unit, then verify the tree when
/// `options.verify` is set.
pub fn pass_insert_deallocate(asr: &mut Asr, options: &PassOptions) {
    let mut pass = InsertDeallocate::default();
    pass.run(asr, options);
    if options.verify {
        verify_after(pass.name(), asr);
    }
}

impl Pass for InsertDeallocate {
    fn name(&self) -> &'static str {
        "insert_deallocate"
    }

    fn run(&mut self, asr: &mut Asr, _options: &PassOptions) {
        self.modified = 0;
        visit::rewrite_unit(self, asr);
        debug!(scopes = self.modified, "insert_deallocate finished");
    }
}

impl Rewriter for InsertDeallocate {
    fn visit_scope(&mut self, scope: SymbolId, asr: &mut Asr) {
        let released: FxHashSet<SymbolId> = asr
            .body(scope)
            .iter()
            .filter_map(|&stmt| asr.stmt(stmt).kind.as_release())
            .flatten()
            .copied()
            .collect();

        let table = asr.scope_symtab(scope);
        let vars: Vec<SymbolId> = asr
            .symtab(table)
            .symbols()
            .filter(|symbol| !released.contains(symbol))
            .filter(|&symbol| {
                asr.symbol(symbol)
                    .kind
                    .as_variable()
                    .is_some_and(Variable::is_local_allocatable_array)
            })
            .collect();
        if vars.is_empty() {
            return;
        }

        debug!(
            scope = asr.symbol_name(scope),
            vars = vars.len(),
            "appending implicit deallocate"
        );
        let loc = asr.symbol(scope).loc;
        let stmt = asr.make_implicit_deallocate(vars, loc);
        asr.append_stmt(scope, stmt);
        self.modified += 1;
    }

    // Scopes are only reachable through symbol tables, so statement and
    // expression trees need no walking.
    fn rewrite_stmt(&mut self, id: StmtId, _asr: &mut Asr) -> StmtId {
        id
    }

    fn rewrite_expr(&mut self, id: ExprId, _asr: &mut Asr) -> ExprId {
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fern_asr::{ArrayDim, Intent, StmtKind, StmtTag, Ttype};
    use fern_common::Span;
    use pretty_assertions::assert_eq;

    fn allocatable_array() -> Ttype {
        Ttype::Allocatable(Box::new(Ttype::Array {
            element: Box::new(Ttype::DEFAULT_REAL),
            dims: vec![ArrayDim::Deferred],
        }))
    }

    fn options() -> PassOptions {
        PassOptions { verify: true }
    }

    fn body_tags(asr: &Asr, scope: SymbolId) -> Vec<StmtTag> {
        asr.body(scope)
            .iter()
            .map(|&stmt| asr.stmt(stmt).kind.tag())
            .collect()
    }

    #[test]
    fn test_appends_in_table_order() {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let table = asr.scope_symtab(p);
        let b = asr.make_variable(table, "b", Intent::Local, allocatable_array(), Span::DUMMY);
        let a = asr.make_variable(table, "a", Intent::Local, allocatable_array(), Span::DUMMY);
        asr.make_variable(table, "n", Intent::Local, Ttype::DEFAULT_INTEGER, Span::DUMMY);
        let ret = asr.make_return(Span::DUMMY);
        asr.append_stmt(p, ret);

        pass_insert_deallocate(&mut asr, &options());

        assert_eq!(body_tags(&asr, p), vec![StmtTag::Return, StmtTag::ImplicitDeallocate]);
        let last = *asr.body(p).last().unwrap();
        assert_eq!(asr.stmt(last).kind.implicit_deallocate(), &[a, b]);
        assert_eq!(asr.stmt(last).loc, asr.symbol(p).loc);
    }

    #[test]
    fn test_skips_explicitly_released() {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let table = asr.scope_symtab(p);
        let a = asr.make_variable(table, "a", Intent::Local, allocatable_array(), Span::DUMMY);
        let b = asr.make_variable(table, "b", Intent::Local, allocatable_array(), Span::DUMMY);
        let release = asr.make_explicit_deallocate(vec![a], Span::DUMMY);
        asr.append_stmt(p, release);

        pass_insert_deallocate(&mut asr, &options());

        let last = *asr.body(p).last().unwrap();
        assert_eq!(asr.stmt(last).kind.implicit_deallocate(), &[b]);
    }

    #[test]
    fn test_nothing_to_release() {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let table = asr.scope_symtab(p);
        let a = asr.make_variable(table, "a", Intent::Local, allocatable_array(), Span::DUMMY);
        asr.make_variable(table, "dummy", Intent::In, allocatable_array(), Span::DUMMY);
        let scalar = Ttype::Allocatable(Box::new(Ttype::DEFAULT_REAL));
        asr.make_variable(table, "s", Intent::Local, scalar, Span::DUMMY);
        let release = asr.make_explicit_deallocate(vec![a], Span::DUMMY);
        asr.append_stmt(p, release);

        let mut pass = InsertDeallocate::default();
        pass.run(&mut asr, &options());

        assert_eq!(pass.modified_scopes(), 0);
        assert_eq!(body_tags(&asr, p), vec![StmtTag::ExplicitDeallocate]);
    }

    #[test]
    fn test_nested_release_is_not_seen() {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let table = asr.scope_symtab(p);
        let a = asr.make_variable(table, "a", Intent::Local, allocatable_array(), Span::DUMMY);
        let release = asr.make_explicit_deallocate(vec![a], Span::DUMMY);
        let test = asr.make_logical_constant(true, Ttype::DEFAULT_LOGICAL, Span::DUMMY);
        let branch = asr.make_if(test, vec![release], Vec::new(), Span::DUMMY);
        asr.append_stmt(p, branch);

        pass_insert_deallocate(&mut asr, &options());

        assert_eq!(body_tags(&asr, p), vec![StmtTag::If, StmtTag::ImplicitDeallocate]);
    }

    #[test]
    fn test_functions_and_nested_scopes() {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let ptable = asr.scope_symtab(p);
        let outer = asr.make_variable(ptable, "w", Intent::Local, allocatable_array(), Span::DUMMY);
        let f = asr.make_function(ptable, "f", Span::DUMMY);
        let ftable = asr.scope_symtab(f);
        let inner = asr.make_variable(ftable, "w", Intent::Local, allocatable_array(), Span::DUMMY);

        let mut pass = InsertDeallocate::default();
        pass.run(&mut asr, &options());

        assert_eq!(pass.modified_scopes(), 2);
        let StmtKind::ImplicitDeallocate { vars } = &asr.stmt(asr.body(p)[0]).kind else {
            panic!("expected a release in p");
        };
        assert_eq!(vars, &vec![outer]);
        let StmtKind::ImplicitDeallocate { vars } = &asr.stmt(asr.body(f)[0]).kind else {
            panic!("expected a release in f");
        };
        assert_eq!(vars, &vec![inner]);
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let table = asr.scope_symtab(p);
        asr.make_variable(table, "a", Intent::Local, allocatable_array(), Span::DUMMY);

        pass_insert_deallocate(&mut asr, &options());
        let stmts = asr.stmts.len();
        let mut pass = InsertDeallocate::default();
        pass.run(&mut asr, &options());

        assert_eq!(pass.modified_scopes(), 0);
        assert_eq!(asr.stmts.len(), stmts);
        assert_eq!(asr.body(p).len(), 1);
    }

    /// A release naming a program: the pass itself runs fine, the verifier
    /// rejects the tree.
    fn malformed() -> Asr {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let release = asr.make_explicit_deallocate(vec![p], Span::DUMMY);
        asr.append_stmt(p, release);
        asr
    }

    #[test]
    fn test_run_leaves_verification_to_the_caller() {
        let mut asr = malformed();
        let mut pass = InsertDeallocate::default();
        pass.run(&mut asr, &options());
        assert_eq!(pass.modified_scopes(), 0);
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn test_direct_call_verifies() {
        let mut asr = malformed();
        pass_insert_deallocate(&mut asr, &options());
    }
}
