//! Structural checks on a finished ASR.
//! 对完成的 ASR 进行结构检查。

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::Asr;
use crate::node::*;
use crate::visit::{self, Visitor};

/// The first structural fault found in an ASR. / ASR 中发现的第一个结构错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("symbol table {table:?} does not reach the global scope")]
    BrokenParentChain { table: SymtabId },

    #[error("symbol `{name}` is registered in {table:?} but names {parent:?} as its parent")]
    WrongParent {
        name: String,
        table: SymtabId,
        parent: SymtabId,
    },

    #[error("symbol `{name}` is registered under the key `{key}`")]
    WrongKey { name: String, key: String },

    #[error("scope `{name}` and its symbol table do not point at each other")]
    OwnerMismatch { name: String },

    #[error("`{name}` is referenced from a scope where it is not visible")]
    NotVisible { name: String },

    #[error("`{name}` is a {found}, expected a {expected}")]
    WrongSymbolKind {
        name: String,
        found: SymbolTag,
        expected: SymbolTag,
    },

    #[error("`{name}` appears twice in one {stmt}")]
    DuplicateVariable { name: String, stmt: StmtTag },
}

/// Check the scope tree and every symbol reference reachable from the
/// global scope.
pub fn verify(asr: &Asr) -> Result<(), VerifyError> {
    let mut verifier = Verifier {
        scopes: vec![asr.global_scope()],
        error: None,
    };
    verifier.visit_unit(asr);
    match verifier.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct Verifier {
    /// Tables of the scopes being walked, innermost last.
    scopes: Vec<SymtabId>,
    error: Option<VerifyError>,
}

impl Verifier {
    fn fail(&mut self, error: VerifyError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn current(&self) -> Option<SymtabId> {
        self.scopes.last().copied()
    }

    fn check_reference(&mut self, asr: &Asr, symbol: SymbolId, expected: SymbolTag) {
        let target = asr.symbol(symbol);
        let name = target.kind.name().to_owned();

        let found = target.kind.tag();
        if found != expected {
            self.fail(VerifyError::WrongSymbolKind {
                name,
                found,
                expected,
            });
            return;
        }
        let visible = self
            .current()
            .is_some_and(|table| asr.is_within(table, target.parent));
        if !visible {
            self.fail(VerifyError::NotVisible { name });
        }
    }

    fn check_chain(&mut self, asr: &Asr, table: SymtabId) {
        let global = asr.global_scope();
        let mut current = Some(table);
        // A chain longer than the number of tables has a cycle.
        for _ in 0..=asr.symtabs.len() {
            match current {
                Some(id) if id == global => return,
                Some(id) => current = asr.symtab(id).parent,
                None => break,
            }
        }
        self.fail(VerifyError::BrokenParentChain { table });
    }
}

impl<'asr> Visitor<'asr> for Verifier {
    fn visit_symtab(&mut self, id: SymtabId, asr: &'asr Asr) {
        for (key, &symbol) in &asr.symtab(id).scope {
            let node = asr.symbol(symbol);
            let name = node.kind.name();
            if name != key {
                self.fail(VerifyError::WrongKey {
                    name: name.to_owned(),
                    key: key.clone(),
                });
            }
            if node.parent != id {
                self.fail(VerifyError::WrongParent {
                    name: name.to_owned(),
                    table: id,
                    parent: node.parent,
                });
            }
        }

        visit::walk_symtab(self, id, asr);
    }

    fn visit_symbol(&mut self, id: SymbolId, asr: &'asr Asr) {
        let kind = &asr.symbol(id).kind;
        if kind.is_scope() {
            let table = kind.symtab();
            self.check_chain(asr, table);
            let owned = asr.symtab(table);
            if owned.owner != Some(id) || owned.parent != Some(asr.symbol(id).parent) {
                self.fail(VerifyError::OwnerMismatch {
                    name: kind.name().to_owned(),
                });
            }
            self.scopes.push(table);
            visit::walk_symbol(self, id, asr);
            self.scopes.pop();
        } else {
            visit::walk_symbol(self, id, asr);
        }
    }

    fn visit_stmt(&mut self, id: StmtId, asr: &'asr Asr) {
        let kind = &asr.stmt(id).kind;
        match kind {
            StmtKind::SubroutineCall { name, .. } => {
                self.check_reference(asr, *name, SymbolTag::Function);
            }
            StmtKind::Allocate { .. }
            | StmtKind::ExplicitDeallocate { .. }
            | StmtKind::ImplicitDeallocate { .. } => {
                let mut seen = FxHashSet::default();
                for symbol in kind.symbol_refs() {
                    self.check_reference(asr, symbol, SymbolTag::Variable);
                    if !seen.insert(symbol) {
                        self.fail(VerifyError::DuplicateVariable {
                            name: asr.symbol_name(symbol).to_owned(),
                            stmt: kind.tag(),
                        });
                    }
                }
            }
            _ => {}
        }
        visit::walk_stmt(self, id, asr);
    }

    fn visit_expr(&mut self, id: ExprId, asr: &'asr Asr) {
        let kind = &asr.expr(id).kind;
        if let Some(symbol) = kind.symbol_ref() {
            let expected = match kind {
                ExprKind::FunctionCall { .. } => SymbolTag::Function,
                _ => SymbolTag::Variable,
            };
            self.check_reference(asr, symbol, expected);
        }
        visit::walk_expr(self, id, asr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{Intent, Ttype};
    use fern_common::Span;

    fn program_with_local() -> (Asr, SymbolId, SymbolId) {
        let mut asr = Asr::new(Span::DUMMY);
        let global = asr.global_scope();
        let p = asr.make_program(global, "p", Span::DUMMY);
        let table = asr.scope_symtab(p);
        let x = asr.make_variable(table, "x", Intent::Local, Ttype::DEFAULT_INTEGER, Span::DUMMY);
        (asr, p, x)
    }

    #[test]
    fn test_well_formed() {
        let (mut asr, p, x) = program_with_local();
        let target = asr.make_var(x, Span::DUMMY);
        let value = asr.make_integer_constant(1, Ttype::DEFAULT_INTEGER, Span::DUMMY);
        let assign = asr.make_assignment(target, value, Span::DUMMY);
        asr.append_stmt(p, assign);
        assert_eq!(verify(&asr), Ok(()));
    }

    #[test]
    fn test_reference_into_sibling_scope() {
        let (mut asr, _, x) = program_with_local();
        let global = asr.global_scope();
        let q = asr.make_program(global, "q", Span::DUMMY);
        let stmt = asr.make_explicit_deallocate(vec![x], Span::DUMMY);
        asr.append_stmt(q, stmt);
        assert_eq!(
            verify(&asr),
            Err(VerifyError::NotVisible { name: "x".into() })
        );
    }

    #[test]
    fn test_release_of_a_scope_symbol() {
        let (mut asr, p, _) = program_with_local();
        let stmt = asr.make_implicit_deallocate(vec![p], Span::DUMMY);
        asr.append_stmt(p, stmt);
        assert!(matches!(
            verify(&asr),
            Err(VerifyError::WrongSymbolKind {
                found: SymbolTag::Program,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_in_release() {
        let (mut asr, p, x) = program_with_local();
        let stmt = asr.make_implicit_deallocate(vec![x, x], Span::DUMMY);
        asr.append_stmt(p, stmt);
        assert!(matches!(
            verify(&asr),
            Err(VerifyError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn test_wrong_parent() {
        let (mut asr, p, x) = program_with_local();
        let global = asr.global_scope();
        asr.symbols[x].parent = global;
        let table = asr.scope_symtab(p);
        assert_eq!(
            verify(&asr),
            Err(VerifyError::WrongParent {
                name: "x".into(),
                table,
                parent: global,
            })
        );
    }

    #[test]
    fn test_parent_cycle() {
        let (mut asr, p, _) = program_with_local();
        let table = asr.scope_symtab(p);
        asr.symtabs[table].parent = Some(table);
        assert!(matches!(
            verify(&asr),
            Err(VerifyError::BrokenParentChain { .. })
        ));
    }
}
