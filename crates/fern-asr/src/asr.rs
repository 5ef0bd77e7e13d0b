//! The ASR of one translation unit.
//! 单个翻译单元的 ASR。

use fern_common::{Arena, Span, ice};

use crate::node::*;
use crate::ty::{Intent, Ttype};

/// Root of a lowered translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationUnit {
    pub global_scope: SymtabId,
    pub loc: Span,
}

/// Owns every node of one translation unit.
///
/// Nodes live in four arenas and are addressed by handle. Passes take
/// `&mut Asr` and rewrite nodes in place; nothing is freed until the `Asr` is
/// dropped.
#[derive(Debug)]
pub struct Asr {
    pub symbols: Arena<Symbol>,
    pub symtabs: Arena<SymbolTable>,
    pub stmts: Arena<Stmt>,
    pub exprs: Arena<Expr>,
    unit: TranslationUnit,
}

impl Asr {
    /// Create an empty unit with only the global symbol table.
    pub fn new(loc: Span) -> Self {
        let mut symtabs = Arena::new();
        let global_scope = symtabs.alloc(SymbolTable::default());
        Self {
            symbols: Arena::new(),
            symtabs,
            stmts: Arena::new(),
            exprs: Arena::new(),
            unit: TranslationUnit { global_scope, loc },
        }
    }

    pub fn unit(&self) -> TranslationUnit {
        self.unit
    }

    pub fn global_scope(&self) -> SymtabId {
        self.unit.global_scope
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn symtab(&self, id: SymtabId) -> &SymbolTable {
        &self.symtabs[id]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.symbols[id].kind.name()
    }

    /// Bytes occupied by live nodes across all arenas.
    pub fn allocated_bytes(&self) -> usize {
        self.symbols.bytes_in_use()
            + self.symtabs.bytes_in_use()
            + self.stmts.bytes_in_use()
            + self.exprs.bytes_in_use()
    }

    // ========== Scopes ==========

    /// Look `name` up in `table` and then in its ancestors.
    pub fn lookup(&self, table: SymtabId, name: &str) -> Option<SymbolId> {
        let mut current = Some(table);
        while let Some(id) = current {
            let table = &self.symtabs[id];
            if let Some(symbol) = table.get(name) {
                return Some(symbol);
            }
            current = table.parent;
        }
        None
    }

    pub fn lookup_local(&self, table: SymtabId, name: &str) -> Option<SymbolId> {
        self.symtabs[table].get(name)
    }

    /// Whether `table` is `ancestor` or nested inside it.
    pub fn is_within(&self, table: SymtabId, ancestor: SymtabId) -> bool {
        let mut current = Some(table);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.symtabs[id].parent;
        }
        false
    }

    #[track_caller]
    pub fn scope_symtab(&self, scope: SymbolId) -> SymtabId {
        self.symbols[scope].kind.symtab()
    }

    #[track_caller]
    pub fn body(&self, scope: SymbolId) -> &[StmtId] {
        self.symbols[scope].kind.body()
    }

    #[track_caller]
    pub fn body_mut(&mut self, scope: SymbolId) -> &mut Vec<StmtId> {
        self.symbols[scope].kind.body_mut()
    }

    /// Append `stmt` as the last statement of `scope`.
    #[track_caller]
    pub fn append_stmt(&mut self, scope: SymbolId, stmt: StmtId) {
        self.body_mut(scope).push(stmt);
    }

    /// Every Program and Function symbol. The scopes of one table come in
    /// name order and before any scope nested inside them.
    pub fn scopes(&self) -> Vec<SymbolId> {
        let mut out = Vec::new();
        let mut pending = vec![self.global_scope()];
        while let Some(table) = pending.pop() {
            let start = out.len();
            for symbol in self.symtabs[table].symbols() {
                if self.symbols[symbol].kind.is_scope() {
                    out.push(symbol);
                }
            }
            for &scope in out[start..].iter().rev() {
                pending.push(self.scope_symtab(scope));
            }
        }
        out
    }

    /// The type of an expression; a `Var` has its variable's type.
    pub fn expr_type(&self, id: ExprId) -> Option<&Ttype> {
        let kind = &self.exprs[id].kind;
        match kind {
            ExprKind::Var(symbol) => self.symbols[*symbol]
                .kind
                .as_variable()
                .map(|v| &v.ttype),
            _ => kind.ttype(),
        }
    }

    // ========== Symbol factories ==========

    fn declare(&mut self, parent: SymtabId, name: &str, symbol: SymbolId) {
        let table = &mut self.symtabs[parent];
        if let Some(existing) = table.scope.insert(name.to_owned(), symbol) {
            ice!("symbol `{name}` declared twice (previous {existing:?})");
        }
    }

    fn new_scope_table(&mut self, parent: SymtabId) -> SymtabId {
        self.symtabs.alloc(SymbolTable {
            parent: Some(parent),
            owner: None,
            scope: Default::default(),
        })
    }

    /// Create a Program with an empty body and register it in `parent`.
    pub fn make_program(&mut self, parent: SymtabId, name: &str, loc: Span) -> SymbolId {
        let symtab = self.new_scope_table(parent);
        let id = self.symbols.alloc(Symbol {
            kind: SymbolKind::Program(Program {
                name: name.to_owned(),
                symtab,
                body: Vec::new(),
            }),
            loc,
            parent,
        });
        self.symtabs[symtab].owner = Some(id);
        self.declare(parent, name, id);
        id
    }

    /// Create a Function with no arguments and an empty body and register it
    /// in `parent`.
    pub fn make_function(&mut self, parent: SymtabId, name: &str, loc: Span) -> SymbolId {
        let symtab = self.new_scope_table(parent);
        let id = self.symbols.alloc(Symbol {
            kind: SymbolKind::Function(Function {
                name: name.to_owned(),
                symtab,
                args: Vec::new(),
                body: Vec::new(),
                return_var: None,
            }),
            loc,
            parent,
        });
        self.symtabs[symtab].owner = Some(id);
        self.declare(parent, name, id);
        id
    }

    pub fn make_variable(
        &mut self,
        parent: SymtabId,
        name: &str,
        intent: Intent,
        ttype: Ttype,
        loc: Span,
    ) -> SymbolId {
        let id = self.symbols.alloc(Symbol {
            kind: SymbolKind::Variable(Variable {
                name: name.to_owned(),
                intent,
                ttype,
                init: None,
            }),
            loc,
            parent,
        });
        self.declare(parent, name, id);
        id
    }

    // ========== Statement factories ==========

    fn stmt_node(&mut self, kind: StmtKind, loc: Span) -> StmtId {
        self.stmts.alloc(Stmt { kind, loc })
    }

    pub fn make_assignment(&mut self, target: ExprId, value: ExprId, loc: Span) -> StmtId {
        self.stmt_node(StmtKind::Assignment { target, value }, loc)
    }

    pub fn make_allocate(&mut self, args: Vec<AllocArg>, loc: Span) -> StmtId {
        self.stmt_node(StmtKind::Allocate { args }, loc)
    }

    pub fn make_explicit_deallocate(&mut self, vars: Vec<SymbolId>, loc: Span) -> StmtId {
        self.stmt_node(StmtKind::ExplicitDeallocate { vars }, loc)
    }

    pub fn make_implicit_deallocate(&mut self, vars: Vec<SymbolId>, loc: Span) -> StmtId {
        self.stmt_node(StmtKind::ImplicitDeallocate { vars }, loc)
    }

    pub fn make_if(
        &mut self,
        test: ExprId,
        body: Vec<StmtId>,
        orelse: Vec<StmtId>,
        loc: Span,
    ) -> StmtId {
        self.stmt_node(StmtKind::If { test, body, orelse }, loc)
    }

    pub fn make_do_loop(
        &mut self,
        var: ExprId,
        start: ExprId,
        end: ExprId,
        increment: Option<ExprId>,
        body: Vec<StmtId>,
        loc: Span,
    ) -> StmtId {
        self.stmt_node(
            StmtKind::DoLoop {
                var,
                start,
                end,
                increment,
                body,
            },
            loc,
        )
    }

    pub fn make_subroutine_call(
        &mut self,
        name: SymbolId,
        args: Vec<ExprId>,
        loc: Span,
    ) -> StmtId {
        self.stmt_node(StmtKind::SubroutineCall { name, args }, loc)
    }

    pub fn make_print(&mut self, values: Vec<ExprId>, loc: Span) -> StmtId {
        self.stmt_node(StmtKind::Print { values }, loc)
    }

    pub fn make_return(&mut self, loc: Span) -> StmtId {
        self.stmt_node(StmtKind::Return, loc)
    }

    // ========== Expression factories ==========

    fn expr_node(&mut self, kind: ExprKind, loc: Span) -> ExprId {
        self.exprs.alloc(Expr { kind, loc })
    }

    pub fn make_var(&mut self, symbol: SymbolId, loc: Span) -> ExprId {
        self.expr_node(ExprKind::Var(symbol), loc)
    }

    pub fn make_integer_constant(&mut self, value: i64, ttype: Ttype, loc: Span) -> ExprId {
        self.expr_node(ExprKind::IntegerConstant { value, ttype }, loc)
    }

    pub fn make_real_constant(&mut self, value: f64, ttype: Ttype, loc: Span) -> ExprId {
        self.expr_node(ExprKind::RealConstant { value, ttype }, loc)
    }

    pub fn make_logical_constant(&mut self, value: bool, ttype: Ttype, loc: Span) -> ExprId {
        self.expr_node(ExprKind::LogicalConstant { value, ttype }, loc)
    }

    pub fn make_string_constant(&mut self, value: String, ttype: Ttype, loc: Span) -> ExprId {
        self.expr_node(ExprKind::StringConstant { value, ttype }, loc)
    }

    pub fn make_bin_op(
        &mut self,
        left: ExprId,
        op: BinOp,
        right: ExprId,
        ttype: Ttype,
        loc: Span,
    ) -> ExprId {
        self.expr_node(
            ExprKind::BinOp {
                left,
                op,
                right,
                ttype,
            },
            loc,
        )
    }

    pub fn make_unary_minus(&mut self, operand: ExprId, ttype: Ttype, loc: Span) -> ExprId {
        self.expr_node(ExprKind::UnaryMinus { operand, ttype }, loc)
    }

    pub fn make_compare(
        &mut self,
        left: ExprId,
        op: CmpOp,
        right: ExprId,
        ttype: Ttype,
        loc: Span,
    ) -> ExprId {
        self.expr_node(
            ExprKind::Compare {
                left,
                op,
                right,
                ttype,
            },
            loc,
        )
    }

    pub fn make_logical_bin_op(
        &mut self,
        left: ExprId,
        op: BoolOp,
        right: ExprId,
        ttype: Ttype,
        loc: Span,
    ) -> ExprId {
        self.expr_node(
            ExprKind::LogicalBinOp {
                left,
                op,
                right,
                ttype,
            },
            loc,
        )
    }

    pub fn make_logical_not(&mut self, operand: ExprId, ttype: Ttype, loc: Span) -> ExprId {
        self.expr_node(ExprKind::LogicalNot { operand, ttype }, loc)
    }

    pub fn make_array_item(
        &mut self,
        var: SymbolId,
        indices: Vec<ExprId>,
        ttype: Ttype,
        loc: Span,
    ) -> ExprId {
        self.expr_node(
            ExprKind::ArrayItem {
                var,
                indices,
                ttype,
            },
            loc,
        )
    }

    pub fn make_function_call(
        &mut self,
        name: SymbolId,
        args: Vec<ExprId>,
        ttype: Ttype,
        loc: Span,
    ) -> ExprId {
        self.expr_node(ExprKind::FunctionCall { name, args, ttype }, loc)
    }
}
