//! Lowering from the syntax tree to the ASR.
//! 从语法树降级到 ASR。
//!
//! Lowering runs in two passes over the program units. The first creates
//! every unit symbol together with its declared variables, arguments and
//! result. The second lowers the bodies, so a call may name a unit that is
//! defined later in the file.

use fern_common::Span;
use fern_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use fern_syntax as ast;
use thiserror::Error;
use tracing::debug;

use crate::Asr;
use crate::node::*;
use crate::ty::{ArrayDim, Intent, Ttype};

/// A program that parses but has no meaning. / 能解析但没有语义的程序。
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SemanticError {
    pub span: Span,
    pub code: ErrorCode,
    pub message: String,
    pub notes: Vec<String>,
}

impl SemanticError {
    fn new(span: Span, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            span,
            code,
            message: message.into(),
            notes: Vec::new(),
        }
    }

    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(DiagnosticKind::Semantic, self.span, &self.message)
            .with_code(self.code)
            .with_label(Label::new(self.span, self.code.description()));
        self.notes
            .iter()
            .fold(diagnostic, |diagnostic, note| diagnostic.with_note(note.as_str()))
    }
}

type Result<T> = std::result::Result<T, SemanticError>;

/// Lower a parsed translation unit into a fresh [`Asr`].
/// 将解析后的翻译单元降级为新的 [`Asr`]。
pub fn lower(arena: &ast::AstArena, unit: &ast::TranslationUnit) -> Result<Asr> {
    let mut lowerer = Lowerer {
        arena,
        asr: Asr::new(unit.span),
        implicit_none: false,
    };
    let global = lowerer.asr.global_scope();

    let mut units = Vec::new();
    for item in &unit.items {
        match item {
            ast::Item::Unit(program_unit) => units.push(program_unit),
            ast::Item::Stmt(id) => {
                return Err(outside_unit(arena.stmt(*id).span));
            }
            ast::Item::Expr(id) => {
                return Err(outside_unit(arena.expr(*id).span));
            }
        }
    }

    for program_unit in &units {
        lowerer.declare_unit(program_unit, global, false)?;
    }
    for program_unit in &units {
        lowerer.lower_unit_body(program_unit, global, false)?;
    }

    debug!(
        symbols = lowerer.asr.symbols.len(),
        stmts = lowerer.asr.stmts.len(),
        exprs = lowerer.asr.exprs.len(),
        bytes = lowerer.asr.allocated_bytes(),
        "lowered translation unit"
    );
    Ok(lowerer.asr)
}

fn outside_unit(span: Span) -> SemanticError {
    SemanticError::new(
        span,
        ErrorCode::StatementOutsideUnit,
        "statements and expressions must appear inside a program unit",
    )
}

struct Lowerer<'a> {
    arena: &'a ast::AstArena,
    asr: Asr,
    /// `implicit none` is in effect for the unit being lowered.
    implicit_none: bool,
}

/// A declared variable whose extents and initializer are lowered once every
/// name of the scope exists.
struct PendingDecl<'d> {
    symbol: SymbolId,
    dims: Option<&'d [ast::DimSpec]>,
    init: Option<ast::ExprId>,
}

impl<'a> Lowerer<'a> {
    fn name(&self, ident: ast::Ident) -> &'a str {
        self.arena.name(ident.name)
    }

    // ========== Headers ==========

    fn declare_unit(
        &mut self,
        unit: &ast::ProgramUnit,
        parent: SymtabId,
        host_implicit_none: bool,
    ) -> Result<()> {
        let name = self.name(unit.name);
        if self.asr.lookup_local(parent, name).is_some() {
            return Err(SemanticError::new(
                unit.name.span,
                ErrorCode::DuplicateDeclaration,
                format!("`{name}` is already defined in this scope"),
            ));
        }

        let symbol = match unit.kind {
            ast::UnitKind::Program => self.asr.make_program(parent, name, unit.span),
            _ => self.asr.make_function(parent, name, unit.span),
        };
        let table = self.asr.scope_symtab(symbol);
        self.implicit_none = unit.implicit_none || host_implicit_none;

        let result = match &unit.kind {
            ast::UnitKind::Function { result } => Some(result.unwrap_or(unit.name)),
            _ => None,
        };

        let mut pending = Vec::new();
        for decl in &unit.decls {
            self.declare_variables(decl, table, unit, result, &mut pending)?;
        }
        for item in pending {
            self.finish_variable(item, table)?;
        }

        let mut args = Vec::with_capacity(unit.args.len());
        for arg in &unit.args {
            let var = self.dummy(table, *arg, Intent::Unspecified)?;
            args.push(self.asr.make_var(var, arg.span));
        }
        let return_var = match result {
            Some(result) => {
                let var = self.dummy(table, result, Intent::ReturnVar)?;
                Some(self.asr.make_var(var, result.span))
            }
            None => None,
        };
        if let Some(function) = self.asr.symbols[symbol].kind.as_function_mut() {
            function.args = args;
            function.return_var = return_var;
        }

        let implicit_none = self.implicit_none;
        for contained in &unit.contains {
            self.declare_unit(contained, table, implicit_none)?;
        }
        Ok(())
    }

    fn declare_variables<'d>(
        &mut self,
        decl: &'d ast::Decl,
        table: SymtabId,
        unit: &ast::ProgramUnit,
        result: Option<ast::Ident>,
        pending: &mut Vec<PendingDecl<'d>>,
    ) -> Result<()> {
        let mut allocatable = false;
        let mut intent = None;
        let mut shared_dims = None;
        for attr in &decl.attrs {
            match attr {
                ast::Attr::Allocatable => allocatable = true,
                ast::Attr::Intent(spec) => {
                    intent = Some(match spec {
                        ast::IntentSpec::In => Intent::In,
                        ast::IntentSpec::Out => Intent::Out,
                        ast::IntentSpec::InOut => Intent::InOut,
                    })
                }
                ast::Attr::Dimension(dims) => shared_dims = Some(dims.as_slice()),
            }
        }

        for entity in &decl.entities {
            let name = self.name(entity.name);
            if self.asr.lookup_local(table, name).is_some() {
                return Err(SemanticError::new(
                    entity.name.span,
                    ErrorCode::DuplicateDeclaration,
                    format!("`{name}` is declared twice"),
                ));
            }

            let is_arg = unit.args.iter().any(|arg| arg.name == entity.name.name);
            let is_result = result.is_some_and(|r| r.name == entity.name.name);
            let intent = match intent {
                Some(intent) => {
                    if !is_arg {
                        return Err(SemanticError::new(
                            entity.name.span,
                            ErrorCode::UndeclaredName,
                            format!("`{name}` has an intent but is not a dummy argument"),
                        ));
                    }
                    intent
                }
                None if is_result => Intent::ReturnVar,
                None if is_arg => Intent::Unspecified,
                None => Intent::Local,
            };

            let dims = entity.dims.as_deref().or(shared_dims);
            let mut ttype = base_type(decl.type_spec);
            if let Some(dims) = dims {
                ttype = Ttype::Array {
                    element: Box::new(ttype),
                    dims: vec![ArrayDim::Deferred; dims.len()],
                };
                let explicit = dims.iter().any(|d| matches!(d, ast::DimSpec::Extent(_)));
                if allocatable && explicit {
                    return Err(SemanticError::new(
                        entity.name.span,
                        ErrorCode::DeferredShapeRequired,
                        format!("allocatable array `{name}` must have a deferred shape"),
                    ));
                }
            }
            if allocatable {
                ttype = Ttype::Allocatable(Box::new(ttype));
            }

            let symbol = self
                .asr
                .make_variable(table, name, intent, ttype, entity.name.span);
            pending.push(PendingDecl {
                symbol,
                dims,
                init: entity.init,
            });
        }
        Ok(())
    }

    fn finish_variable(&mut self, item: PendingDecl<'_>, table: SymtabId) -> Result<()> {
        let mut extents = Vec::new();
        for dim in item.dims.unwrap_or_default() {
            extents.push(match dim {
                ast::DimSpec::Deferred => ArrayDim::Deferred,
                ast::DimSpec::Extent(id) => ArrayDim::Explicit(self.lower_expr(*id, table)?),
            });
        }
        let init = match item.init {
            Some(id) => Some(self.lower_expr(id, table)?),
            None => None,
        };

        let variable = self.asr.symbols[item.symbol].kind.variable_mut();
        if let Some(dims) = variable.ttype.dims_mut() {
            *dims = extents;
        }
        variable.init = init;
        Ok(())
    }

    /// The variable for a dummy argument or result, declared implicitly
    /// when no declaration names it.
    fn dummy(&mut self, table: SymtabId, ident: ast::Ident, intent: Intent) -> Result<SymbolId> {
        let name = self.name(ident);
        if let Some(symbol) = self.asr.lookup_local(table, name) {
            return Ok(symbol);
        }
        if self.implicit_none {
            return Err(undeclared(ident.span, name));
        }
        Ok(self
            .asr
            .make_variable(table, name, intent, implicit_type(name), ident.span))
    }

    // ========== Bodies ==========

    fn lower_unit_body(
        &mut self,
        unit: &ast::ProgramUnit,
        parent: SymtabId,
        host_implicit_none: bool,
    ) -> Result<()> {
        let name = self.name(unit.name);
        let Some(symbol) = self.asr.lookup_local(parent, name) else {
            fern_common::ice!("unit `{name}` has no header");
        };
        let table = self.asr.scope_symtab(symbol);
        self.implicit_none = unit.implicit_none || host_implicit_none;

        let body = self.lower_block(&unit.body, table)?;
        *self.asr.body_mut(symbol) = body;

        let implicit_none = self.implicit_none;
        for contained in &unit.contains {
            self.lower_unit_body(contained, table, implicit_none)?;
        }
        Ok(())
    }

    fn lower_block(&mut self, stmts: &[ast::StmtId], table: SymtabId) -> Result<Vec<StmtId>> {
        stmts
            .iter()
            .map(|id| self.lower_stmt(*id, table))
            .collect()
    }

    fn lower_stmt(&mut self, id: ast::StmtId, table: SymtabId) -> Result<StmtId> {
        let stmt = self.arena.stmt(id);
        let loc = stmt.span;

        match &stmt.kind {
            ast::StmtKind::Assignment { target, value } => {
                let target = self.lower_expr(*target, table)?;
                let value = self.lower_expr(*value, table)?;
                Ok(self.asr.make_assignment(target, value, loc))
            }
            ast::StmtKind::Allocate(items) => {
                let mut args: Vec<AllocArg> = Vec::with_capacity(items.len());
                for item in items {
                    let (arg, span) = self.lower_alloc_arg(*item, table)?;
                    if args.iter().any(|a| a.var == arg.var) {
                        return Err(repeated(span, self.asr.symbol_name(arg.var), "allocate"));
                    }
                    args.push(arg);
                }
                Ok(self.asr.make_allocate(args, loc))
            }
            ast::StmtKind::Deallocate(names) => {
                let mut vars = Vec::with_capacity(names.len());
                for ident in names {
                    let var = self.resolve(table, *ident)?;
                    let is_allocatable = self.asr.symbol(var).kind.as_variable().is_some_and(
                        |v| v.ttype.is_allocatable(),
                    );
                    if !is_allocatable {
                        return Err(SemanticError::new(
                            ident.span,
                            ErrorCode::DeallocateNotAllocatable,
                            format!("`{}` is not allocatable", self.name(*ident)),
                        ));
                    }
                    if vars.contains(&var) {
                        return Err(repeated(ident.span, self.name(*ident), "deallocate"));
                    }
                    vars.push(var);
                }
                Ok(self.asr.make_explicit_deallocate(vars, loc))
            }
            ast::StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let test = self.lower_expr(*cond, table)?;
                let body = self.lower_block(then_body, table)?;
                let orelse = self.lower_block(else_body, table)?;
                Ok(self.asr.make_if(test, body, orelse, loc))
            }
            ast::StmtKind::Do {
                var,
                start,
                end,
                step,
                body,
            } => {
                let symbol = self.resolve_variable(table, *var)?;
                let var = self.asr.make_var(symbol, var.span);
                let start = self.lower_expr(*start, table)?;
                let end = self.lower_expr(*end, table)?;
                let increment = match step {
                    Some(step) => Some(self.lower_expr(*step, table)?),
                    None => None,
                };
                let body = self.lower_block(body, table)?;
                Ok(self
                    .asr
                    .make_do_loop(var, start, end, increment, body, loc))
            }
            ast::StmtKind::Call { name, args } => {
                let callee = self.resolve(table, *name)?;
                if !self.asr.symbol(callee).kind.is_a(SymbolTag::Function) {
                    return Err(SemanticError::new(
                        name.span,
                        ErrorCode::NotAProcedure,
                        format!("`{}` is not a subroutine", self.name(*name)),
                    ));
                }
                let args = self.lower_exprs(args, table)?;
                Ok(self.asr.make_subroutine_call(callee, args, loc))
            }
            ast::StmtKind::Print(items) => {
                let values = self.lower_exprs(items, table)?;
                Ok(self.asr.make_print(values, loc))
            }
            ast::StmtKind::Return => Ok(self.asr.make_return(loc)),
        }
    }

    /// Lower one `name(extents)` item, returning it with the span of its name.
    fn lower_alloc_arg(
        &mut self,
        item: ast::ExprId,
        table: SymtabId,
    ) -> Result<(AllocArg, Span)> {
        let expr = self.arena.expr(item);
        let ast::ExprKind::FuncCallOrArray { name, args } = &expr.kind else {
            return Err(SemanticError::new(
                expr.span,
                ErrorCode::AllocateNotAllocatable,
                "`allocate` expects an array with its extents",
            ));
        };

        let var = self.resolve(table, *name)?;
        let ttype = self.asr.symbol(var).kind.as_variable().map(|v| &v.ttype);
        if !ttype.is_some_and(Ttype::is_allocatable) {
            return Err(SemanticError::new(
                name.span,
                ErrorCode::AllocateNotAllocatable,
                format!("`{}` is not allocatable", self.name(*name)),
            ));
        }
        let dims = self.lower_exprs(args, table)?;
        Ok((AllocArg { var, dims }, name.span))
    }

    // ========== Expressions ==========

    fn lower_exprs(&mut self, ids: &[ast::ExprId], table: SymtabId) -> Result<Vec<ExprId>> {
        ids.iter().map(|id| self.lower_expr(*id, table)).collect()
    }

    fn lower_expr(&mut self, id: ast::ExprId, table: SymtabId) -> Result<ExprId> {
        let expr = self.arena.expr(id);
        let loc = expr.span;

        let lowered = match &expr.kind {
            ast::ExprKind::Name(ident) => {
                let symbol = self.resolve_variable(table, *ident)?;
                self.asr.make_var(symbol, loc)
            }
            ast::ExprKind::FuncCallOrArray { name, args } => {
                return self.lower_call_or_item(*name, args, table, loc);
            }
            ast::ExprKind::Int(value) => {
                self.asr
                    .make_integer_constant(*value, Ttype::DEFAULT_INTEGER, loc)
            }
            ast::ExprKind::Real(text) => {
                let (value, kind) = parse_real(text).ok_or_else(|| {
                    SemanticError::new(
                        loc,
                        ErrorCode::InvalidNumber,
                        format!("invalid real literal `{text}`"),
                    )
                })?;
                self.asr
                    .make_real_constant(value, Ttype::Real { kind }, loc)
            }
            ast::ExprKind::Logical(value) => {
                self.asr
                    .make_logical_constant(*value, Ttype::DEFAULT_LOGICAL, loc)
            }
            ast::ExprKind::Str(value) => {
                self.asr
                    .make_string_constant(value.clone(), Ttype::Character, loc)
            }
            ast::ExprKind::BinOp { op, left, right } => {
                let left = self.lower_expr(*left, table)?;
                let right = self.lower_expr(*right, table)?;
                let ttype = self.arith_type(left, right);
                self.asr.make_bin_op(left, *op, right, ttype, loc)
            }
            ast::ExprKind::UnaryOp { op, operand } => {
                let operand = self.lower_expr(*operand, table)?;
                match op {
                    ast::UnaryOp::Plus => operand,
                    ast::UnaryOp::Minus => {
                        let ttype = self.element_type(operand);
                        self.asr.make_unary_minus(operand, ttype, loc)
                    }
                }
            }
            ast::ExprKind::Compare { op, left, right } => {
                let left = self.lower_expr(*left, table)?;
                let right = self.lower_expr(*right, table)?;
                self.asr
                    .make_compare(left, *op, right, Ttype::DEFAULT_LOGICAL, loc)
            }
            ast::ExprKind::BoolOp { op, left, right } => {
                let left = self.lower_expr(*left, table)?;
                let right = self.lower_expr(*right, table)?;
                self.asr
                    .make_logical_bin_op(left, *op, right, Ttype::DEFAULT_LOGICAL, loc)
            }
            ast::ExprKind::Not(operand) => {
                let operand = self.lower_expr(*operand, table)?;
                self.asr
                    .make_logical_not(operand, Ttype::DEFAULT_LOGICAL, loc)
            }
        };
        Ok(lowered)
    }

    /// `name(args)` is an array element when `name` is an array variable and
    /// a function call when it is a function.
    fn lower_call_or_item(
        &mut self,
        name: ast::Ident,
        args: &[ast::ExprId],
        table: SymtabId,
        loc: Span,
    ) -> Result<ExprId> {
        let symbol = self.resolve(table, name)?;
        let text = self.name(name);

        match &self.asr.symbol(symbol).kind {
            SymbolKind::Variable(variable) => {
                if !variable.ttype.is_array() {
                    return Err(SemanticError::new(
                        name.span,
                        ErrorCode::NotAnArray,
                        format!("`{text}` is not an array"),
                    ));
                }
                let element = variable.ttype.element().clone();
                let indices = self.lower_exprs(args, table)?;
                Ok(self.asr.make_array_item(symbol, indices, element, loc))
            }
            SymbolKind::Function(function) => {
                let Some(return_var) = function.return_var else {
                    return Err(SemanticError::new(
                        name.span,
                        ErrorCode::NotAProcedure,
                        format!("subroutine `{text}` cannot be used in an expression"),
                    ));
                };
                let ttype = self
                    .asr
                    .expr_type(return_var)
                    .cloned()
                    .unwrap_or(Ttype::DEFAULT_REAL);
                let args = self.lower_exprs(args, table)?;
                Ok(self.asr.make_function_call(symbol, args, ttype, loc))
            }
            SymbolKind::Program(_) => Err(SemanticError::new(
                name.span,
                ErrorCode::NotAProcedure,
                format!("program `{text}` cannot be called"),
            )),
        }
    }

    fn element_type(&self, id: ExprId) -> Ttype {
        self.asr
            .expr_type(id)
            .map_or(Ttype::DEFAULT_INTEGER, |t| t.element().clone())
    }

    /// Integer unless either side is real; the wider real kind wins.
    fn arith_type(&self, left: ExprId, right: ExprId) -> Ttype {
        let left = self.element_type(left);
        let right = self.element_type(right);
        match (&left, &right) {
            (Ttype::Real { kind: a }, Ttype::Real { kind: b }) => Ttype::Real { kind: *a.max(b) },
            (Ttype::Real { .. }, _) => left,
            (_, Ttype::Real { .. }) => right,
            _ => left,
        }
    }

    // ========== Names ==========

    /// Resolve `ident` through the scope chain of `table`.
    ///
    /// Without `implicit none` an unknown name becomes a local variable of
    /// `table` typed by its first letter.
    fn resolve(&mut self, table: SymtabId, ident: ast::Ident) -> Result<SymbolId> {
        let name = self.name(ident);
        if let Some(symbol) = self.asr.lookup(table, name) {
            return Ok(symbol);
        }
        if self.implicit_none {
            return Err(undeclared(ident.span, name));
        }
        debug!(name, "implicitly declaring variable");
        Ok(self
            .asr
            .make_variable(table, name, Intent::Local, implicit_type(name), ident.span))
    }

    fn resolve_variable(&mut self, table: SymtabId, ident: ast::Ident) -> Result<SymbolId> {
        let symbol = self.resolve(table, ident)?;
        if !self.asr.symbol(symbol).kind.is_a(SymbolTag::Variable) {
            return Err(SemanticError::new(
                ident.span,
                ErrorCode::UndeclaredName,
                format!("`{}` is not a variable", self.name(ident)),
            ));
        }
        Ok(symbol)
    }
}

fn repeated(span: Span, name: &str, statement: &str) -> SemanticError {
    SemanticError::new(
        span,
        ErrorCode::RepeatedName,
        format!("`{name}` appears twice in one `{statement}`"),
    )
    .with_note(format!("each variable may be named once per `{statement}` statement"))
}

fn undeclared(span: Span, name: &str) -> SemanticError {
    SemanticError::new(
        span,
        ErrorCode::UndeclaredName,
        format!("`{name}` is not declared"),
    )
}

fn base_type(spec: ast::TypeSpec) -> Ttype {
    let kind = spec.kind.unwrap_or(4);
    match spec.base {
        ast::BaseType::Integer => Ttype::Integer { kind },
        ast::BaseType::Real => Ttype::Real { kind },
        ast::BaseType::Logical => Ttype::Logical { kind },
        ast::BaseType::Character => Ttype::Character,
    }
}

/// Names starting with `i` to `n` are integers, everything else is real.
fn implicit_type(name: &str) -> Ttype {
    match name.as_bytes().first() {
        Some(b'i'..=b'n') => Ttype::DEFAULT_INTEGER,
        _ => Ttype::DEFAULT_REAL,
    }
}

/// Value and kind of a real literal; a `d` exponent means double precision.
fn parse_real(text: &str) -> Option<(f64, u8)> {
    let double = text.contains(['d', 'D']);
    let normalized = text.replace(['d', 'D'], "e");
    let value = normalized.parse::<f64>().ok()?;
    Some((value, if double { 8 } else { 4 }))
}
