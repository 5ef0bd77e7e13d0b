//! ASR node kinds.
//! ASR 节点种类。
//!
//! Every node is a closed tagged variant: a `*Kind` enum whose discriminant
//! is mirrored by a `*Tag` enum, plus the source location. Child nodes are
//! referenced by handle. A symbol referenced from an expression or statement
//! (`Var`, `ArrayItem`, release lists, call targets) is a weak back-reference
//! owned by a symbol table; walkers never descend through it.

use std::collections::BTreeMap;
use std::fmt;

use fern_common::{Idx, Span, ice};
use smallvec::SmallVec;

use crate::ty::{ArrayDim, Intent, Ttype};
pub use fern_syntax::{BinOp, BoolOp, CmpOp};

pub type SymbolId = Idx<Symbol>;
pub type SymtabId = Idx<SymbolTable>;
pub type StmtId = Idx<Stmt>;
pub type ExprId = Idx<Expr>;

/// A handle to a node of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Symbol(SymbolId),
    Symtab(SymtabId),
    Stmt(StmtId),
    Expr(ExprId),
}

pub type Children = SmallVec<[NodeId; 4]>;

/// A mutable child slot of a node.
enum Slot<'a> {
    Symtab(&'a mut SymtabId),
    Stmt(&'a mut StmtId),
    Expr(&'a mut ExprId),
}

fn replace_slot(
    mut slots: SmallVec<[Slot<'_>; 4]>,
    index: usize,
    node: NodeId,
    tag: &dyn fmt::Display,
) {
    if index >= slots.len() {
        ice!("{tag} has no child slot {index}");
    }
    match (slots.swap_remove(index), node) {
        (Slot::Symtab(slot), NodeId::Symtab(id)) => *slot = id,
        (Slot::Stmt(slot), NodeId::Stmt(id)) => *slot = id,
        (Slot::Expr(slot), NodeId::Expr(id)) => *slot = id,
        (_, node) => ice!("child slot {index} of {tag} cannot hold {node:?}"),
    }
}

// ========== Symbol tables ==========

/// Name to symbol map of one scope.
///
/// Iteration is in name order. The global table has no parent.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    pub parent: Option<SymtabId>,
    /// The Program or Function symbol owning this table.
    pub owner: Option<SymbolId>,
    pub scope: BTreeMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.scope.get(name).copied()
    }

    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.scope.values().copied()
    }

    pub fn children(&self) -> Children {
        self.symbols().map(NodeId::Symbol).collect()
    }
}

// ========== Symbols ==========

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub loc: Span,
    /// The table this symbol is registered in.
    pub parent: SymtabId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Program(Program),
    Function(Function),
    Variable(Variable),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTag {
    Program,
    Function,
    Variable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub symtab: SymtabId,
    pub body: Vec<StmtId>,
}

/// A function or subroutine; subroutines have no return variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub symtab: SymtabId,
    /// `Var` expressions naming the dummy arguments.
    pub args: Vec<ExprId>,
    pub body: Vec<StmtId>,
    pub return_var: Option<ExprId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub intent: Intent,
    pub ttype: Ttype,
    pub init: Option<ExprId>,
}

impl Variable {
    /// Local, allocatable array storage that must be released when the
    /// scope exits.
    pub fn is_local_allocatable_array(&self) -> bool {
        self.intent == Intent::Local && self.ttype.is_allocatable() && self.ttype.is_array()
    }
}

impl SymbolKind {
    pub fn tag(&self) -> SymbolTag {
        match self {
            SymbolKind::Program(_) => SymbolTag::Program,
            SymbolKind::Function(_) => SymbolTag::Function,
            SymbolKind::Variable(_) => SymbolTag::Variable,
        }
    }

    pub fn is_a(&self, tag: SymbolTag) -> bool {
        self.tag() == tag
    }

    pub fn name(&self) -> &str {
        match self {
            SymbolKind::Program(p) => &p.name,
            SymbolKind::Function(f) => &f.name,
            SymbolKind::Variable(v) => &v.name,
        }
    }

    /// Program and Function symbols own a table and a body.
    pub fn is_scope(&self) -> bool {
        matches!(self, SymbolKind::Program(_) | SymbolKind::Function(_))
    }

    pub fn as_program(&self) -> Option<&Program> {
        match self {
            SymbolKind::Program(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self {
            SymbolKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            SymbolKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut Function> {
        match self {
            SymbolKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut Variable> {
        match self {
            SymbolKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    #[track_caller]
    pub fn program(&self) -> &Program {
        match self.as_program() {
            Some(p) => p,
            None => ice!("expected a program symbol, found {}", self.tag()),
        }
    }

    #[track_caller]
    pub fn function(&self) -> &Function {
        match self.as_function() {
            Some(f) => f,
            None => ice!("expected a function symbol, found {}", self.tag()),
        }
    }

    #[track_caller]
    pub fn variable(&self) -> &Variable {
        match self.as_variable() {
            Some(v) => v,
            None => ice!("expected a variable symbol, found {}", self.tag()),
        }
    }

    #[track_caller]
    pub fn function_mut(&mut self) -> &mut Function {
        let tag = self.tag();
        match self.as_function_mut() {
            Some(f) => f,
            None => ice!("expected a function symbol, found {tag}"),
        }
    }

    #[track_caller]
    pub fn variable_mut(&mut self) -> &mut Variable {
        let tag = self.tag();
        match self.as_variable_mut() {
            Some(v) => v,
            None => ice!("expected a variable symbol, found {tag}"),
        }
    }

    /// The table owned by a scope.
    #[track_caller]
    pub fn symtab(&self) -> SymtabId {
        match self {
            SymbolKind::Program(p) => p.symtab,
            SymbolKind::Function(f) => f.symtab,
            SymbolKind::Variable(_) => ice!("variable symbol owns no symbol table"),
        }
    }

    #[track_caller]
    pub fn body(&self) -> &[StmtId] {
        match self {
            SymbolKind::Program(p) => &p.body,
            SymbolKind::Function(f) => &f.body,
            SymbolKind::Variable(_) => ice!("variable symbol has no body"),
        }
    }

    #[track_caller]
    pub fn body_mut(&mut self) -> &mut Vec<StmtId> {
        match self {
            SymbolKind::Program(p) => &mut p.body,
            SymbolKind::Function(f) => &mut f.body,
            SymbolKind::Variable(_) => ice!("variable symbol has no body"),
        }
    }

    /// Children in declaration order: the owned table, then arguments, body
    /// and return variable. A variable's children are its explicit extents
    /// and its initializer.
    pub fn children(&self) -> Children {
        let mut out = Children::new();
        match self {
            SymbolKind::Program(p) => {
                out.push(NodeId::Symtab(p.symtab));
                out.extend(p.body.iter().copied().map(NodeId::Stmt));
            }
            SymbolKind::Function(f) => {
                out.push(NodeId::Symtab(f.symtab));
                out.extend(f.args.iter().copied().map(NodeId::Expr));
                out.extend(f.body.iter().copied().map(NodeId::Stmt));
                out.extend(f.return_var.map(NodeId::Expr));
            }
            SymbolKind::Variable(v) => {
                out.extend(explicit_extents(v.ttype.dims()).map(NodeId::Expr));
                out.extend(v.init.map(NodeId::Expr));
            }
        }
        out
    }

    #[track_caller]
    pub fn replace_child(&mut self, index: usize, node: NodeId) {
        let tag = self.tag();
        let mut slots = SmallVec::new();
        match self {
            SymbolKind::Program(p) => {
                slots.push(Slot::Symtab(&mut p.symtab));
                slots.extend(p.body.iter_mut().map(Slot::Stmt));
            }
            SymbolKind::Function(f) => {
                slots.push(Slot::Symtab(&mut f.symtab));
                slots.extend(f.args.iter_mut().map(Slot::Expr));
                slots.extend(f.body.iter_mut().map(Slot::Stmt));
                slots.extend(f.return_var.as_mut().map(Slot::Expr));
            }
            SymbolKind::Variable(v) => {
                if let Some(dims) = v.ttype.dims_mut() {
                    slots.extend(dims.iter_mut().filter_map(|dim| match dim {
                        ArrayDim::Explicit(id) => Some(Slot::Expr(id)),
                        ArrayDim::Deferred => None,
                    }));
                }
                slots.extend(v.init.as_mut().map(Slot::Expr));
            }
        }
        replace_slot(slots, index, node, &tag);
    }
}

fn explicit_extents(dims: Option<&[ArrayDim]>) -> impl Iterator<Item = ExprId> + '_ {
    dims.unwrap_or_default().iter().filter_map(|dim| match dim {
        ArrayDim::Explicit(id) => Some(*id),
        ArrayDim::Deferred => None,
    })
}

// ========== Statements ==========

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: Span,
}

/// One array named by `allocate`, with its extents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocArg {
    pub var: SymbolId,
    pub dims: Vec<ExprId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Assignment {
        target: ExprId,
        value: ExprId,
    },
    Allocate {
        args: Vec<AllocArg>,
    },
    /// `deallocate(...)` written in the source.
    ExplicitDeallocate {
        vars: Vec<SymbolId>,
    },
    /// Release inserted by a pass at scope exit.
    ImplicitDeallocate {
        vars: Vec<SymbolId>,
    },
    If {
        test: ExprId,
        body: Vec<StmtId>,
        orelse: Vec<StmtId>,
    },
    DoLoop {
        var: ExprId,
        start: ExprId,
        end: ExprId,
        increment: Option<ExprId>,
        body: Vec<StmtId>,
    },
    SubroutineCall {
        name: SymbolId,
        args: Vec<ExprId>,
    },
    Print {
        values: Vec<ExprId>,
    },
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtTag {
    Assignment,
    Allocate,
    ExplicitDeallocate,
    ImplicitDeallocate,
    If,
    DoLoop,
    SubroutineCall,
    Print,
    Return,
}

impl StmtKind {
    pub fn tag(&self) -> StmtTag {
        match self {
            StmtKind::Assignment { .. } => StmtTag::Assignment,
            StmtKind::Allocate { .. } => StmtTag::Allocate,
            StmtKind::ExplicitDeallocate { .. } => StmtTag::ExplicitDeallocate,
            StmtKind::ImplicitDeallocate { .. } => StmtTag::ImplicitDeallocate,
            StmtKind::If { .. } => StmtTag::If,
            StmtKind::DoLoop { .. } => StmtTag::DoLoop,
            StmtKind::SubroutineCall { .. } => StmtTag::SubroutineCall,
            StmtKind::Print { .. } => StmtTag::Print,
            StmtKind::Return => StmtTag::Return,
        }
    }

    pub fn is_a(&self, tag: StmtTag) -> bool {
        self.tag() == tag
    }

    pub fn as_explicit_deallocate(&self) -> Option<&[SymbolId]> {
        match self {
            StmtKind::ExplicitDeallocate { vars } => Some(vars),
            _ => None,
        }
    }

    pub fn as_implicit_deallocate(&self) -> Option<&[SymbolId]> {
        match self {
            StmtKind::ImplicitDeallocate { vars } => Some(vars),
            _ => None,
        }
    }

    /// Variables named by either kind of release statement.
    pub fn as_release(&self) -> Option<&[SymbolId]> {
        match self {
            StmtKind::ExplicitDeallocate { vars } | StmtKind::ImplicitDeallocate { vars } => {
                Some(vars)
            }
            _ => None,
        }
    }

    #[track_caller]
    pub fn implicit_deallocate(&self) -> &[SymbolId] {
        match self.as_implicit_deallocate() {
            Some(vars) => vars,
            None => ice!(
                "expected {} statement, found {}",
                StmtTag::ImplicitDeallocate,
                self.tag()
            ),
        }
    }

    #[track_caller]
    pub fn explicit_deallocate(&self) -> &[SymbolId] {
        match self.as_explicit_deallocate() {
            Some(vars) => vars,
            None => ice!(
                "expected {} statement, found {}",
                StmtTag::ExplicitDeallocate,
                self.tag()
            ),
        }
    }

    /// Symbols referenced weakly by this statement.
    pub fn symbol_refs(&self) -> SmallVec<[SymbolId; 4]> {
        match self {
            StmtKind::Allocate { args } => args.iter().map(|arg| arg.var).collect(),
            StmtKind::ExplicitDeallocate { vars } | StmtKind::ImplicitDeallocate { vars } => {
                vars.iter().copied().collect()
            }
            StmtKind::SubroutineCall { name, .. } => SmallVec::from_elem(*name, 1),
            _ => SmallVec::new(),
        }
    }

    /// Children in declaration order.
    pub fn children(&self) -> Children {
        let mut out = Children::new();
        match self {
            StmtKind::Assignment { target, value } => {
                out.push(NodeId::Expr(*target));
                out.push(NodeId::Expr(*value));
            }
            StmtKind::Allocate { args } => {
                for arg in args {
                    out.extend(arg.dims.iter().copied().map(NodeId::Expr));
                }
            }
            StmtKind::ExplicitDeallocate { .. }
            | StmtKind::ImplicitDeallocate { .. }
            | StmtKind::Return => {}
            StmtKind::If { test, body, orelse } => {
                out.push(NodeId::Expr(*test));
                out.extend(body.iter().chain(orelse).copied().map(NodeId::Stmt));
            }
            StmtKind::DoLoop {
                var,
                start,
                end,
                increment,
                body,
            } => {
                out.push(NodeId::Expr(*var));
                out.push(NodeId::Expr(*start));
                out.push(NodeId::Expr(*end));
                out.extend(increment.map(NodeId::Expr));
                out.extend(body.iter().copied().map(NodeId::Stmt));
            }
            StmtKind::SubroutineCall { args, .. } => {
                out.extend(args.iter().copied().map(NodeId::Expr));
            }
            StmtKind::Print { values } => {
                out.extend(values.iter().copied().map(NodeId::Expr));
            }
        }
        out
    }

    /// Overwrite the `index`-th child returned by [`StmtKind::children`].
    #[track_caller]
    pub fn replace_child(&mut self, index: usize, node: NodeId) {
        let tag = self.tag();
        let mut slots = SmallVec::new();
        match self {
            StmtKind::Assignment { target, value } => {
                slots.push(Slot::Expr(target));
                slots.push(Slot::Expr(value));
            }
            StmtKind::Allocate { args } => {
                for arg in args {
                    slots.extend(arg.dims.iter_mut().map(Slot::Expr));
                }
            }
            StmtKind::ExplicitDeallocate { .. }
            | StmtKind::ImplicitDeallocate { .. }
            | StmtKind::Return => {}
            StmtKind::If { test, body, orelse } => {
                slots.push(Slot::Expr(test));
                slots.extend(body.iter_mut().chain(orelse.iter_mut()).map(Slot::Stmt));
            }
            StmtKind::DoLoop {
                var,
                start,
                end,
                increment,
                body,
            } => {
                slots.push(Slot::Expr(var));
                slots.push(Slot::Expr(start));
                slots.push(Slot::Expr(end));
                slots.extend(increment.as_mut().map(Slot::Expr));
                slots.extend(body.iter_mut().map(Slot::Stmt));
            }
            StmtKind::SubroutineCall { args, .. } => {
                slots.extend(args.iter_mut().map(Slot::Expr));
            }
            StmtKind::Print { values } => {
                slots.extend(values.iter_mut().map(Slot::Expr));
            }
        }
        replace_slot(slots, index, node, &tag);
    }
}

// ========== Expressions ==========

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Reference to a variable; its type is the variable's.
    Var(SymbolId),
    IntegerConstant {
        value: i64,
        ttype: Ttype,
    },
    RealConstant {
        value: f64,
        ttype: Ttype,
    },
    LogicalConstant {
        value: bool,
        ttype: Ttype,
    },
    StringConstant {
        value: String,
        ttype: Ttype,
    },
    BinOp {
        left: ExprId,
        op: BinOp,
        right: ExprId,
        ttype: Ttype,
    },
    UnaryMinus {
        operand: ExprId,
        ttype: Ttype,
    },
    Compare {
        left: ExprId,
        op: CmpOp,
        right: ExprId,
        ttype: Ttype,
    },
    LogicalBinOp {
        left: ExprId,
        op: BoolOp,
        right: ExprId,
        ttype: Ttype,
    },
    LogicalNot {
        operand: ExprId,
        ttype: Ttype,
    },
    ArrayItem {
        var: SymbolId,
        indices: Vec<ExprId>,
        ttype: Ttype,
    },
    FunctionCall {
        name: SymbolId,
        args: Vec<ExprId>,
        ttype: Ttype,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprTag {
    Var,
    IntegerConstant,
    RealConstant,
    LogicalConstant,
    StringConstant,
    BinOp,
    UnaryMinus,
    Compare,
    LogicalBinOp,
    LogicalNot,
    ArrayItem,
    FunctionCall,
}

impl ExprKind {
    pub fn tag(&self) -> ExprTag {
        match self {
            ExprKind::Var(_) => ExprTag::Var,
            ExprKind::IntegerConstant { .. } => ExprTag::IntegerConstant,
            ExprKind::RealConstant { .. } => ExprTag::RealConstant,
            ExprKind::LogicalConstant { .. } => ExprTag::LogicalConstant,
            ExprKind::StringConstant { .. } => ExprTag::StringConstant,
            ExprKind::BinOp { .. } => ExprTag::BinOp,
            ExprKind::UnaryMinus { .. } => ExprTag::UnaryMinus,
            ExprKind::Compare { .. } => ExprTag::Compare,
            ExprKind::LogicalBinOp { .. } => ExprTag::LogicalBinOp,
            ExprKind::LogicalNot { .. } => ExprTag::LogicalNot,
            ExprKind::ArrayItem { .. } => ExprTag::ArrayItem,
            ExprKind::FunctionCall { .. } => ExprTag::FunctionCall,
        }
    }

    pub fn is_a(&self, tag: ExprTag) -> bool {
        self.tag() == tag
    }

    pub fn as_var(&self) -> Option<SymbolId> {
        match self {
            ExprKind::Var(symbol) => Some(*symbol),
            _ => None,
        }
    }

    #[track_caller]
    pub fn var(&self) -> SymbolId {
        match self.as_var() {
            Some(symbol) => symbol,
            None => ice!("expected {} expression, found {}", ExprTag::Var, self.tag()),
        }
    }

    pub fn as_integer_constant(&self) -> Option<i64> {
        match self {
            ExprKind::IntegerConstant { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The type stored on the node; `Var` takes its type from the symbol.
    pub fn ttype(&self) -> Option<&Ttype> {
        match self {
            ExprKind::Var(_) => None,
            ExprKind::IntegerConstant { ttype, .. }
            | ExprKind::RealConstant { ttype, .. }
            | ExprKind::LogicalConstant { ttype, .. }
            | ExprKind::StringConstant { ttype, .. }
            | ExprKind::BinOp { ttype, .. }
            | ExprKind::UnaryMinus { ttype, .. }
            | ExprKind::Compare { ttype, .. }
            | ExprKind::LogicalBinOp { ttype, .. }
            | ExprKind::LogicalNot { ttype, .. }
            | ExprKind::ArrayItem { ttype, .. }
            | ExprKind::FunctionCall { ttype, .. } => Some(ttype),
        }
    }

    /// The symbol referenced weakly by this expression, if any.
    pub fn symbol_ref(&self) -> Option<SymbolId> {
        match self {
            ExprKind::Var(symbol) => Some(*symbol),
            ExprKind::ArrayItem { var, .. } => Some(*var),
            ExprKind::FunctionCall { name, .. } => Some(*name),
            _ => None,
        }
    }

    /// Children in declaration order.
    pub fn children(&self) -> Children {
        let mut out = Children::new();
        match self {
            ExprKind::Var(_)
            | ExprKind::IntegerConstant { .. }
            | ExprKind::RealConstant { .. }
            | ExprKind::LogicalConstant { .. }
            | ExprKind::StringConstant { .. } => {}
            ExprKind::BinOp { left, right, .. }
            | ExprKind::Compare { left, right, .. }
            | ExprKind::LogicalBinOp { left, right, .. } => {
                out.push(NodeId::Expr(*left));
                out.push(NodeId::Expr(*right));
            }
            ExprKind::UnaryMinus { operand, .. } | ExprKind::LogicalNot { operand, .. } => {
                out.push(NodeId::Expr(*operand));
            }
            ExprKind::ArrayItem { indices: args, .. } | ExprKind::FunctionCall { args, .. } => {
                out.extend(args.iter().copied().map(NodeId::Expr));
            }
        }
        out
    }

    /// Overwrite the `index`-th child returned by [`ExprKind::children`].
    #[track_caller]
    pub fn replace_child(&mut self, index: usize, node: NodeId) {
        let tag = self.tag();
        let mut slots = SmallVec::new();
        match self {
            ExprKind::Var(_)
            | ExprKind::IntegerConstant { .. }
            | ExprKind::RealConstant { .. }
            | ExprKind::LogicalConstant { .. }
            | ExprKind::StringConstant { .. } => {}
            ExprKind::BinOp { left, right, .. }
            | ExprKind::Compare { left, right, .. }
            | ExprKind::LogicalBinOp { left, right, .. } => {
                slots.push(Slot::Expr(left));
                slots.push(Slot::Expr(right));
            }
            ExprKind::UnaryMinus { operand, .. } | ExprKind::LogicalNot { operand, .. } => {
                slots.push(Slot::Expr(operand));
            }
            ExprKind::ArrayItem { indices: args, .. } | ExprKind::FunctionCall { args, .. } => {
                slots.extend(args.iter_mut().map(Slot::Expr));
            }
        }
        replace_slot(slots, index, node, &tag);
    }
}

impl fmt::Display for SymbolTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for StmtTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for ExprTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fern_common::Arena;

    fn exprs(n: usize) -> (Arena<Expr>, Vec<ExprId>) {
        let mut arena = Arena::new();
        let ids = (0..n)
            .map(|i| {
                arena.alloc(Expr {
                    kind: ExprKind::IntegerConstant {
                        value: i as i64,
                        ttype: Ttype::DEFAULT_INTEGER,
                    },
                    loc: Span::DUMMY,
                })
            })
            .collect();
        (arena, ids)
    }

    #[test]
    fn test_tag_and_narrowing() {
        let (_, ids) = exprs(2);
        let kind = ExprKind::BinOp {
            left: ids[0],
            op: BinOp::Add,
            right: ids[1],
            ttype: Ttype::DEFAULT_INTEGER,
        };
        assert!(kind.is_a(ExprTag::BinOp));
        assert!(!kind.is_a(ExprTag::Var));
        assert_eq!(kind.as_var(), None);
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn test_asserting_narrowing_on_mismatch() {
        let kind = ExprKind::LogicalConstant {
            value: true,
            ttype: Ttype::DEFAULT_LOGICAL,
        };
        let _ = kind.var();
    }

    #[test]
    fn test_replace_child_matches_children_order() {
        let (_, ids) = exprs(4);
        let mut kind = StmtKind::DoLoop {
            var: ids[0],
            start: ids[1],
            end: ids[2],
            increment: None,
            body: Vec::new(),
        };
        kind.replace_child(2, NodeId::Expr(ids[3]));
        assert_eq!(
            kind.children().as_slice(),
            &[
                NodeId::Expr(ids[0]),
                NodeId::Expr(ids[1]),
                NodeId::Expr(ids[3]),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn test_replace_child_checks_role() {
        let (_, ids) = exprs(2);
        let mut kind = StmtKind::Assignment {
            target: ids[0],
            value: ids[1],
        };
        let mut stmts: Arena<Stmt> = Arena::new();
        let stmt = stmts.alloc(Stmt {
            kind: StmtKind::Return,
            loc: Span::DUMMY,
        });
        kind.replace_child(1, NodeId::Stmt(stmt));
    }

    #[test]
    fn test_if_children_list_both_branches() {
        let (_, ids) = exprs(1);
        let mut stmts: Arena<Stmt> = Arena::new();
        let a = stmts.alloc(Stmt {
            kind: StmtKind::Return,
            loc: Span::DUMMY,
        });
        let b = stmts.alloc(Stmt {
            kind: StmtKind::Return,
            loc: Span::DUMMY,
        });
        let kind = StmtKind::If {
            test: ids[0],
            body: vec![a],
            orelse: vec![b],
        };
        assert_eq!(
            kind.children().as_slice(),
            &[NodeId::Expr(ids[0]), NodeId::Stmt(a), NodeId::Stmt(b)]
        );
    }
}
