//! Top-level syntax definitions.
//! 顶层语法定义。

use crate::{ExprId, StmtId};
use fern_common::{Name, Span};

/// A complete source file, or a line typed interactively.
/// 完整的源文件，或交互式输入的一行。
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub items: Vec<Item>,
    pub span: Span,
}

/// A top-level item.
/// 顶层项。
#[derive(Debug, Clone)]
pub enum Item {
    /// `program`, `subroutine` or `function` / 程序单元
    Unit(ProgramUnit),
    /// A bare statement / 独立语句
    Stmt(StmtId),
    /// A bare expression / 独立表达式
    Expr(ExprId),
}

/// A program, subroutine or function.
/// 程序、子程序或函数。
#[derive(Debug, Clone)]
pub struct ProgramUnit {
    pub kind: UnitKind,
    pub name: Ident,
    /// Dummy argument names / 哑元参数名
    pub args: Vec<Ident>,
    pub implicit_none: bool,
    pub decls: Vec<Decl>,
    pub body: Vec<StmtId>,
    /// Units after `contains` / `contains` 之后的单元
    pub contains: Vec<ProgramUnit>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitKind {
    Program,
    Subroutine,
    /// `function f(x) result(r)` / 函数
    Function { result: Option<Ident> },
}

impl UnitKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            UnitKind::Program => "program",
            UnitKind::Subroutine => "subroutine",
            UnitKind::Function { .. } => "function",
        }
    }
}

/// A type declaration statement.
/// 类型声明语句。
///
/// `real, allocatable, dimension(:) :: a, b(:,:), c = 1`
#[derive(Debug, Clone)]
pub struct Decl {
    pub type_spec: TypeSpec,
    pub attrs: Vec<Attr>,
    pub entities: Vec<Entity>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    pub base: BaseType,
    /// `real(8)` / 种别参数
    pub kind: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Integer,
    Real,
    Logical,
    Character,
}

/// Declaration attribute.
/// 声明属性。
#[derive(Debug, Clone)]
pub enum Attr {
    Allocatable,
    Intent(IntentSpec),
    Dimension(Vec<DimSpec>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentSpec {
    In,
    Out,
    InOut,
}

/// One array dimension.
/// 数组的一个维度。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimSpec {
    /// `:` / 延迟形状
    Deferred,
    /// Explicit extent / 显式范围
    Extent(ExprId),
}

/// One declared name.
/// 声明的一个名字。
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: Ident,
    pub dims: Option<Vec<DimSpec>>,
    pub init: Option<ExprId>,
}

/// An interned identifier with its location.
/// 带位置的驻留标识符。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    pub fn new(name: Name, span: Span) -> Self {
        Self { name, span }
    }
}
