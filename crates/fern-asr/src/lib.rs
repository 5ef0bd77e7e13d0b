//! Abstract semantic representation for Fern.
//! Fern 抽象语义表示（ASR）。
//!
//! The ASR is the fully resolved form of a program: every name is bound to a
//! symbol in a tree of scoped symbol tables and every expression carries its
//! type. All nodes of one translation unit live in the arenas of an [`Asr`]
//! and refer to each other by handle. Strong handles (`StmtId`, `ExprId`,
//! owned `SymtabId`s) form the tree; `SymbolId` references from statements
//! and expressions are weak and never walked.
//!
//! [`lower`] builds an `Asr` from a parsed syntax tree, [`verify`] checks its
//! structure and [`render`] prints it.

mod asr;
mod lower;
mod node;
mod pretty;
mod ty;
mod verify;
pub mod visit;

pub use asr::{Asr, TranslationUnit};
pub use lower::{SemanticError, lower};
pub use node::*;
pub use pretty::render;
pub use ty::{ArrayDim, Intent, Ttype};
pub use verify::{VerifyError, verify};
pub use visit::{Rewriter, Visitor};
