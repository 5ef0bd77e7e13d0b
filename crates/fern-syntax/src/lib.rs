//! Syntax tree definitions for Fern.
//!
//! The parser allocates every expression and statement into an [`AstArena`]
//! and links them by handle. Program units, declarations and the translation
//! unit itself are plain owned values that hold those handles.

mod arena;
mod ast;
mod expr;
mod stmt;
pub mod visit;

pub use arena::{AstArena, ExprId, StmtId};
pub use ast::*;
pub use expr::*;
pub use stmt::*;
pub use visit::Visitor;
