//! Common utilities and data structures for Fern.
//!
//! This crate provides foundational types used across the Fern compiler:
//! - `Span`: Source code location tracking
//! - `Interner`: String interning for identifier names
//! - `Arena`: Region allocator backing every tree node of a compilation unit

mod arena;
mod ice;
mod interner;
mod span;

pub use arena::{Arena, Idx, IdxRange};
pub use interner::{Interner, Name};
pub use span::{BytePos, LineCol, LineIndex, Span};

#[doc(hidden)]
pub use ice::ice_abort;
