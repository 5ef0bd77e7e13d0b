//! Parser for Fern.
//!
//! This crate provides a recursive descent parser that converts
//! tokens into a syntax tree allocated in an [`AstArena`].
//!
//! ## Error Recovery
//!
//! The parser implements error recovery to continue parsing after
//! encountering errors, allowing multiple errors to be reported
//! in a single parse pass.

mod parser;
mod recovery;

pub use parser::Parser;

use fern_common::Span;
use fern_diagnostic::Diagnostic;
use fern_lexer::Lexer;
use fern_syntax::{AstArena, TranslationUnit};
use thiserror::Error;
use tracing::debug;

/// Source text that could not be lexed or parsed.
///
/// `span` and `message` describe the first error; `diagnostics` holds every
/// error collected before parsing stopped.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ParseError {
    pub span: Span,
    pub message: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse source code into a syntax tree, keeping every diagnostic.
pub fn parse_with_diagnostics(
    arena: &mut AstArena,
    source: &str,
) -> (TranslationUnit, Vec<Diagnostic>) {
    let lexer = Lexer::new(source);
    let (tokens, mut diagnostics) = lexer.tokenize();
    debug!(tokens = tokens.len(), "parsing");

    let mut parser = Parser::new(tokens, arena);
    let unit = parser.parse_unit();

    diagnostics.extend(parser.diagnostics());
    (unit, diagnostics)
}

/// Parse source code into a syntax tree.
///
/// Nodes are allocated into `arena`. When any error is reported the partial
/// tree is discarded; its nodes stay in the arena until it is dropped.
pub fn parse(arena: &mut AstArena, source: &str) -> Result<TranslationUnit, ParseError> {
    let (unit, diagnostics) = parse_with_diagnostics(arena, source);

    match diagnostics.iter().find(|d| d.is_error()) {
        Some(first) => Err(ParseError {
            span: first.span,
            message: first.message.clone(),
            diagnostics,
        }),
        None => Ok(unit),
    }
}
