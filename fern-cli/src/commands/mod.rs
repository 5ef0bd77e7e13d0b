//! CLI command implementations.
//! CLI 命令实现。
//!
//! Every command returns `Err` with a one-line summary after the detailed
//! diagnostics have been printed.

pub mod asr;
pub mod ast;
pub mod check;
pub mod tokens;

use std::fs;

use fern_asr::Asr;
use fern_diagnostic::{Diagnostic, emit};
use fern_syntax::{AstArena, TranslationUnit};
use tracing::warn;

pub(crate) fn read_source(file: &str) -> Result<String, String> {
    fs::read_to_string(file).map_err(|e| format!("cannot read file '{file}': {e}"))
}

pub(crate) fn emit_all(source: &str, file: &str, diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        if let Err(e) = emit(source, file, diag) {
            warn!("failed to render diagnostic: {e}");
        }
    }
}

/// Parse `source`, printing every diagnostic.
pub(crate) fn parse_source(
    arena: &mut AstArena,
    source: &str,
    file: &str,
) -> Result<TranslationUnit, String> {
    let (unit, diagnostics) = fern_parser::parse_with_diagnostics(arena, source);
    emit_all(source, file, &diagnostics);

    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    if errors > 0 {
        return Err(format!("{errors} parse error(s) found"));
    }
    Ok(unit)
}

/// Parse and lower `source`.
pub(crate) fn lower_source(source: &str, file: &str) -> Result<Asr, String> {
    let mut arena = AstArena::new();
    let unit = parse_source(&mut arena, source, file)?;
    fern_asr::lower(&arena, &unit).map_err(|err| {
        emit_all(source, file, &[err.to_diagnostic()]);
        "semantic error".to_string()
    })
}
