//! The `fern tokens` command.

use fern_common::LineIndex;
use fern_lexer::Lexer;

use super::{emit_all, read_source};

/// Print one token per line with its line and column.
pub fn run(file: &str) -> Result<(), String> {
    let source = read_source(file)?;
    let (tokens, diagnostics) = Lexer::new(&source).tokenize();
    let lines = LineIndex::new(&source);

    for token in &tokens {
        let pos = lines.line_col(token.span.start);
        println!("{}:{}\t{:?}", pos.line, pos.col, token.kind);
    }

    emit_all(&source, file, &diagnostics);
    if diagnostics.iter().any(|d| d.is_error()) {
        return Err(format!("{} lexical error(s) found", diagnostics.len()));
    }
    Ok(())
}
