//! Raw tokens produced by logos, before keyword recognition.

use logos::Logos;

/// Raw token from logos.
///
/// Horizontal whitespace, `!` comments and `&` line continuations are
/// skipped here, so a continued statement never produces a `Newline`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\f]+|![^\n]*|&[ \t\r]*(![^\n]*)?\n")]
pub(crate) enum RawToken {
    #[token("\n")]
    #[token(";")]
    Newline,

    /// Identifier or keyword; told apart while cooking.
    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Word,

    /// `.and.`, `.true.`, `.eq.` and friends.
    #[regex(r"\.[A-Za-z]+\.")]
    DotWord,

    #[regex(r"[0-9]+(\.[0-9]+)?([eEdD][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eEdD][+-]?[0-9]+)?")]
    Numeric,

    #[regex(r"'([^'\n]|'')*'")]
    #[regex(r#""([^"\n]|"")*""#)]
    Str,

    #[token("**")]
    Pow,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("/")]
    Slash,
    #[token("==")]
    EqEq,
    #[token("/=")]
    NotEq,
    #[token("=")]
    Eq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
}
