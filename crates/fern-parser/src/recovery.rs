//! Error recovery helpers for the parser.
//!
//! Statements end at a `Newline`, so recovery skips to the next line unless a
//! token that opens or closes a block is reached first.

use fern_lexer::TokenKind;

/// Tokens that start an executable statement.
pub const STMT_STARTS: &[TokenKind] = &[
    TokenKind::Allocate,
    TokenKind::Deallocate,
    TokenKind::If,
    TokenKind::Do,
    TokenKind::Call,
    TokenKind::Print,
    TokenKind::Return,
];

/// Tokens that start a program unit.
pub const UNIT_STARTS: &[TokenKind] = &[
    TokenKind::Program,
    TokenKind::Subroutine,
    TokenKind::Function,
];

/// Tokens that start a type declaration.
pub const TYPE_STARTS: &[TokenKind] = &[
    TokenKind::Integer,
    TokenKind::Real,
    TokenKind::Logical,
    TokenKind::Character,
];

/// Tokens recovery never skips over.
pub const SYNC_TOKENS: &[TokenKind] = &[
    TokenKind::End,
    TokenKind::Else,
    TokenKind::Contains,
    TokenKind::Program,
    TokenKind::Subroutine,
    TokenKind::Function,
    TokenKind::Eof,
];

/// Check if a token kind is in a set.
pub fn is_in_set(kind: &TokenKind, set: &[TokenKind]) -> bool {
    set.iter()
        .any(|k| std::mem::discriminant(k) == std::mem::discriminant(kind))
}

pub fn is_stmt_start(kind: &TokenKind) -> bool {
    is_in_set(kind, STMT_STARTS)
}

pub fn is_unit_start(kind: &TokenKind) -> bool {
    is_in_set(kind, UNIT_STARTS)
}

pub fn is_type_start(kind: &TokenKind) -> bool {
    is_in_set(kind, TYPE_STARTS)
}

pub fn is_sync_token(kind: &TokenKind) -> bool {
    is_in_set(kind, SYNC_TOKENS)
}
