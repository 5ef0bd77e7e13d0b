//! Integration tests for fern-lexer crate.

use fern_lexer::{Lexer, TokenKind};
use pretty_assertions::assert_eq;

fn lex(source: &str) -> Vec<TokenKind> {
    let (tokens, _) = Lexer::new(source).tokenize();
    tokens.into_iter().map(|t| t.kind).collect()
}

fn lex_with_errors(source: &str) -> (Vec<TokenKind>, usize) {
    let (tokens, errors) = Lexer::new(source).tokenize();
    (tokens.into_iter().map(|t| t.kind).collect(), errors.len())
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_owned())
}

fn num(text: &str) -> TokenKind {
    TokenKind::Numeric(text.to_owned())
}

// ============================================================================
// Token streams
// ============================================================================

#[test]
fn test_statements_between_keywords() {
    let source = "subroutine\n    x = y\n    x = 2*y\n    subroutine";
    assert_eq!(
        lex(source),
        vec![
            TokenKind::Subroutine,
            TokenKind::Newline,
            ident("x"),
            TokenKind::Eq,
            ident("y"),
            TokenKind::Newline,
            ident("x"),
            TokenKind::Eq,
            num("2"),
            TokenKind::Star,
            ident("y"),
            TokenKind::Newline,
            TokenKind::Subroutine,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_power_is_one_token() {
    assert_eq!(
        lex("2*x**3"),
        vec![
            num("2"),
            TokenKind::Star,
            ident("x"),
            TokenKind::Pow,
            num("3"),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_parenthesized_power() {
    assert_eq!(
        lex("(2*x**3)"),
        vec![
            TokenKind::LParen,
            num("2"),
            TokenKind::Star,
            ident("x"),
            TokenKind::Pow,
            num("3"),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Keywords and names
// ============================================================================

#[test]
fn test_keywords_are_case_insensitive() {
    assert_eq!(
        lex("PROGRAM Main\nEnd Program"),
        vec![
            TokenKind::Program,
            ident("main"),
            TokenKind::Newline,
            TokenKind::End,
            TokenKind::Program,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_glued_end_keywords() {
    assert_eq!(
        lex("enddo\nendif\nendsubroutine"),
        vec![
            TokenKind::End,
            TokenKind::Do,
            TokenKind::Newline,
            TokenKind::End,
            TokenKind::If,
            TokenKind::Newline,
            TokenKind::End,
            TokenKind::Subroutine,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_dot_operators() {
    assert_eq!(
        lex("a .AND. .not. b .eq. .true."),
        vec![
            ident("a"),
            TokenKind::And,
            TokenKind::Not,
            ident("b"),
            TokenKind::EqEq,
            TokenKind::True,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_numeric_literals() {
    assert_eq!(
        lex("1 2.5 1e3 3.0d0 .5"),
        vec![num("1"), num("2.5"), num("1e3"), num("3.0d0"), num(".5"), TokenKind::Eof]
    );
}

#[test]
fn test_strings() {
    assert_eq!(
        lex("'it''s' \"say \"\"hi\"\"\""),
        vec![
            TokenKind::Str("it's".into()),
            TokenKind::Str("say \"hi\"".into()),
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Trivia
// ============================================================================

#[test]
fn test_comments_and_continuations() {
    assert_eq!(
        lex("x = 1 + & ! continued\n  2 ! trailing\n"),
        vec![
            ident("x"),
            TokenKind::Eq,
            num("1"),
            TokenKind::Plus,
            num("2"),
            TokenKind::Newline,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_semicolon_ends_statement() {
    assert_eq!(
        lex("x = 1; y = 2"),
        vec![
            ident("x"),
            TokenKind::Eq,
            num("1"),
            TokenKind::Newline,
            ident("y"),
            TokenKind::Eq,
            num("2"),
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unexpected_character() {
    let (tokens, errors) = lex_with_errors("x = 1 @ 2");
    assert_eq!(errors, 1);
    assert!(tokens.contains(&TokenKind::Error));
    assert_eq!(tokens.last(), Some(&TokenKind::Eof));
}

#[test]
fn test_unknown_dot_operator() {
    let (tokens, errors) = lex_with_errors("a .xor. b");
    assert_eq!(errors, 1);
    assert_eq!(tokens, vec![ident("a"), TokenKind::Error, ident("b"), TokenKind::Eof]);
}

#[test]
fn test_unterminated_string_stops_at_line_end() {
    let (tokens, errors) = lex_with_errors("print *, 'oops\nx = 1");
    assert_eq!(errors, 1);
    assert!(tokens.ends_with(&[
        TokenKind::Error,
        TokenKind::Newline,
        ident("x"),
        TokenKind::Eq,
        num("1"),
        TokenKind::Eof,
    ]));
}
