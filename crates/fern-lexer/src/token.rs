//! Token definitions for Fern.

use fern_common::Span;
use std::fmt;

/// A token with its kind and span.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals and names
    /// Identifier, lower-cased
    Identifier(String),
    /// Integer or real literal, as written
    Numeric(String),
    /// Character literal with the quotes removed and `''` unescaped
    Str(String),

    // Keywords
    Program,
    Subroutine,
    Function,
    End,
    Contains,
    Implicit,
    Integer,
    Real,
    Logical,
    Character,
    Allocatable,
    Intent,
    Dimension,
    Allocate,
    Deallocate,
    If,
    Then,
    Else,
    Do,
    Call,
    Print,
    Return,
    Result,

    // Operators
    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Pow,     // **
    Eq,      // =
    EqEq,    // == or .eq.
    NotEq,   // /= or .ne.
    Lt,      // < or .lt.
    LtEq,    // <= or .le.
    Gt,      // > or .gt.
    GtEq,    // >= or .ge.
    And,     // .and.
    Or,      // .or.
    Not,     // .not.
    True,    // .true.
    False,   // .false.

    // Punctuation
    LParen,     // (
    RParen,     // )
    Comma,      // ,
    Colon,      // :
    ColonColon, // ::

    // Special
    /// End of a statement: a line end or `;`
    Newline,
    Eof,
    Error,
}

impl TokenKind {
    /// Returns true if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        Self::keyword_text(self).is_some()
    }

    /// Returns the keyword for a lower-cased word, if any.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "program" => Some(TokenKind::Program),
            "subroutine" => Some(TokenKind::Subroutine),
            "function" => Some(TokenKind::Function),
            "end" => Some(TokenKind::End),
            "contains" => Some(TokenKind::Contains),
            "implicit" => Some(TokenKind::Implicit),
            "integer" => Some(TokenKind::Integer),
            "real" => Some(TokenKind::Real),
            "logical" => Some(TokenKind::Logical),
            "character" => Some(TokenKind::Character),
            "allocatable" => Some(TokenKind::Allocatable),
            "intent" => Some(TokenKind::Intent),
            "dimension" => Some(TokenKind::Dimension),
            "allocate" => Some(TokenKind::Allocate),
            "deallocate" => Some(TokenKind::Deallocate),
            "if" => Some(TokenKind::If),
            "then" => Some(TokenKind::Then),
            "else" => Some(TokenKind::Else),
            "do" => Some(TokenKind::Do),
            "call" => Some(TokenKind::Call),
            "print" => Some(TokenKind::Print),
            "return" => Some(TokenKind::Return),
            "result" => Some(TokenKind::Result),
            _ => None,
        }
    }

    /// Returns the operator for a lower-cased dotted spelling such as `.and.`.
    pub fn dot_operator_from_str(s: &str) -> Option<TokenKind> {
        match s {
            ".and." => Some(TokenKind::And),
            ".or." => Some(TokenKind::Or),
            ".not." => Some(TokenKind::Not),
            ".true." => Some(TokenKind::True),
            ".false." => Some(TokenKind::False),
            ".eq." => Some(TokenKind::EqEq),
            ".ne." => Some(TokenKind::NotEq),
            ".lt." => Some(TokenKind::Lt),
            ".le." => Some(TokenKind::LtEq),
            ".gt." => Some(TokenKind::Gt),
            ".ge." => Some(TokenKind::GtEq),
            _ => None,
        }
    }

    /// Keywords that may be glued to a preceding `end`, as in `enddo`.
    pub fn ends_block(&self) -> bool {
        matches!(
            self,
            TokenKind::Program
                | TokenKind::Subroutine
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::Do
        )
    }

    /// Source spelling of a keyword token.
    pub fn keyword_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Program => "program",
            TokenKind::Subroutine => "subroutine",
            TokenKind::Function => "function",
            TokenKind::End => "end",
            TokenKind::Contains => "contains",
            TokenKind::Implicit => "implicit",
            TokenKind::Integer => "integer",
            TokenKind::Real => "real",
            TokenKind::Logical => "logical",
            TokenKind::Character => "character",
            TokenKind::Allocatable => "allocatable",
            TokenKind::Intent => "intent",
            TokenKind::Dimension => "dimension",
            TokenKind::Allocate => "allocate",
            TokenKind::Deallocate => "deallocate",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Else => "else",
            TokenKind::Do => "do",
            TokenKind::Call => "call",
            TokenKind::Print => "print",
            TokenKind::Return => "return",
            TokenKind::Result => "result",
            _ => return None,
        };
        Some(text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Identifier(name) => return write!(f, "identifier `{name}`"),
            TokenKind::Numeric(text) => return write!(f, "number `{text}`"),
            TokenKind::Str(text) => return write!(f, "string '{text}'"),
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Pow => "**",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "/=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::And => ".and.",
            TokenKind::Or => ".or.",
            TokenKind::Not => ".not.",
            TokenKind::True => ".true.",
            TokenKind::False => ".false.",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::ColonColon => "::",
            TokenKind::Newline => return f.write_str("end of line"),
            TokenKind::Eof => return f.write_str("end of input"),
            TokenKind::Error => return f.write_str("invalid token"),
            keyword => keyword.keyword_text().unwrap_or("?"),
        };
        write!(f, "`{text}`")
    }
}
