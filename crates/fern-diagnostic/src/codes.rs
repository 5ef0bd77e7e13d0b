//! Error codes for Fern diagnostics.

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexer errors (E0001 - E0099)
    UnexpectedCharacter,
    UnterminatedString,
    InvalidNumber,

    // Parser errors (E0100 - E0199)
    UnexpectedToken,
    ExpectedExpression,
    ExpectedStatement,
    ExpectedNewline,
    UnclosedDelimiter,
    MismatchedEnd,
    UnterminatedBlock,

    // Semantic errors (E0200 - E0299)
    UndeclaredName,
    DuplicateDeclaration,
    NotAProcedure,
    NotAnArray,
    StatementOutsideUnit,
    AllocateNotAllocatable,
    DeallocateNotAllocatable,
    DeferredShapeRequired,
    RepeatedName,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer
            ErrorCode::UnexpectedCharacter => "E0001",
            ErrorCode::UnterminatedString => "E0002",
            ErrorCode::InvalidNumber => "E0003",

            // Parser
            ErrorCode::UnexpectedToken => "E0100",
            ErrorCode::ExpectedExpression => "E0101",
            ErrorCode::ExpectedStatement => "E0102",
            ErrorCode::ExpectedNewline => "E0103",
            ErrorCode::UnclosedDelimiter => "E0104",
            ErrorCode::MismatchedEnd => "E0105",
            ErrorCode::UnterminatedBlock => "E0106",

            // Semantic
            ErrorCode::UndeclaredName => "E0200",
            ErrorCode::DuplicateDeclaration => "E0201",
            ErrorCode::NotAProcedure => "E0202",
            ErrorCode::NotAnArray => "E0203",
            ErrorCode::StatementOutsideUnit => "E0204",
            ErrorCode::AllocateNotAllocatable => "E0205",
            ErrorCode::DeallocateNotAllocatable => "E0206",
            ErrorCode::DeferredShapeRequired => "E0207",
            ErrorCode::RepeatedName => "E0208",
        }
    }

    /// Get a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            // Lexer
            ErrorCode::UnexpectedCharacter => "unexpected character in input",
            ErrorCode::UnterminatedString => "string literal is not terminated",
            ErrorCode::InvalidNumber => "invalid numeric literal",

            // Parser
            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::ExpectedExpression => "expected an expression",
            ErrorCode::ExpectedStatement => "expected a statement",
            ErrorCode::ExpectedNewline => "expected end of statement",
            ErrorCode::UnclosedDelimiter => "unclosed delimiter",
            ErrorCode::MismatchedEnd => "`end` does not match the enclosing block",
            ErrorCode::UnterminatedBlock => "block is not terminated",

            // Semantic
            ErrorCode::UndeclaredName => "name is not declared in this scope",
            ErrorCode::DuplicateDeclaration => "name is declared twice in the same scope",
            ErrorCode::NotAProcedure => "name does not refer to a procedure",
            ErrorCode::NotAnArray => "name is not an array and cannot be indexed",
            ErrorCode::StatementOutsideUnit => "statement appears outside of a program unit",
            ErrorCode::AllocateNotAllocatable => "only allocatable variables can be allocated",
            ErrorCode::DeallocateNotAllocatable => {
                "only allocatable variables can be deallocated"
            }
            ErrorCode::DeferredShapeRequired => "allocatable arrays must have deferred shape",
            ErrorCode::RepeatedName => "name appears more than once in one statement",
        }
    }

    /// Get a suggested fix for the error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnterminatedString => Some("add the closing quote on the same line"),
            ErrorCode::ExpectedNewline => {
                Some("put each statement on its own line or separate them with `;`")
            }
            ErrorCode::UnclosedDelimiter => Some("add the matching closing delimiter"),
            ErrorCode::UndeclaredName => {
                Some("declare the variable in the specification part of the unit")
            }
            ErrorCode::AllocateNotAllocatable => {
                Some("add the `allocatable` attribute to the declaration")
            }
            ErrorCode::DeferredShapeRequired => Some("declare the bounds as `(:)`"),
            ErrorCode::RepeatedName => Some("remove the repeated name"),
            _ => None,
        }
    }
}
