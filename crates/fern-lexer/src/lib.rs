//! Lexical analysis for Fern.
//! Fern 词法分析模块。
//!
//! Free-form Fortran source is scanned by a logos-generated raw lexer and then
//! "cooked": keywords are recognised case-insensitively, identifiers are
//! lower-cased and `end<keyword>` spellings are split in two.
//! 自由格式的 Fortran 源码先由 logos 生成的原始词法器扫描，再进行加工。

mod lexer;
mod raw;
mod token;

pub use lexer::Lexer;
pub use token::{Token, TokenKind};
