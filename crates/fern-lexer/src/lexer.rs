//! The Fern lexer.
//! Fern 词法分析器。

use crate::raw::RawToken;
use crate::token::{Token, TokenKind};
use fern_common::Span;
use fern_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use logos::Logos;

/// The Fern lexer.
/// Fern 词法分析器。
///
/// Converts source code into a sequence of tokens terminated by `Eof`.
/// 将源代码转换为以 `Eof` 结尾的 token 序列。
pub struct Lexer<'src> {
    source: &'src str,
    /// Collected diagnostics (errors/warnings)
    /// 收集的诊断信息（错误/警告）
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code.
    /// 为给定的源代码创建新的词法分析器。
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            diagnostics: Vec::new(),
        }
    }

    /// Tokenize the entire source and return tokens and diagnostics.
    /// 对整个源代码进行词法分析，返回 token 列表和诊断信息。
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            let range = raw.span();
            let span = Span::from_usize(range.start, range.end);
            let text = raw.slice();

            match result {
                Ok(token) => self.cook(token, text, span, &mut tokens),
                Err(()) if text.starts_with(['\'', '"']) => {
                    // Unterminated string: skip to the end of the line
                    // 未终止的字符串：跳到行尾
                    let rest = raw.remainder();
                    let len = rest.find('\n').unwrap_or(rest.len());
                    raw.bump(len);
                    let span = Span::from_usize(range.start, range.end + len);
                    self.error(
                        span,
                        "unterminated string literal",
                        ErrorCode::UnterminatedString,
                    );
                    tokens.push(Token::new(TokenKind::Error, span));
                }
                Err(()) => {
                    self.error(
                        span,
                        format!("unexpected character: '{text}'"),
                        ErrorCode::UnexpectedCharacter,
                    );
                    tokens.push(Token::new(TokenKind::Error, span));
                }
            }
        }

        let end = self.source.len();
        tokens.push(Token::new(TokenKind::Eof, Span::from_usize(end, end)));
        (tokens, self.diagnostics)
    }

    /// Turn one raw token into zero or more cooked tokens.
    /// 将一个原始 token 加工为若干个 token。
    fn cook(&mut self, raw: RawToken, text: &str, span: Span, out: &mut Vec<Token>) {
        let kind = match raw {
            RawToken::Word => {
                self.word(text, span, out);
                return;
            }
            RawToken::DotWord => match TokenKind::dot_operator_from_str(&text.to_ascii_lowercase())
            {
                Some(kind) => kind,
                None => {
                    self.error(
                        span,
                        format!("unknown operator `{text}`"),
                        ErrorCode::UnexpectedCharacter,
                    );
                    TokenKind::Error
                }
            },
            RawToken::Numeric => TokenKind::Numeric(text.to_owned()),
            RawToken::Str => TokenKind::Str(unquote(text)),
            RawToken::Newline => TokenKind::Newline,
            RawToken::Pow => TokenKind::Pow,
            RawToken::Star => TokenKind::Star,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Slash => TokenKind::Slash,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Eq => TokenKind::Eq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::Comma => TokenKind::Comma,
            RawToken::ColonColon => TokenKind::ColonColon,
            RawToken::Colon => TokenKind::Colon,
        };
        out.push(Token::new(kind, span));
    }

    /// Cook an identifier or keyword.
    /// 加工标识符或关键字。
    ///
    /// `enddo`, `endif`, `endprogram`, ... become two tokens so the parser
    /// only ever sees `end` followed by the block keyword.
    fn word(&mut self, text: &str, span: Span, out: &mut Vec<Token>) {
        let lower = text.to_ascii_lowercase();

        if let Some(kind) = TokenKind::keyword_from_str(&lower) {
            out.push(Token::new(kind, span));
            return;
        }

        if let Some(rest) = lower.strip_prefix("end") {
            if let Some(kind) = TokenKind::keyword_from_str(rest).filter(TokenKind::ends_block) {
                let split = span.start.offset(3);
                out.push(Token::new(TokenKind::End, Span::new(span.start, split)));
                out.push(Token::new(kind, Span::new(split, span.end)));
                return;
            }
        }

        out.push(Token::new(TokenKind::Identifier(lower), span));
    }

    fn error(&mut self, span: Span, message: impl Into<String>, code: ErrorCode) {
        let message = message.into();
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Lexer, span, message)
                .with_code(code)
                .with_label(Label::new(span, code.description())),
        );
    }
}

/// Strip the delimiters of a character literal and collapse doubled quotes.
/// 去掉字符字面量的引号并还原重复的引号。
fn unquote(text: &str) -> String {
    let quote = &text[..1];
    let inner = &text[1..text.len() - 1];
    inner.replace(&format!("{quote}{quote}"), quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let (tokens, diagnostics) = Lexer::new(source).tokenize();
        assert!(diagnostics.is_empty(), "lex errors: {:?}", diagnostics);
        tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_end_keywords_are_split() {
        assert_eq!(
            kinds("enddo endif"),
            vec![
                TokenKind::End,
                TokenKind::Do,
                TokenKind::End,
                TokenKind::If,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_split_spans() {
        let (tokens, _) = Lexer::new("endif").tokenize();
        assert_eq!(tokens[0].span, Span::from_usize(0, 3));
        assert_eq!(tokens[1].span, Span::from_usize(3, 5));
    }

    #[test]
    fn test_ending_is_an_identifier() {
        assert_eq!(
            kinds("ending"),
            vec![TokenKind::Identifier("ending".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'it''s'"), "it's");
        assert_eq!(unquote("\"say \"\"hi\"\"\""), "say \"hi\"");
    }

    #[test]
    fn test_unterminated_string() {
        let (tokens, diagnostics) = Lexer::new("x = 'abc\ny").tokenize();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(ErrorCode::UnterminatedString));
        let kinds: Vec<_> = tokens.into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("x".to_string()),
                TokenKind::Eq,
                TokenKind::Error,
                TokenKind::Newline,
                TokenKind::Identifier("y".to_string()),
                TokenKind::Eof,
            ]
        );
    }
}
