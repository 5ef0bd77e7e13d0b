//! The Fern parser.

use fern_common::{Name, Span};
use fern_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use fern_lexer::{Token, TokenKind};
use fern_syntax::*;

use crate::recovery::{is_stmt_start, is_sync_token, is_type_start, is_unit_start};

/// The Fern parser.
///
/// Nodes are allocated into the borrowed [`AstArena`] as they are parsed.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    arena: &'a mut AstArena,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, arena: &'a mut AstArena) -> Self {
        Self {
            tokens,
            pos: 0,
            arena,
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Parse a whole translation unit.
    pub fn parse_unit(&mut self) -> TranslationUnit {
        let start = self.current_span();
        let mut items = Vec::new();

        loop {
            self.skip_newlines();
            if self.at_end() {
                break;
            }
            match self.parse_item() {
                Some(item) => items.push(item),
                None => self.synchronize(),
            }
        }

        let end = self.current_span();
        TranslationUnit {
            items,
            span: start.merge(end),
        }
    }

    fn parse_item(&mut self) -> Option<Item> {
        let kind = self.current_kind().clone();
        if is_unit_start(&kind) {
            return self.parse_program_unit().map(Item::Unit);
        }
        if is_stmt_start(&kind) {
            return self.parse_stmt().map(Item::Stmt);
        }
        if is_type_start(&kind) {
            self.error_code(
                "declaration outside of a program unit",
                ErrorCode::ExpectedStatement,
            );
            return None;
        }
        if !self.starts_expr() {
            self.error_code(
                &format!("expected a program unit, statement or expression, found {kind}"),
                ErrorCode::ExpectedStatement,
            );
            return None;
        }

        // A bare expression, or the left-hand side of an assignment
        let start = self.current_span();
        let expr = self.parse_expr();
        if self.eat(TokenKind::Eq) {
            let value = self.parse_expr();
            let stmt = self.finish_stmt(
                StmtKind::Assignment {
                    target: expr,
                    value,
                },
                start,
            );
            return Some(Item::Stmt(stmt));
        }
        self.expect_end_of_stmt();
        Some(Item::Expr(expr))
    }

    // ========== Program Units ==========

    fn parse_program_unit(&mut self) -> Option<ProgramUnit> {
        let start = self.current_span();
        let keyword = self.current_kind().clone();
        self.advance();

        let name = self.parse_ident()?;
        let args = if self.check(TokenKind::LParen) {
            self.parse_dummy_args()
        } else {
            Vec::new()
        };

        let kind = match keyword {
            TokenKind::Program => UnitKind::Program,
            TokenKind::Subroutine => UnitKind::Subroutine,
            _ => {
                let result = if self.eat(TokenKind::Result) {
                    let open = self.current_span();
                    self.expect(TokenKind::LParen);
                    let result = self.parse_ident();
                    self.expect_closing(open);
                    result
                } else {
                    None
                };
                UnitKind::Function { result }
            }
        };
        self.expect_end_of_stmt();

        let implicit_none = self.parse_implicit();
        let decls = self.parse_decls();
        let body = self.parse_block();

        let mut contains = Vec::new();
        if self.eat(TokenKind::Contains) {
            self.expect_end_of_stmt();
            loop {
                self.skip_newlines();
                if !is_unit_start(self.current_kind()) {
                    break;
                }
                match self.parse_program_unit() {
                    Some(unit) => contains.push(unit),
                    None => self.synchronize(),
                }
            }
        }

        self.parse_unit_end(&keyword, name.name, start);

        let end = self.previous_span();
        Some(ProgramUnit {
            kind,
            name,
            args,
            implicit_none,
            decls,
            body,
            contains,
            span: start.merge(end),
        })
    }

    fn parse_dummy_args(&mut self) -> Vec<Ident> {
        let open = self.current_span();
        self.advance();
        let args = self.parse_comma_list(TokenKind::RParen, |p| p.parse_ident());
        self.expect_closing(open);
        args
    }

    /// `end [keyword [name]]`
    fn parse_unit_end(&mut self, keyword: &TokenKind, name: Name, start: Span) {
        let text = keyword_text(keyword);
        if !self.eat(TokenKind::End) {
            self.error_at(
                start,
                &format!("`{text}` is not terminated"),
                ErrorCode::UnterminatedBlock,
            );
            return;
        }

        let expected = format!("end {text} {}", self.arena.name(name));
        if self.check(keyword.clone()) {
            self.advance();
        } else if is_unit_start(self.current_kind()) {
            let found = keyword_text(self.current_kind());
            self.mismatched_end(&format!("expected `end {text}`, found `end {found}`"), &expected);
            self.advance();
        }

        if let TokenKind::Identifier(found) = self.current_kind() {
            if self.arena.names.lookup(found) != Some(name) {
                let message = format!(
                    "`end` names `{found}` but the unit is `{}`",
                    self.arena.name(name)
                );
                self.mismatched_end(&message, &expected);
            }
            self.advance();
        }

        self.expect_end_of_stmt();
    }

    fn parse_implicit(&mut self) -> bool {
        self.skip_newlines();
        if !self.eat(TokenKind::Implicit) {
            return false;
        }
        match self.current_kind() {
            TokenKind::Identifier(word) if word == "none" => self.advance(),
            _ => self.error("expected `none` after `implicit`"),
        }
        self.expect_end_of_stmt();
        true
    }

    // ========== Declarations ==========

    fn parse_decls(&mut self) -> Vec<Decl> {
        let mut decls = Vec::new();
        loop {
            self.skip_newlines();
            if !is_type_start(self.current_kind()) {
                break;
            }
            match self.parse_decl() {
                Some(decl) => decls.push(decl),
                None => self.synchronize(),
            }
        }
        decls
    }

    fn parse_decl(&mut self) -> Option<Decl> {
        let start = self.current_span();
        let type_spec = self.parse_type_spec();

        let mut attrs = Vec::new();
        while self.eat(TokenKind::Comma) {
            attrs.push(self.parse_attr()?);
        }
        self.eat(TokenKind::ColonColon);

        let entities = self.parse_comma_list(TokenKind::Newline, |p| p.parse_entity());
        if entities.is_empty() {
            self.error("expected a name in declaration");
            return None;
        }
        let span = start.merge(self.previous_span());
        self.expect_end_of_stmt();

        Some(Decl {
            type_spec,
            attrs,
            entities,
            span,
        })
    }

    fn parse_type_spec(&mut self) -> TypeSpec {
        let base = match self.current_kind() {
            TokenKind::Integer => BaseType::Integer,
            TokenKind::Real => BaseType::Real,
            TokenKind::Logical => BaseType::Logical,
            _ => BaseType::Character,
        };
        self.advance();

        let mut kind = None;
        if self.check(TokenKind::LParen) {
            let open = self.current_span();
            self.advance();
            // `kind=` / `len=`
            if matches!(self.current_kind(), TokenKind::Identifier(_))
                && matches!(self.peek_kind(), TokenKind::Eq)
            {
                self.advance();
                self.advance();
            }
            match self.current_kind().clone() {
                TokenKind::Numeric(text) => {
                    if base != BaseType::Character {
                        match text.parse::<u8>() {
                            Ok(value) => kind = Some(value),
                            Err(_) => self.error_code(
                                &format!("invalid kind parameter `{text}`"),
                                ErrorCode::InvalidNumber,
                            ),
                        }
                    }
                    self.advance();
                }
                TokenKind::Star if base == BaseType::Character => self.advance(),
                _ => self.error("expected a kind parameter"),
            }
            self.expect_closing(open);
        }

        TypeSpec { base, kind }
    }

    fn parse_attr(&mut self) -> Option<Attr> {
        match self.current_kind() {
            TokenKind::Allocatable => {
                self.advance();
                Some(Attr::Allocatable)
            }
            TokenKind::Intent => {
                self.advance();
                let open = self.current_span();
                self.expect(TokenKind::LParen);
                let intent = self.parse_intent_spec();
                self.expect_closing(open);
                intent.map(Attr::Intent)
            }
            TokenKind::Dimension => {
                self.advance();
                self.parse_dims().map(Attr::Dimension)
            }
            _ => {
                self.error("expected an attribute");
                None
            }
        }
    }

    fn parse_intent_spec(&mut self) -> Option<IntentSpec> {
        let TokenKind::Identifier(word) = self.current_kind().clone() else {
            self.error("expected `in`, `out` or `inout`");
            return None;
        };
        self.advance();
        match word.as_str() {
            "in" => {
                // `in out`
                if matches!(self.current_kind(), TokenKind::Identifier(w) if w == "out") {
                    self.advance();
                    return Some(IntentSpec::InOut);
                }
                Some(IntentSpec::In)
            }
            "out" => Some(IntentSpec::Out),
            "inout" => Some(IntentSpec::InOut),
            _ => {
                self.error(&format!("unknown intent `{word}`"));
                None
            }
        }
    }

    /// `(` dim {`,` dim} `)`
    fn parse_dims(&mut self) -> Option<Vec<DimSpec>> {
        let open = self.current_span();
        if !self.eat(TokenKind::LParen) {
            self.error("expected `(`");
            return None;
        }
        let dims = self.parse_comma_list(TokenKind::RParen, |p| {
            if p.eat(TokenKind::Colon) {
                Some(DimSpec::Deferred)
            } else {
                Some(DimSpec::Extent(p.parse_expr()))
            }
        });
        self.expect_closing(open);
        Some(dims)
    }

    fn parse_entity(&mut self) -> Option<Entity> {
        let name = self.parse_ident()?;
        let dims = if self.check(TokenKind::LParen) {
            self.parse_dims()
        } else {
            None
        };
        let init = if self.eat(TokenKind::Eq) {
            Some(self.parse_expr())
        } else {
            None
        };
        Some(Entity { name, dims, init })
    }

    // ========== Statements ==========

    /// Parse statements up to `end`, `else`, `contains` or end of input.
    fn parse_block(&mut self) -> Vec<StmtId> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if is_sync_token(self.current_kind()) {
                break;
            }
            match self.parse_stmt() {
                Some(stmt) => body.push(stmt),
                None => self.synchronize(),
            }
        }
        body
    }

    fn parse_stmt(&mut self) -> Option<StmtId> {
        let start = self.current_span();

        let kind = match self.current_kind() {
            TokenKind::Allocate => {
                self.advance();
                let open = self.current_span();
                self.expect(TokenKind::LParen);
                let items = self.parse_comma_list(TokenKind::RParen, |p| Some(p.parse_expr()));
                self.expect_closing(open);
                StmtKind::Allocate(items)
            }
            TokenKind::Deallocate => {
                self.advance();
                let open = self.current_span();
                self.expect(TokenKind::LParen);
                let names = self.parse_comma_list(TokenKind::RParen, |p| p.parse_ident());
                self.expect_closing(open);
                StmtKind::Deallocate(names)
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::Do => return self.parse_do(),
            TokenKind::Call => {
                self.advance();
                let name = self.parse_ident()?;
                let args = if self.check(TokenKind::LParen) {
                    self.parse_args()
                } else {
                    Vec::new()
                };
                StmtKind::Call { name, args }
            }
            TokenKind::Print => {
                self.advance();
                self.expect(TokenKind::Star);
                let mut items = Vec::new();
                while self.eat(TokenKind::Comma) {
                    items.push(self.parse_expr());
                }
                StmtKind::Print(items)
            }
            TokenKind::Return => {
                self.advance();
                StmtKind::Return
            }
            kind if is_type_start(kind) => {
                self.error_code(
                    "declarations must come before executable statements",
                    ErrorCode::ExpectedStatement,
                );
                return None;
            }
            _ if self.starts_expr() => {
                let target = self.parse_expr();
                if !self.eat(TokenKind::Eq) {
                    self.error_code("expected `=` in assignment", ErrorCode::ExpectedStatement);
                    return None;
                }
                let value = self.parse_expr();
                StmtKind::Assignment { target, value }
            }
            kind => {
                let message = format!("expected a statement, found {kind}");
                self.error_code(&message, ErrorCode::ExpectedStatement);
                return None;
            }
        };

        Some(self.finish_stmt(kind, start))
    }

    fn finish_stmt(&mut self, kind: StmtKind, start: Span) -> StmtId {
        let span = start.merge(self.previous_span());
        self.expect_end_of_stmt();
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    /// Block `if`, or the one-line `if (cond) stmt`.
    fn parse_if(&mut self) -> Option<StmtId> {
        let start = self.current_span();
        self.advance();
        let open = self.current_span();
        self.expect(TokenKind::LParen);
        let cond = self.parse_expr();
        self.expect_closing(open);

        if !self.eat(TokenKind::Then) {
            let then_stmt = self.parse_stmt()?;
            let span = start.merge(self.arena.stmt(then_stmt).span);
            let kind = StmtKind::If {
                cond,
                then_body: vec![then_stmt],
                else_body: Vec::new(),
            };
            return Some(self.arena.alloc_stmt(Stmt::new(kind, span)));
        }
        self.expect_end_of_stmt();

        let then_body = self.parse_block();
        let else_body = if self.eat(TokenKind::Else) {
            self.expect_end_of_stmt();
            self.parse_block()
        } else {
            Vec::new()
        };
        let terminated = self.parse_block_end(TokenKind::If, start);

        let kind = StmtKind::If {
            cond,
            then_body,
            else_body,
        };
        Some(self.finish_block(kind, start, terminated))
    }

    fn parse_do(&mut self) -> Option<StmtId> {
        let start = self.current_span();
        self.advance();
        let var = self.parse_ident()?;
        self.expect(TokenKind::Eq);
        let first = self.parse_expr();
        self.expect(TokenKind::Comma);
        let last = self.parse_expr();
        let step = if self.eat(TokenKind::Comma) {
            Some(self.parse_expr())
        } else {
            None
        };
        self.expect_end_of_stmt();

        let body = self.parse_block();
        let terminated = self.parse_block_end(TokenKind::Do, start);

        let kind = StmtKind::Do {
            var,
            start: first,
            end: last,
            step,
            body,
        };
        Some(self.finish_block(kind, start, terminated))
    }

    /// `end if` / `end do`. A bare `end` belongs to the enclosing unit and
    /// is left in place.
    fn parse_block_end(&mut self, keyword: TokenKind, start: Span) -> bool {
        if self.check(TokenKind::End) && self.peek_kind() == &keyword {
            self.advance();
            self.advance();
            return true;
        }
        let message = format!("`{}` block is not terminated", keyword_text(&keyword));
        self.error_at(start, &message, ErrorCode::UnterminatedBlock);
        false
    }

    fn finish_block(&mut self, kind: StmtKind, start: Span, terminated: bool) -> StmtId {
        let span = start.merge(self.previous_span());
        if terminated {
            self.expect_end_of_stmt();
        }
        self.arena.alloc_stmt(Stmt::new(kind, span))
    }

    // ========== Expressions ==========

    fn parse_ident(&mut self) -> Option<Ident> {
        let span = self.current_span();
        if let TokenKind::Identifier(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Some(self.arena.ident(&name, span))
        } else {
            let found = self.current_kind().clone();
            self.error(&format!("expected identifier, found {found}"));
            None
        }
    }

    pub fn parse_expr(&mut self) -> ExprId {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> ExprId {
        let mut left = self.parse_and_expr();

        while self.eat(TokenKind::Or) {
            let right = self.parse_and_expr();
            left = self.binary(
                |left, right| ExprKind::BoolOp {
                    op: BoolOp::Or,
                    left,
                    right,
                },
                left,
                right,
            );
        }

        left
    }

    fn parse_and_expr(&mut self) -> ExprId {
        let mut left = self.parse_not_expr();

        while self.eat(TokenKind::And) {
            let right = self.parse_not_expr();
            left = self.binary(
                |left, right| ExprKind::BoolOp {
                    op: BoolOp::And,
                    left,
                    right,
                },
                left,
                right,
            );
        }

        left
    }

    fn parse_not_expr(&mut self) -> ExprId {
        let start = self.current_span();

        if self.eat(TokenKind::Not) {
            let operand = self.parse_not_expr();
            let span = start.merge(self.arena.expr(operand).span);
            return self.alloc(ExprKind::Not(operand), span);
        }

        self.parse_comparison_expr()
    }

    fn parse_comparison_expr(&mut self) -> ExprId {
        let mut left = self.parse_additive_expr();

        loop {
            let op = match self.current_kind() {
                TokenKind::EqEq => CmpOp::Eq,
                TokenKind::NotEq => CmpOp::NotEq,
                TokenKind::Lt => CmpOp::Lt,
                TokenKind::LtEq => CmpOp::LtEq,
                TokenKind::Gt => CmpOp::Gt,
                TokenKind::GtEq => CmpOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive_expr();
            left = self.binary(|left, right| ExprKind::Compare { op, left, right }, left, right);
        }

        left
    }

    /// A leading sign applies to the whole first term, so `-a*b` is `-(a*b)`.
    fn parse_additive_expr(&mut self) -> ExprId {
        let start = self.current_span();
        let sign = match self.current_kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            _ => None,
        };

        let mut left = match sign {
            Some(op) => {
                self.advance();
                let operand = self.parse_multiplicative_expr();
                let span = start.merge(self.arena.expr(operand).span);
                self.alloc(ExprKind::UnaryOp { op, operand }, span)
            }
            None => self.parse_multiplicative_expr(),
        };

        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative_expr();
            left = self.binary(|left, right| ExprKind::BinOp { op, left, right }, left, right);
        }

        left
    }

    fn parse_multiplicative_expr(&mut self) -> ExprId {
        let mut left = self.parse_power_expr();

        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_power_expr();
            left = self.binary(|left, right| ExprKind::BinOp { op, left, right }, left, right);
        }

        left
    }

    fn parse_power_expr(&mut self) -> ExprId {
        let left = self.parse_primary_expr();

        if self.eat(TokenKind::Pow) {
            let right = self.parse_power_operand(); // Right associative
            self.binary(
                |left, right| ExprKind::BinOp {
                    op: BinOp::Pow,
                    left,
                    right,
                },
                left,
                right,
            )
        } else {
            left
        }
    }

    /// The exponent may carry its own sign, as in `x**-2`.
    fn parse_power_operand(&mut self) -> ExprId {
        let start = self.current_span();
        let op = match self.current_kind() {
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.parse_power_expr(),
        };
        self.advance();
        let operand = self.parse_power_expr();
        let span = start.merge(self.arena.expr(operand).span);
        self.alloc(ExprKind::UnaryOp { op, operand }, span)
    }

    fn parse_primary_expr(&mut self) -> ExprId {
        let span = self.current_span();

        match self.current_kind().clone() {
            TokenKind::Numeric(text) => {
                self.advance();
                self.parse_number(text, span)
            }
            TokenKind::Str(text) => {
                self.advance();
                self.alloc(ExprKind::Str(text), span)
            }
            TokenKind::True => {
                self.advance();
                self.alloc(ExprKind::Logical(true), span)
            }
            TokenKind::False => {
                self.advance();
                self.alloc(ExprKind::Logical(false), span)
            }
            TokenKind::Identifier(text) => {
                self.advance();
                let name = self.arena.ident(&text, span);
                if self.check(TokenKind::LParen) {
                    let args = self.parse_args();
                    let span = span.merge(self.previous_span());
                    self.alloc(ExprKind::FuncCallOrArray { name, args }, span)
                } else {
                    self.alloc(ExprKind::Name(name), span)
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr();
                self.expect_closing(span);
                inner
            }
            found => {
                self.error_code(
                    &format!("expected expression, found {found}"),
                    ErrorCode::ExpectedExpression,
                );
                self.recover_expr(span)
            }
        }
    }

    fn parse_number(&mut self, text: String, span: Span) -> ExprId {
        let is_real = text.contains(['.', 'e', 'E', 'd', 'D']);
        if is_real {
            return self.alloc(ExprKind::Real(text), span);
        }
        match text.parse::<i64>() {
            Ok(value) => self.alloc(ExprKind::Int(value), span),
            Err(_) => {
                self.error_at(
                    span,
                    &format!("integer literal `{text}` is too large"),
                    ErrorCode::InvalidNumber,
                );
                self.alloc(ExprKind::Int(0), span)
            }
        }
    }

    /// `(` expr {`,` expr} `)`
    fn parse_args(&mut self) -> Vec<ExprId> {
        let open = self.current_span();
        self.advance();
        let args = self.parse_comma_list(TokenKind::RParen, |p| Some(p.parse_expr()));
        self.expect_closing(open);
        args
    }

    fn starts_expr(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Identifier(_)
                | TokenKind::Numeric(_)
                | TokenKind::Str(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::LParen
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Not
        )
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    fn binary(
        &mut self,
        make: impl FnOnce(ExprId, ExprId) -> ExprKind,
        left: ExprId,
        right: ExprId,
    ) -> ExprId {
        let span = self.arena.expr(left).span.merge(self.arena.expr(right).span);
        self.alloc(make(left, right), span)
    }

    // ========== Token Helpers ==========

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or(&self.tokens[self.tokens.len() - 1])
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(&self.tokens[self.tokens.len() - 1].kind, |t| &t.kind)
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(&kind)
    }

    fn advance(&mut self) {
        if !self.at_end() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) {
        if !self.eat(kind.clone()) {
            let found = self.current_kind().clone();
            self.error(&format!("expected {kind}, found {found}"));
        }
    }

    /// Expect `)` for the `(` at `open`.
    fn expect_closing(&mut self, open: Span) {
        if self.eat(TokenKind::RParen) {
            return;
        }
        let span = self.current_span();
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Parser, span, "expected `)`")
                .with_code(ErrorCode::UnclosedDelimiter)
                .with_label(Label::new(open, "unclosed `(`"))
                .with_label(Label::new(span, "expected `)` here")),
        );
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    /// A statement ends at a line end or semicolon, or at end of input.
    fn expect_end_of_stmt(&mut self) {
        if self.eat(TokenKind::Newline) || self.at_end() {
            return;
        }
        let found = self.current_kind().clone();
        self.error_code(
            &format!("expected end of statement, found {found}"),
            ErrorCode::ExpectedNewline,
        );
        self.synchronize();
    }

    fn error(&mut self, message: &str) {
        self.error_code(message, ErrorCode::UnexpectedToken);
    }

    fn error_code(&mut self, message: &str, code: ErrorCode) {
        let span = self.current_span();
        self.error_at(span, message, code);
    }

    fn error_at(&mut self, span: Span, message: &str, code: ErrorCode) {
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Parser, span, message)
                .with_code(code)
                .with_label(Label::new(span, "here")),
        );
    }

    fn mismatched_end(&mut self, message: &str, expected: &str) {
        let span = self.current_span();
        self.diagnostics.push(
            Diagnostic::error(DiagnosticKind::Parser, span, message)
                .with_code(ErrorCode::MismatchedEnd)
                .with_label(Label::new(span, "here"))
                .with_help(format!("close the unit with `{expected}`")),
        );
    }

    // ========== Error Recovery ==========

    /// Skip to the start of the next line, or to a token that opens or
    /// closes a block.
    fn synchronize(&mut self) {
        // Must advance at least once to avoid looping on the current token
        let mut advanced = false;

        while !self.at_end() {
            if self.eat(TokenKind::Newline) {
                return;
            }
            if advanced && is_sync_token(self.current_kind()) {
                return;
            }
            self.advance();
            advanced = true;
        }
    }

    /// Placeholder for an expression that failed to parse.
    fn recover_expr(&mut self, span: Span) -> ExprId {
        if !self.check(TokenKind::Newline) && !is_sync_token(self.current_kind()) {
            self.advance();
        }
        self.alloc(ExprKind::Int(0), span)
    }

    /// Parse a comma-separated list, stopping before `closing`.
    fn parse_comma_list<T, F>(&mut self, closing: TokenKind, mut parse_item: F) -> Vec<T>
    where
        F: FnMut(&mut Self) -> Option<T>,
    {
        let mut items = Vec::new();

        while !self.check(closing.clone()) && !self.at_end() {
            if let Some(item) = parse_item(self) {
                items.push(item);
            } else {
                // Recovery: skip to comma or closing delimiter
                while !self.check(TokenKind::Comma)
                    && !self.check(closing.clone())
                    && !self.check(TokenKind::Newline)
                    && !self.at_end()
                {
                    self.advance();
                }
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }

        items
    }
}

fn keyword_text(kind: &TokenKind) -> &'static str {
    kind.keyword_text().unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fern_lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> (AstArena, TranslationUnit, Vec<Diagnostic>) {
        let mut arena = AstArena::new();
        let (tokens, _) = Lexer::new(source).tokenize();
        let mut parser = Parser::new(tokens, &mut arena);
        let unit = parser.parse_unit();
        let diagnostics = parser.diagnostics();
        (arena, unit, diagnostics)
    }

    fn single_expr(arena: &AstArena, unit: &TranslationUnit) -> ExprId {
        match unit.items.as_slice() {
            [Item::Expr(id)] => *id,
            other => panic!("expected one expression, got {other:?}"),
        }
    }

    #[test]
    fn test_power_is_right_associative() {
        let (arena, unit, diagnostics) = parse("a**b**c");
        assert!(diagnostics.is_empty());
        let root = single_expr(&arena, &unit);
        let ExprKind::BinOp { op, left, right } = &arena.expr(root).kind else {
            panic!("expected binop");
        };
        assert_eq!(*op, BinOp::Pow);
        assert!(matches!(arena.expr(*left).kind, ExprKind::Name(_)));
        assert!(matches!(
            arena.expr(*right).kind,
            ExprKind::BinOp { op: BinOp::Pow, .. }
        ));
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let (arena, unit, _) = parse("1 + 2*3");
        let root = single_expr(&arena, &unit);
        let ExprKind::BinOp { op, right, .. } = &arena.expr(root).kind else {
            panic!("expected binop");
        };
        assert_eq!(*op, BinOp::Add);
        assert!(matches!(
            arena.expr(*right).kind,
            ExprKind::BinOp { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn test_leading_minus_covers_first_term() {
        let (arena, unit, _) = parse("-a*b");
        let root = single_expr(&arena, &unit);
        let ExprKind::UnaryOp { op, operand } = &arena.expr(root).kind else {
            panic!("expected unary");
        };
        assert_eq!(*op, UnaryOp::Minus);
        assert!(matches!(
            arena.expr(*operand).kind,
            ExprKind::BinOp { op: BinOp::Mul, .. }
        ));
    }

    #[test]
    fn test_logical_precedence() {
        let (arena, unit, diagnostics) = parse("a < b .and. .not. c .or. d");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let root = single_expr(&arena, &unit);
        let ExprKind::BoolOp { op, left, .. } = &arena.expr(root).kind else {
            panic!("expected boolop");
        };
        assert_eq!(*op, BoolOp::Or);
        let ExprKind::BoolOp { op, left, right } = &arena.expr(*left).kind else {
            panic!("expected boolop");
        };
        assert_eq!(*op, BoolOp::And);
        assert!(matches!(arena.expr(*left).kind, ExprKind::Compare { .. }));
        assert!(matches!(arena.expr(*right).kind, ExprKind::Not(_)));
    }

    #[test]
    fn test_bare_assignment_is_a_statement() {
        let (arena, unit, diagnostics) = parse("x = 2*y");
        assert!(diagnostics.is_empty());
        let [Item::Stmt(id)] = unit.items.as_slice() else {
            panic!("expected statement");
        };
        assert!(matches!(
            arena.stmt(*id).kind,
            StmtKind::Assignment { .. }
        ));
    }

    #[test]
    fn test_one_line_if() {
        let (arena, unit, diagnostics) = parse("if (x > 0) x = 0");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let [Item::Stmt(id)] = unit.items.as_slice() else {
            panic!("expected statement");
        };
        let StmtKind::If { then_body, .. } = &arena.stmt(*id).kind else {
            panic!("expected if");
        };
        assert_eq!(then_body.len(), 1);
    }

    #[test]
    fn test_missing_end_if_is_reported() {
        let source = "program p\nif (x) then\nx = 1\nend program p\n";
        let (_, _, diagnostics) = parse(source);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(ErrorCode::UnterminatedBlock));
    }

    #[test]
    fn test_mismatched_end_name() {
        let (_, _, diagnostics) = parse("program p\nend program q\n");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(ErrorCode::MismatchedEnd));
        assert_eq!(
            diagnostics[0].help.as_deref(),
            Some("close the unit with `end program p`")
        );
    }

    #[test]
    fn test_unclosed_paren() {
        let (_, _, diagnostics) = parse("(a + b\n");
        assert_eq!(diagnostics[0].code, Some(ErrorCode::UnclosedDelimiter));
    }

    #[test]
    fn test_recovers_after_bad_statement() {
        let source = "program p\nx = = 1\ny = 2\nend program\n";
        let (arena, unit, diagnostics) = parse(source);
        assert!(!diagnostics.is_empty());
        let [Item::Unit(program)] = unit.items.as_slice() else {
            panic!("expected program");
        };
        let last = *program.body.last().expect("body");
        assert!(matches!(
            arena.stmt(last).kind,
            StmtKind::Assignment { .. }
        ));
    }
}
