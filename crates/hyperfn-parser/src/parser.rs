//! Core parser infrastructure: token cursor, error reporting, helpers.

use hyperfn_lexer::token::{Token, TokenKind};
use hyperfn_types::ast::{Arena, Ident, Program, SourceKind};
use hyperfn_types::{CompileErrors, ErrorCode, SourceError, SourceFile, Span};

/// Maximum expression nesting depth.
pub(crate) const MAX_EXPR_DEPTH: u32 = 64;

/// The hyperfn parser.
///
/// Consumes the lexer's token stream and builds a [`Program`] whose nodes
/// live in one [`Arena`]. Collects errors and recovers at statement and
/// declaration boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: CompileErrors,
    kind: SourceKind,
    pub(crate) arena: Arena,
    pub(crate) expr_depth: u32,
}

pub struct ParseResult {
    pub program: Option<Program>,
    pub errors: CompileErrors,
}

/// Module path for a source file name: extension and leading `./` removed,
/// separators normalized to `/`.
pub fn module_path(file_name: &str) -> String {
    let normalized = file_name.replace('\\', "/");
    let trimmed = normalized.trim_start_matches("./");
    trimmed
        .strip_suffix(".ts")
        .unwrap_or(trimmed)
        .to_string()
}

impl<'src> Parser<'src> {
    /// A stream that does not end in `Eof` gets one appended.
    pub fn new(mut tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof) {
            let span = tokens.last().map_or(Span::point(1, 1), |t| t.span);
            tokens.push(Token::new(TokenKind::Eof, span));
        }
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: CompileErrors::empty(),
            kind: SourceKind::Entry,
            arena: Arena::new(),
            expr_depth: 0,
        }
    }

    /// Role of the parsed source in the compilation (defaults to entry).
    pub fn with_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Parse the whole token stream.
    pub fn parse(mut self) -> ParseResult {
        let start = self.current_span();
        let mut items = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            match self.parse_item() {
                Some(item) => items.push(item),
                None => self.synchronize_item(),
            }
        }
        let span = start.merge(self.previous_span());

        if self.errors.has_errors() {
            return ParseResult {
                program: None,
                errors: self.errors,
            };
        }
        ParseResult {
            program: Some(Program {
                path: module_path(&self.source_file.name),
                kind: self.kind,
                items,
                arena: self.arena,
                span,
            }),
            errors: self.errors,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof.
        match self.tokens.get(self.pos) {
            Some(token) => token,
            None => &self.tokens[self.tokens.len() - 1],
        }
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::point(1, 1)
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        let index = (self.pos + n).min(self.tokens.len().saturating_sub(1));
        &self.tokens[index].kind
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{}', got '{}'", expected, self.peek_kind()),
            );
            None
        }
    }

    /// An identifier, or a contextual keyword used as a name.
    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        let kind = self.peek_kind().clone();
        match kind {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            k if k.is_contextual_keyword() => {
                let span = self.advance().span;
                Some(Ident::new(k.to_string(), span))
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected identifier, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Any identifier or keyword, as allowed after `.` and as object keys.
    pub(crate) fn expect_property_name(&mut self) -> Option<Ident> {
        let kind = self.peek_kind().clone();
        match kind {
            TokenKind::Identifier(name) => {
                let span = self.advance().span;
                Some(Ident::new(name, span))
            }
            k if k.is_keyword() => {
                let span = self.advance().span;
                Some(Ident::new(k.to_string(), span))
            }
            _ => self.expect_identifier(),
        }
    }

    pub(crate) fn expect_string_literal(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::StringLiteral(value) => {
                self.advance();
                Some(value)
            }
            _ => {
                self.error_at_current(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected string literal, got '{}'", self.peek_kind()),
                );
                None
            }
        }
    }

    /// Consume a `>` that closes type arguments, splitting `>>` / `>>>`.
    pub(crate) fn expect_closing_angle(&mut self) -> Option<()> {
        let span = self.current_span();
        let rest = match self.peek_kind() {
            TokenKind::Greater => {
                self.advance();
                return Some(());
            }
            TokenKind::Shr => TokenKind::Greater,
            TokenKind::ShrU => TokenKind::Shr,
            TokenKind::GreaterEq => TokenKind::Eq,
            _ => {
                self.expect(&TokenKind::Greater)?;
                return Some(());
            }
        };
        let split = Span::new(span.start_line, span.start_col + 1, span.end_line, span.end_col);
        self.tokens[self.pos] = Token::new(rest, split);
        Some(())
    }

    /// Optional statement terminator.
    pub(crate) fn eat_semicolon(&mut self) {
        self.eat(&TokenKind::Semicolon);
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = SourceError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(code, message, span);
    }

    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.is_saturated()
    }

    // ── Recovery ──────────────────────────────────────────────────────────────

    /// Skip to the next token that can start a top-level item.
    fn synchronize_item(&mut self) {
        let mut depth = 0u32;
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    if depth <= 1 {
                        self.advance();
                        if depth == 1 {
                            return;
                        }
                        continue;
                    }
                    depth -= 1;
                }
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Export
                | TokenKind::Import
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Declare
                | TokenKind::At
                    if depth == 0 =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip to the end of the current statement inside a block.
    pub(crate) fn synchronize_stmt(&mut self) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                TokenKind::If
                | TokenKind::Return
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::Throw
                | TokenKind::While => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
