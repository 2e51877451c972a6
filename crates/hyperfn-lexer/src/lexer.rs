//! Core lexer: source text to a token stream.
//!
//! - `//` and `/* */` comments are skipped
//! - Newlines are whitespace; statements end with `;` or `}`
//! - Error recovery: collects up to [`hyperfn_types::MAX_ERRORS`] errors

use hyperfn_types::{CompileErrors, ErrorCode, SourceError, SourceFile, Span};

use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    source: &'src [u8],
    source_file: &'src SourceFile,
    pos: usize,
    line: u32,
    col: u32,
    errors: CompileErrors,
}

/// Result of lexing: tokens (always ending in [`TokenKind::Eof`]) + errors.
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: source_file.source.as_bytes(),
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            errors: CompileErrors::empty(),
        }
    }

    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            if self.errors.is_saturated() {
                break;
            }
            let token = self.scan_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            tokens.push(Token::new(TokenKind::Eof, self.current_span()));
        }
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if ch & 0xC0 != 0x80 {
            // Continuation bytes of a UTF-8 sequence do not start a column.
            self.col += 1;
        }
        Some(ch)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn text_from(&self, start: usize) -> &'src str {
        std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("")
    }

    fn emit_error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let err = SourceError::new(&self.source_file.name, code, message, span, source_line);
        self.errors.push_error(err);
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace & comments
    // ─────────────────────────────────────────────────────────────

    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(b' ' | b'\t' | b'\r' | b'\n'), _) => {
                    self.advance();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                (Some(b'/'), Some(b'*')) => self.skip_block_comment(),
                _ => break,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let (start_line, start_col) = (self.line, self.col);
        self.advance();
        self.advance();
        loop {
            match self.peek() {
                None => {
                    let span = self.span_from(start_line, start_col);
                    self.emit_error(
                        ErrorCode::UNTERMINATED_COMMENT,
                        "unterminated block comment",
                        span,
                    );
                    return;
                }
                Some(b'*') if self.peek_at(1) == Some(b'/') => {
                    self.advance();
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Token scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        loop {
            self.skip_trivia();
            if self.errors.is_saturated() || self.peek().is_none() {
                return Token::new(TokenKind::Eof, self.current_span());
            }
            if let Some(token) = self.scan_one() {
                return token;
            }
        }
    }

    /// Scan one lexeme. Returns `None` after reporting an unexpected
    /// character so the caller can continue with the next one.
    fn scan_one(&mut self) -> Option<Token> {
        let start = self.pos;
        let (start_line, start_col) = (self.line, self.col);
        let ch = self.advance()?;

        let kind = match ch {
            b'"' | b'\'' | b'`' => self.scan_string(ch, start_line, start_col),
            b'0'..=b'9' => self.scan_number(start, start_line, start_col),
            b'.' if matches!(self.peek(), Some(b'0'..=b'9')) => {
                self.scan_number(start, start_line, start_col)
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'$' => {
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphanumeric() || c == b'_' || c == b'$' {
                        self.advance();
                    } else {
                        break;
                    }
                }
                let text = self.text_from(start);
                TokenKind::from_keyword(text)
                    .unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
            }
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b':' => TokenKind::Colon,
            b'.' => TokenKind::Dot,
            b'?' => TokenKind::Question,
            b'@' => TokenKind::At,
            b'~' => TokenKind::Tilde,
            b'+' => self.with_eq(TokenKind::Plus, TokenKind::PlusEq),
            b'-' => self.with_eq(TokenKind::Minus, TokenKind::MinusEq),
            b'*' => self.with_eq(TokenKind::Star, TokenKind::StarEq),
            b'/' => self.with_eq(TokenKind::Slash, TokenKind::SlashEq),
            b'%' => self.with_eq(TokenKind::Percent, TokenKind::PercentEq),
            b'^' => self.with_eq(TokenKind::Caret, TokenKind::CaretEq),
            b'&' => {
                if self.eat(b'&') {
                    TokenKind::AmpAmp
                } else {
                    self.with_eq(TokenKind::Amp, TokenKind::AmpEq)
                }
            }
            b'|' => {
                if self.eat(b'|') {
                    TokenKind::PipePipe
                } else {
                    self.with_eq(TokenKind::Pipe, TokenKind::PipeEq)
                }
            }
            b'=' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else {
                    TokenKind::Eq
                }
            }
            b'!' => {
                if self.eat(b'=') {
                    if self.eat(b'=') {
                        TokenKind::BangEqEq
                    } else {
                        TokenKind::BangEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            b'<' => {
                if self.eat(b'<') {
                    TokenKind::Shl
                } else {
                    self.with_eq(TokenKind::Less, TokenKind::LessEq)
                }
            }
            b'>' => {
                if self.eat(b'>') {
                    if self.eat(b'>') {
                        TokenKind::ShrU
                    } else {
                        TokenKind::Shr
                    }
                } else {
                    self.with_eq(TokenKind::Greater, TokenKind::GreaterEq)
                }
            }
            other => {
                let span = self.span_from(start_line, start_col);
                let shown = self.source_file.source[start..]
                    .chars()
                    .next()
                    .unwrap_or(other as char);
                // Skip the rest of a multi-byte character.
                while matches!(self.peek(), Some(c) if c & 0xC0 == 0x80) {
                    self.advance();
                }
                self.emit_error(
                    ErrorCode::UNEXPECTED_CHARACTER,
                    format!("unexpected character '{shown}'"),
                    span,
                );
                return None;
            }
        };

        Some(Token::new(kind, self.span_from(start_line, start_col)))
    }

    /// `op` or `op=`.
    fn with_eq(&mut self, plain: TokenKind, compound: TokenKind) -> TokenKind {
        if self.eat(b'=') {
            compound
        } else {
            plain
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self, start: usize, start_line: u32, start_col: u32) -> TokenKind {
        let first = self.source[start];
        let radix = match (first, self.peek()) {
            (b'0', Some(b'x' | b'X')) => 16,
            (b'0', Some(b'b' | b'B')) => 2,
            (b'0', Some(b'o' | b'O')) => 8,
            _ => 10,
        };

        if radix != 10 {
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit() || c == b'_') {
                self.advance();
            }
            let text = self.text_from(start).to_string();
            let digits: String = text[2..].chars().filter(|c| *c != '_').collect();
            return match u64::from_str_radix(&digits, radix) {
                Ok(v) => TokenKind::Integer(v, text),
                Err(_) => self.invalid_number(text, start_line, start_col),
            };
        }

        let mut is_float = first == b'.';
        while matches!(self.peek(), Some(b'0'..=b'9' | b'_')) {
            self.advance();
        }
        if !is_float && self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9' | b'_')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some(b'+' | b'-')));
            if matches!(self.peek_at(1 + sign), Some(b'0'..=b'9')) {
                is_float = true;
                for _ in 0..=sign {
                    self.advance();
                }
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.advance();
                }
            }
        }

        let text = self.text_from(start).to_string();
        let clean: String = text.chars().filter(|c| *c != '_').collect();
        if is_float {
            match clean.parse::<f64>() {
                Ok(v) => TokenKind::Float(v, text),
                Err(_) => self.invalid_number(text, start_line, start_col),
            }
        } else {
            match clean.parse::<u64>() {
                Ok(v) => TokenKind::Integer(v, text),
                Err(_) => self.invalid_number(text, start_line, start_col),
            }
        }
    }

    fn invalid_number(&mut self, text: String, start_line: u32, start_col: u32) -> TokenKind {
        let span = self.span_from(start_line, start_col);
        self.emit_error(
            ErrorCode::INVALID_NUMBER,
            format!("invalid numeric literal '{text}'"),
            span,
        );
        TokenKind::Integer(0, text)
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    fn scan_string(&mut self, quote: u8, start_line: u32, start_col: u32) -> TokenKind {
        let mut buf: Vec<u8> = Vec::new();
        loop {
            match self.peek() {
                None => break,
                Some(b'\n') if quote != b'`' => break,
                Some(c) if c == quote => {
                    self.advance();
                    return TokenKind::StringLiteral(String::from_utf8_lossy(&buf).into_owned());
                }
                Some(b'\\') => {
                    self.advance();
                    self.scan_escape(&mut buf);
                }
                Some(b'$') if quote == b'`' && self.peek_at(1) == Some(b'{') => {
                    let span = self.current_span();
                    self.emit_error(
                        ErrorCode::UNEXPECTED_TOKEN,
                        "template interpolation is not supported",
                        span,
                    );
                    self.advance();
                    buf.push(b'$');
                }
                Some(c) => {
                    self.advance();
                    buf.push(c);
                }
            }
        }
        let span = self.span_from(start_line, start_col);
        self.emit_error(ErrorCode::UNTERMINATED_STRING, "unterminated string literal", span);
        TokenKind::StringLiteral(String::from_utf8_lossy(&buf).into_owned())
    }

    fn scan_escape(&mut self, buf: &mut Vec<u8>) {
        let span = self.current_span();
        let Some(ch) = self.advance() else {
            self.emit_error(
                ErrorCode::UNTERMINATED_STRING,
                "unexpected end of file in escape sequence",
                span,
            );
            return;
        };
        let decoded = match ch {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'0' => '\0',
            b'\\' | b'"' | b'\'' | b'`' | b'$' => ch as char,
            b'\n' => return,
            b'u' => {
                let start = self.pos;
                for _ in 0..4 {
                    if matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                        self.advance();
                    }
                }
                match u32::from_str_radix(self.text_from(start), 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    Some(c) if self.pos - start == 4 => c,
                    _ => {
                        self.emit_error(
                            ErrorCode::UNEXPECTED_TOKEN,
                            "invalid unicode escape",
                            span,
                        );
                        return;
                    }
                }
            }
            other => {
                self.emit_error(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("invalid escape sequence '\\{}'", other as char),
                    span,
                );
                other as char
            }
        };
        let mut tmp = [0u8; 4];
        buf.extend_from_slice(decoded.encode_utf8(&mut tmp).as_bytes());
    }
}
