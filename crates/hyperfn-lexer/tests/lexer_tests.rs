//! Lexer tests: keywords, operators, numeric and string literals,
//! comments, spans and error recovery.

use hyperfn_lexer::{Lexer, TokenKind};
use hyperfn_types::{ErrorCode, SourceFile, Span};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Token kinds excluding the final Eof.
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("index.ts", source);
    let result = Lexer::new(&sf).lex();
    result
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let sf = SourceFile::new("index.ts", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .into_iter()
        .map(|e| e.code)
        .collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_exported_function_header() {
    assert_eq!(
        kinds("export function add(a: i32, b: i32 = 2): i32 {}"),
        vec![
            TokenKind::Export,
            TokenKind::Function,
            ident("add"),
            TokenKind::LParen,
            ident("a"),
            TokenKind::Colon,
            ident("i32"),
            TokenKind::Comma,
            ident("b"),
            TokenKind::Colon,
            ident("i32"),
            TokenKind::Eq,
            TokenKind::Integer(2, "2".into()),
            TokenKind::RParen,
            TokenKind::Colon,
            ident("i32"),
            TokenKind::LBrace,
            TokenKind::RBrace,
        ]
    );
}

#[test]
fn test_decorator_with_string_args() {
    assert_eq!(
        kinds(r#"@external("hypermode", "log")"#),
        vec![
            TokenKind::At,
            ident("external"),
            TokenKind::LParen,
            TokenKind::StringLiteral("hypermode".into()),
            TokenKind::Comma,
            TokenKind::StringLiteral("log".into()),
            TokenKind::RParen,
        ]
    );
}

#[test]
fn test_identifiers_with_dollar_and_underscore() {
    assert_eq!(
        kinds("__SUPPLIED_PARAMS $tmp _x"),
        vec![ident("__SUPPLIED_PARAMS"), ident("$tmp"), ident("_x")]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_shift_and_bitwise_operators() {
    assert_eq!(
        kinds("(m >> 3) & 1 == 0"),
        vec![
            TokenKind::LParen,
            ident("m"),
            TokenKind::Shr,
            TokenKind::Integer(3, "3".into()),
            TokenKind::RParen,
            TokenKind::Amp,
            TokenKind::Integer(1, "1".into()),
            TokenKind::EqEq,
            TokenKind::Integer(0, "0".into()),
        ]
    );
    assert_eq!(kinds(">>> << >= <="), vec![
        TokenKind::ShrU,
        TokenKind::Shl,
        TokenKind::GreaterEq,
        TokenKind::LessEq,
    ]);
}

#[test]
fn test_equality_family() {
    assert_eq!(
        kinds("= == === != !== !"),
        vec![
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::EqEqEq,
            TokenKind::BangEq,
            TokenKind::BangEqEq,
            TokenKind::Bang,
        ]
    );
}

#[test]
fn test_compound_assignment() {
    assert_eq!(
        kinds("+= -= *= /= %= &= |= ^= && ||"),
        vec![
            TokenKind::PlusEq,
            TokenKind::MinusEq,
            TokenKind::StarEq,
            TokenKind::SlashEq,
            TokenKind::PercentEq,
            TokenKind::AmpEq,
            TokenKind::PipeEq,
            TokenKind::CaretEq,
            TokenKind::AmpAmp,
            TokenKind::PipePipe,
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_forms() {
    assert_eq!(
        kinds("42 0xFF 0b101 0o17 1_000"),
        vec![
            TokenKind::Integer(42, "42".into()),
            TokenKind::Integer(255, "0xFF".into()),
            TokenKind::Integer(5, "0b101".into()),
            TokenKind::Integer(15, "0o17".into()),
            TokenKind::Integer(1000, "1_000".into()),
        ]
    );
}

#[test]
fn test_u64_max_keeps_full_magnitude() {
    assert_eq!(
        kinds("0xFFFFFFFFFFFFFFFF 18446744073709551615"),
        vec![
            TokenKind::Integer(u64::MAX, "0xFFFFFFFFFFFFFFFF".into()),
            TokenKind::Integer(u64::MAX, "18446744073709551615".into()),
        ]
    );
}

#[test]
fn test_integer_past_u64_is_invalid() {
    assert_eq!(
        error_codes("18446744073709551616"),
        vec![ErrorCode::INVALID_NUMBER]
    );
}

#[test]
fn test_float_forms() {
    assert_eq!(
        kinds("3.14 .5 1e3 2.5E-2"),
        vec![
            TokenKind::Float(3.14, "3.14".into()),
            TokenKind::Float(0.5, ".5".into()),
            TokenKind::Float(1000.0, "1e3".into()),
            TokenKind::Float(0.025, "2.5E-2".into()),
        ]
    );
}

#[test]
fn test_member_access_on_integer_is_not_float() {
    assert_eq!(
        kinds("1.toString"),
        vec![
            TokenKind::Integer(1, "1".into()),
            TokenKind::Dot,
            ident("toString"),
        ]
    );
}

#[test]
fn test_string_quotes_and_escapes() {
    assert_eq!(
        kinds(r#""a\"b" 'it\'s' `raw` "A\n""#),
        vec![
            TokenKind::StringLiteral("a\"b".into()),
            TokenKind::StringLiteral("it's".into()),
            TokenKind::StringLiteral("raw".into()),
            TokenKind::StringLiteral("A\n".into()),
        ]
    );
}

#[test]
fn test_utf8_string_content() {
    assert_eq!(
        kinds("\"héllo\""),
        vec![TokenKind::StringLiteral("héllo".into())]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Comments & spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("a // line\n/* block\n comment */ b"),
        vec![ident("a"), ident("b")]
    );
}

#[test]
fn test_spans_are_line_and_column() {
    let sf = SourceFile::new("index.ts", "let x\n  = 10;");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens[0].span, Span::new(1, 1, 1, 3));
    assert_eq!(tokens[1].span, Span::new(1, 5, 1, 5));
    assert_eq!(tokens[2].span, Span::new(2, 3, 2, 3));
    assert_eq!(tokens[3].span, Span::new(2, 5, 2, 6));
    assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unterminated_string() {
    assert_eq!(error_codes("\"abc\nlet"), vec![ErrorCode::UNTERMINATED_STRING]);
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(error_codes("a /* never closed"), vec![ErrorCode::UNTERMINATED_COMMENT]);
}

#[test]
fn test_unexpected_character_recovers() {
    let sf = SourceFile::new("index.ts", "a # b");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 1);
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_CHARACTER);
    let rest: Vec<_> = result.tokens.into_iter().map(|t| t.kind).collect();
    assert_eq!(rest, vec![ident("a"), ident("b"), TokenKind::Eof]);
}

#[test]
fn test_invalid_hex_literal() {
    assert_eq!(error_codes("0x"), vec![ErrorCode::INVALID_NUMBER]);
}

#[test]
fn test_error_cap_stops_lexing() {
    let source = "#".repeat(40);
    let sf = SourceFile::new("index.ts", source);
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, hyperfn_types::MAX_ERRORS);
    assert_eq!(result.tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
}
