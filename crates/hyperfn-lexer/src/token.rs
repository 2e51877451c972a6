//! Token types for the hyperfn lexer.

use hyperfn_types::Span;
use std::fmt;

/// Reserved words of the supported source subset.
pub const ALL_KEYWORDS: &[&str] = &[
    // Modules (4)
    "export", "import", "from", "as",
    // Declarations (9)
    "function", "declare", "class", "let", "const", "var", "readonly", "public", "private",
    // Statements (5)
    "if", "else", "return", "throw", "while",
    // Expressions (5)
    "new", "this", "true", "false", "null",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is_keyword(&self) -> bool {
        self.kind.is_keyword()
    }
}

/// Every token kind the lexer produces.
///
/// `>>` and `>>>` are lexed greedily; the parser splits them back into
/// `>` tokens when closing nested type arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────
    /// `42`, `0xFF`, `1_000`; unsigned value plus source spelling. A sign is
    /// a separate `-` token.
    Integer(u64, String),
    /// `3.14`, `1e-3`
    Float(f64, String),
    /// `"text"`, `'text'` or `` `text` `` with escapes resolved.
    StringLiteral(String),

    Identifier(String),

    // ── Keywords ──────────────────────────────────────────────
    Export,
    Import,
    From,
    As,
    Function,
    Declare,
    Class,
    Let,
    Const,
    Var,
    Readonly,
    Public,
    Private,
    If,
    Else,
    Return,
    Throw,
    While,
    New,
    This,
    True,
    False,
    Null,

    // ── Operators ─────────────────────────────────────────────
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    Eq,
    EqEq,
    EqEqEq,
    BangEq,
    BangEqEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Shl,
    Shr,
    ShrU,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,

    // ── Punctuation ───────────────────────────────────────────
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Question,
    At,

    Eof,
}

impl TokenKind {
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "export" => TokenKind::Export,
            "import" => TokenKind::Import,
            "from" => TokenKind::From,
            "as" => TokenKind::As,
            "function" => TokenKind::Function,
            "declare" => TokenKind::Declare,
            "class" => TokenKind::Class,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "var" => TokenKind::Var,
            "readonly" => TokenKind::Readonly,
            "public" => TokenKind::Public,
            "private" => TokenKind::Private,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "return" => TokenKind::Return,
            "throw" => TokenKind::Throw,
            "while" => TokenKind::While,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Export
                | TokenKind::Import
                | TokenKind::From
                | TokenKind::As
                | TokenKind::Function
                | TokenKind::Declare
                | TokenKind::Class
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::Var
                | TokenKind::Readonly
                | TokenKind::Public
                | TokenKind::Private
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::Return
                | TokenKind::Throw
                | TokenKind::While
                | TokenKind::New
                | TokenKind::This
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Keywords that stay usable as plain names (`from`, `as`, modifiers, ...).
    pub fn is_contextual_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::From
                | TokenKind::As
                | TokenKind::Declare
                | TokenKind::Readonly
                | TokenKind::Public
                | TokenKind::Private
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Integer(_, text) | TokenKind::Float(_, text) => return f.write_str(text),
            TokenKind::StringLiteral(s) => return write!(f, "\"{s}\""),
            TokenKind::Identifier(name) => return f.write_str(name),
            TokenKind::Export => "export",
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::As => "as",
            TokenKind::Function => "function",
            TokenKind::Declare => "declare",
            TokenKind::Class => "class",
            TokenKind::Let => "let",
            TokenKind::Const => "const",
            TokenKind::Var => "var",
            TokenKind::Readonly => "readonly",
            TokenKind::Public => "public",
            TokenKind::Private => "private",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Return => "return",
            TokenKind::Throw => "throw",
            TokenKind::While => "while",
            TokenKind::New => "new",
            TokenKind::This => "this",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::EqEqEq => "===",
            TokenKind::BangEq => "!=",
            TokenKind::BangEqEq => "!==",
            TokenKind::Less => "<",
            TokenKind::Greater => ">",
            TokenKind::LessEq => "<=",
            TokenKind::GreaterEq => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::ShrU => ">>>",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Question => "?",
            TokenKind::At => "@",
            TokenKind::Eof => "end of file",
        };
        f.write_str(s)
    }
}
