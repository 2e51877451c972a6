use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of errors stored before the front-end stops collecting.
pub const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Error category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Declaration,
    Transform,
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const UNEXPECTED_CHARACTER: Self = Self(102);
    pub const INVALID_NUMBER: Self = Self(103);
    pub const UNTERMINATED_COMMENT: Self = Self(104);
    pub const NESTING_TOO_DEEP: Self = Self(105);

    // ── Declaration errors (E200–E299) ──
    pub const INVALID_DECORATOR: Self = Self(200);
    pub const MISSING_TYPE_ANNOTATION: Self = Self(201);
    pub const UNSUPPORTED_DECLARATION: Self = Self(202);

    // ── Transform errors (E300–E399) ──
    pub const TOO_MANY_PARAMETERS: Self = Self(300);
    pub const RESERVED_PARAMETER_NAME: Self = Self(301);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            200..=299 => ErrorCategory::Declaration,
            300..=399 => ErrorCategory::Transform,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Declaration => write!(f, "declaration"),
            Self::Transform => write!(f, "transform"),
        }
    }
}

/// A structured error tied to a location in a source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceError {
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, verbatim.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl SourceError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.file, self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for SourceError {}

/// Errors and warnings collected by one front-end stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<SourceError>,
    pub warnings: Vec<SourceError>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Whether the stored error list is full.
    pub fn is_saturated(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Add an error; only the first [`MAX_ERRORS`] are stored, all are counted.
    pub fn push_error(&mut self, error: SourceError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: SourceError) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Move every error and warning of `other` into `self`.
    pub fn extend(&mut self, other: CompileErrors) {
        // Errors past the storage cap were counted but not kept.
        let dropped = other.total_errors.saturating_sub(other.errors.len());
        for e in other.errors {
            self.push_error(e);
        }
        self.total_errors += dropped;
        for w in other.warnings {
            self.push_warning(w);
        }
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        if self.total_errors > self.errors.len() {
            write!(f, "\n... and {} more", self.total_errors - self.errors.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileErrors {}
