//! Shared types for the hyperfn transform and metadata pipeline.
//!
//! This crate defines the arena-backed AST, source spans, structured
//! source errors, and the signature model (parameters, type references,
//! function signatures, type definitions) that ends up in the manifest.

mod error;
mod span;
pub mod ast;
pub mod signature;

pub use error::{CompileErrors, ErrorCategory, ErrorCode, Severity, SourceError, MAX_ERRORS};
pub use span::{SourceFile, Span};

/// Result type used by the front-end stages.
pub type Result<T> = std::result::Result<T, SourceError>;
