//! Embedding error types.

use thiserror::Error;

/// Errors that abort attaching the manifest to a module.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The input bytes are not a well-formed core WebAssembly module.
    #[error("invalid input module: {0}")]
    InvalidModule(String),

    /// The manifest could not be encoded or decoded.
    #[error("manifest encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The rebuilt module failed validation.
    #[error("section '{section}' could not be attached: {reason}")]
    ValidationFailed { section: String, reason: String },

    /// The requested section name cannot be used.
    #[error("invalid custom section name '{0}'")]
    InvalidSectionName(String),
}

/// Embedding result type alias.
pub type EmbedResult<T> = Result<T, EmbedError>;
