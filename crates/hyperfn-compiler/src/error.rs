//! Build error types.

use std::path::PathBuf;

use hyperfn_metadata::EmbedError;
use hyperfn_transform::TransformError;
use hyperfn_types::CompileErrors;
use thiserror::Error;

/// Errors loading a [`BuildConfig`](crate::BuildConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Lexing or parsing failed in at least one source.
    #[error("{0}")]
    Syntax(CompileErrors),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A phase was invoked before the sources were transformed.
    #[error("no sources have been transformed yet")]
    NotTransformed,

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CompileErrors> for BuildError {
    fn from(errors: CompileErrors) -> Self {
        Self::Syntax(errors)
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
