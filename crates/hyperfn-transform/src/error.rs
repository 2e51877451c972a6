//! Rewrite error types.

use hyperfn_types::{ErrorCode, Span};
use thiserror::Error;

use crate::mask::{MASK_PARAM, MAX_PARAMS};

/// Fatal conditions of the rewrite pass. Each aborts the build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The function cannot fit its parameters plus the mask in 64 bits.
    #[error(
        "{file}:{span}: function '{function}' has {count} parameters, at most {max} are allowed",
        max = MAX_PARAMS
    )]
    TooManyParameters {
        function: String,
        count: usize,
        file: String,
        span: Span,
    },

    /// A user parameter already uses the mask parameter's name.
    #[error(
        "{file}:{span}: function '{function}' declares a parameter named '{name}', which is reserved",
        name = MASK_PARAM
    )]
    ReservedParameterName {
        function: String,
        file: String,
        span: Span,
    },

    /// A host-side mask was asked about an argument past bit 63.
    #[error("argument index {index} does not fit in a 64-bit mask")]
    MaskIndexOutOfRange { index: usize },
}

impl TransformError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TooManyParameters { .. } | Self::MaskIndexOutOfRange { .. } => {
                ErrorCode::TOO_MANY_PARAMETERS
            }
            Self::ReservedParameterName { .. } => ErrorCode::RESERVED_PARAMETER_NAME,
        }
    }

    /// Name of the offending function, when the error came from one.
    pub fn function(&self) -> Option<&str> {
        match self {
            Self::TooManyParameters { function, .. }
            | Self::ReservedParameterName { function, .. } => Some(function),
            Self::MaskIndexOutOfRange { .. } => None,
        }
    }
}

/// Rewrite result type alias.
pub type TransformResult<T> = Result<T, TransformError>;
