//! hyperfn build driver.
//!
//! ```text
//! SourceInput → Lexer → Parser → Rewrite → TypeResolver → Manifest → embed / report
//! ```
//!
//! [`Build`] runs the phases one at a time; [`compile`] runs them all.

pub mod config;
pub mod env;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod ty;

pub use config::BuildConfig;
pub use error::{BuildError, BuildResult, ConfigError, ConfigResult};
pub use pipeline::{compile, Build, BuildOutput, SourceInput};
pub use resolve::TypeResolver;
pub use ty::{Primitive, Type};
