//! hyperfn tree-walking evaluator: reference semantics.
//!
//! Executes functions directly from the arena AST without compiling to
//! WASM. Used to check that a rewritten function called with a supplied
//! mask behaves exactly like the unrewritten function called with native defaults.

pub mod env;
pub mod error;
pub mod evaluator;
pub mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, DEFAULT_GAS_LIMIT, MAX_CALL_DEPTH};
pub use value::Value;
