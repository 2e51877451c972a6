//! hyperfn default-parameter rewrite.
//!
//! The target language only supports trailing defaults. Exported functions
//! are rewritten so every parameter is positional and a trailing
//! `__SUPPLIED_PARAMS: u64` tells the callee which arguments the host
//! actually passed:
//!
//! ```text
//! export function createVec(x: i32 = 1, y: i32 = 2, z: i32 = 3): Vec3 { ... }
//! ```
//!
//! becomes
//!
//! ```text
//! export function createVec(x: i32, y: i32, z: i32, __SUPPLIED_PARAMS: u64): Vec3 {
//!   if ((__SUPPLIED_PARAMS & 1) == 0) x = 1;
//!   if (((__SUPPLIED_PARAMS >> 1) & 1) == 0) y = 2;
//!   if (((__SUPPLIED_PARAMS >> 2) & 1) == 0) z = 3;
//!   ...
//! }
//! ```
//!
//! Bit *i* set means argument *i* was supplied. The documentation-only
//! rendering of every default is kept in a [`RewriteContext`] for the
//! signature stringifier.

pub mod context;
pub mod defaults;
pub mod error;
pub mod mask;
pub mod printer;
pub mod rewrite;

pub use context::RewriteContext;
pub use defaults::DefaultLiteral;
pub use error::{TransformError, TransformResult};
pub use mask::{is_supplied, supplied_mask, MASK_PARAM, MASK_TYPE, MAX_PARAMS};
pub use printer::{print_function, print_program};
pub use rewrite::rewrite_sources;
