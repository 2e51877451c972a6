//! Runtime error types for the evaluator.

use std::fmt;

use crate::value::Value;

/// Evaluation error: runtime traps, unknown names, misuse of values.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Integer division by zero.
    ArithmeticTrap(String),
    /// Unknown variable
    UndefinedVariable(String),
    /// Unknown function, or a body-less host import
    UnknownFunction(String),
    /// `new T()` for a class the program does not declare
    UnknownClass(String),
    /// Wrong number of arguments for a call
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    /// An omitted argument for a parameter without an initializer
    MissingArgument { function: String, parameter: String },
    /// Type mismatch at runtime
    TypeMismatch(String),
    /// Null access: `null.field`, `null[i]`
    NullAccess(String),
    /// `array[i]` outside `0..len`
    IndexOutOfBounds { index: i64, len: usize },
    /// `throw value`
    Thrown(Value),
    /// Gas exhaustion
    GasExhausted,
    /// Call depth exceeded
    StackOverflow,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArithmeticTrap(msg) => write!(f, "arithmetic trap: {msg}"),
            Self::UndefinedVariable(name) => write!(f, "undefined variable: {name}"),
            Self::UnknownFunction(name) => write!(f, "unknown function: {name}"),
            Self::UnknownClass(name) => write!(f, "unknown class: {name}"),
            Self::ArityMismatch {
                function,
                expected,
                got,
            } => write!(
                f,
                "'{function}' takes {expected} arguments, {got} were given"
            ),
            Self::MissingArgument {
                function,
                parameter,
            } => write!(
                f,
                "'{function}': no argument and no default for '{parameter}'"
            ),
            Self::TypeMismatch(msg) => write!(f, "type mismatch: {msg}"),
            Self::NullAccess(msg) => write!(f, "null access: {msg}"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::Thrown(value) => write!(f, "uncaught throw: {value}"),
            Self::GasExhausted => write!(f, "gas exhausted"),
            Self::StackOverflow => write!(f, "call stack overflow"),
        }
    }
}

impl std::error::Error for EvalError {}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
