//! Documentation-only view of parameter initializers.
//!
//! Rendering never fails: anything outside the recognized literal forms
//! becomes `...`.

use hyperfn_types::ast::{Arena, ExprId, ExprKind, Literal, UnaryOp};
use serde_json::{Map, Number, Value};

/// Maximum rendered length of a number before it is cut.
const MAX_NUMBER_CHARS: usize = 6;

/// Maximum rendered length of a string, quotes included, before it is cut.
const MAX_STRING_CHARS: usize = 8;

const ELLIPSIS: &str = "...";

/// The initializer forms the stringifier distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultLiteral {
    Null,
    Bool(bool),
    /// Every `u64` literal and the negation of every `i64`-representable one.
    Integer(i128),
    Float(f64),
    String(String),
    Array { len: usize },
    Object { len: usize },
    /// `new T(args...)`
    New { args: usize },
    Other,
}

impl DefaultLiteral {
    /// Classify an initializer expression. A leading `-` on a numeric
    /// literal is folded into the number; a negated integer below `i64::MIN`
    /// is [`Other`](Self::Other).
    pub fn classify(arena: &Arena, id: ExprId) -> Self {
        match &arena[id].kind {
            ExprKind::Literal(literal) => match literal {
                Literal::Null => Self::Null,
                Literal::Bool(b) => Self::Bool(*b),
                Literal::Integer { value, .. } => Self::Integer(i128::from(*value)),
                Literal::Float { value, .. } => Self::Float(*value),
                Literal::String(s) => Self::String(s.clone()),
                Literal::Array(items) => Self::Array { len: items.len() },
                Literal::Object(entries) => Self::Object { len: entries.len() },
            },
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            } => match Self::classify(arena, *operand) {
                Self::Integer(v) if -v >= i128::from(i64::MIN) => Self::Integer(-v),
                Self::Float(v) => Self::Float(-v),
                _ => Self::Other,
            },
            ExprKind::New { args, .. } => Self::New { args: args.len() },
            _ => Self::Other,
        }
    }

    /// Best-effort text for reports.
    pub fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Integer(v) => truncate(v.to_string(), MAX_NUMBER_CHARS),
            Self::Float(v) => truncate(float_text(*v), MAX_NUMBER_CHARS),
            Self::String(s) => render_string(s),
            Self::Array { len: 0 } => "[]".to_string(),
            Self::Array { .. } => "[...]".to_string(),
            Self::Object { len: 0 } | Self::New { args: 0 } => "{}".to_string(),
            Self::Object { .. } | Self::New { .. } => "{...}".to_string(),
            Self::Other => ELLIPSIS.to_string(),
        }
    }
}

/// Render the initializer `id` for documentation.
pub fn render_default(arena: &Arena, id: ExprId) -> String {
    DefaultLiteral::classify(arena, id).render()
}

/// The initializer as JSON, when it is built only from JSON-representable
/// literals.
pub fn to_json(arena: &Arena, id: ExprId) -> Option<Value> {
    match &arena[id].kind {
        ExprKind::Literal(literal) => match literal {
            Literal::Null => Some(Value::Null),
            Literal::Bool(b) => Some(Value::Bool(*b)),
            Literal::Integer { value, .. } => integer_json(i128::from(*value)),
            Literal::Float { value, .. } => Number::from_f64(*value).map(Value::Number),
            Literal::String(s) => Some(Value::String(s.clone())),
            Literal::Array(items) => items
                .iter()
                .map(|&item| to_json(arena, item))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Literal::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key.name.clone(), to_json(arena, *value)?);
                }
                Some(Value::Object(map))
            }
        },
        ExprKind::Unary {
            op: UnaryOp::Neg,
            operand,
        } => match DefaultLiteral::classify(arena, id) {
            DefaultLiteral::Integer(v) if is_number(arena, *operand) => integer_json(v),
            DefaultLiteral::Float(v) if is_number(arena, *operand) => {
                Number::from_f64(v).map(Value::Number)
            }
            _ => None,
        },
        _ => None,
    }
}

fn integer_json(v: i128) -> Option<Value> {
    u64::try_from(v)
        .map(Value::from)
        .or_else(|_| i64::try_from(v).map(Value::from))
        .ok()
}

fn is_number(arena: &Arena, id: ExprId) -> bool {
    matches!(
        arena[id].kind,
        ExprKind::Literal(Literal::Integer { .. } | Literal::Float { .. })
    )
}

/// Floats always show a fractional part so `1.0` is not mistaken for `1`.
fn float_text(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

fn truncate(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(ELLIPSIS);
    cut
}

fn render_string(s: &str) -> String {
    let quoted_len = s.chars().count() + 2;
    if quoted_len <= MAX_STRING_CHARS {
        return format!("\"{s}\"");
    }
    let head: String = s.chars().take(MAX_STRING_CHARS - 2).collect();
    format!("\"{head}{ELLIPSIS}\"")
}
