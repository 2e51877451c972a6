//! Signature model recorded in the manifest.
//!
//! Plain data: rendering lives in `hyperfn-metadata`, construction in the
//! rewrite pass and the compilation driver.

use serde::{Deserialize, Serialize};

/// A resolved type: display name plus fully qualified origin path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub path: String,
}

impl TypeRef {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// One parameter of an exported function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// True iff the source declaration supplied an initializer.
    #[serde(default)]
    pub optional: bool,
    /// The initializer as JSON, when it is a JSON-representable literal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl Parameter {
    pub fn required(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            optional: false,
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    /// External name, which may differ from the declared identifier.
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub offset: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
}

/// A concrete type that crosses the module boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub id: u32,
    /// Instance size in bytes.
    pub size: u32,
    pub path: String,
    pub name: String,
    /// `None` for primitives, opaque and built-in types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<Field>>,
}

/// Origin paths of built-in types that never appear in type listings.
pub const HIDDEN_TYPE_PATHS: [&str; 5] = [
    "~lib/string/String",
    "~lib/array/Array",
    "~lib/map/Map",
    "~lib/date/Date",
    "~lib/wasi_date/wasi_Date",
];

/// Path prefixes of generic built-ins and internal library types.
pub const HIDDEN_TYPE_PREFIXES: [&str; 3] = ["~lib/array/Array<", "~lib/map/Map<", "~lib/@hypermode/"];

impl TypeDefinition {
    /// Built-in and internal-library types are kept in the manifest but
    /// left out of human-facing listings.
    pub fn is_hidden(&self) -> bool {
        HIDDEN_TYPE_PATHS.contains(&self.path.as_str())
            || HIDDEN_TYPE_PREFIXES
                .iter()
                .any(|prefix| self.path.starts_with(prefix))
    }
}

/// Default-value information captured by the rewrite pass for one
/// parameter that had an initializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionalParamRecord {
    pub parameter: Parameter,
    /// Documentation-only rendering of the initializer.
    pub default_value_text: Option<String>,
}
