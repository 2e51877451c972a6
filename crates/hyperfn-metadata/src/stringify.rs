//! Single-line renderings of signatures and type definitions.

use hyperfn_transform::RewriteContext;
use hyperfn_types::signature::{FunctionSignature, OptionalParamRecord, TypeDefinition};

/// Parameters whose name starts with this prefix are synthesized and never
/// shown to users.
pub const INTERNAL_PREFIX: &str = "__";

/// Text used for an optional parameter whose default has no rendering.
const UNKNOWN_DEFAULT: &str = "...";

/// Source of the documentation-only default texts of a build.
pub trait RecordLookup {
    /// Records of the function with this external name, if it was processed.
    fn records(&self, function: &str) -> Option<&[OptionalParamRecord]>;
}

impl RecordLookup for RewriteContext {
    fn records(&self, function: &str) -> Option<&[OptionalParamRecord]> {
        RewriteContext::records(self, function)
    }
}

/// No default texts, e.g. for a manifest read back from a module.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecords;

impl RecordLookup for NoRecords {
    fn records(&self, _function: &str) -> Option<&[OptionalParamRecord]> {
        None
    }
}

/// `name(param: Type = default, ...): ReturnType`
///
/// Only optional parameters get a `= default` suffix; its text comes from
/// the matching record, `...` when there is none.
pub fn signature_to_string(
    signature: &FunctionSignature,
    records: Option<&[OptionalParamRecord]>,
) -> String {
    let params: Vec<String> = signature
        .parameters
        .iter()
        .filter(|p| !p.name.starts_with(INTERNAL_PREFIX))
        .map(|p| {
            let mut text = format!("{}: {}", p.name, p.type_ref.name);
            if p.optional {
                let default = records
                    .and_then(|records| records.iter().find(|r| r.parameter.name == p.name))
                    .and_then(|r| r.default_value_text.as_deref())
                    .unwrap_or(UNKNOWN_DEFAULT);
                text.push_str(" = ");
                text.push_str(default);
            }
            text
        })
        .collect();
    format!(
        "{}({}): {}",
        signature.name,
        params.join(", "),
        signature.return_type.name
    )
}

/// `Name` for types without fields, `Name { field: Type, ... }` otherwise.
pub fn type_to_string(def: &TypeDefinition) -> String {
    match def.fields.as_deref() {
        None | Some([]) => def.name.clone(),
        Some(fields) => {
            let fields: Vec<String> = fields
                .iter()
                .map(|f| format!("{}: {}", f.name, f.type_ref.name))
                .collect();
            format!("{} {{ {} }}", def.name, fields.join(", "))
        }
    }
}
