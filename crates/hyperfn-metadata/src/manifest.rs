//! The per-build manifest.

use chrono::{SecondsFormat, Utc};
use hyperfn_types::signature::{FunctionSignature, TypeDefinition};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::provenance::{Provenance, VcsInfo};

/// `hyperfn@<version>` of this library.
pub fn library_identity() -> String {
    format!("hyperfn@{}", env!("CARGO_PKG_VERSION"))
}

/// Public surface of one compiled module plus build identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub build_id: String,
    /// RFC 3339 UTC timestamp with millisecond precision.
    pub build_ts: String,
    /// `name@version` of the plugin being built.
    pub plugin: String,
    pub library: String,
    /// Serialized as `gitRepo` / `gitCommit`, both or neither.
    #[serde(flatten)]
    pub vcs: Option<VcsInfo>,
    pub functions: Vec<FunctionSignature>,
    pub types: Vec<TypeDefinition>,
}

impl Manifest {
    /// A manifest with a fresh build id and the current time.
    pub fn generate(plugin: impl Into<String>, provenance: &dyn Provenance) -> Self {
        Self {
            build_id: Uuid::new_v4().to_string(),
            build_ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            plugin: plugin.into(),
            library: library_identity(),
            vcs: provenance.vcs(),
            functions: Vec::new(),
            types: Vec::new(),
        }
    }

    /// Append signatures in the order given.
    pub fn add_functions(&mut self, functions: impl IntoIterator<Item = FunctionSignature>) {
        self.functions.extend(functions);
    }

    /// Append type definitions in the order given.
    pub fn add_types(&mut self, types: impl IntoIterator<Item = TypeDefinition>) {
        self.types.extend(types);
    }

    /// Types shown in reports.
    pub fn visible_types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter().filter(|t| !t.is_hidden())
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_json(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::StaticProvenance;
    use chrono::DateTime;
    use hyperfn_types::signature::TypeRef;

    fn sig(name: &str) -> FunctionSignature {
        FunctionSignature {
            name: name.into(),
            parameters: vec![],
            return_type: TypeRef::new("void", "void"),
        }
    }

    #[test]
    fn generate_sets_identity_and_time() {
        let m = Manifest::generate("my-plugin@1.0.0", &StaticProvenance::none());
        assert_eq!(m.plugin, "my-plugin@1.0.0");
        assert!(m.library.starts_with("hyperfn@"));
        assert!(Uuid::parse_str(&m.build_id).is_ok());
        assert!(DateTime::parse_from_rfc3339(&m.build_ts).is_ok());
        assert!(m.build_ts.ends_with('Z'));
        // yyyy-mm-ddThh:mm:ss.mmmZ
        assert_eq!(m.build_ts.len(), 24);
    }

    #[test]
    fn every_build_gets_a_new_id() {
        let a = Manifest::generate("p@1", &StaticProvenance::none());
        let b = Manifest::generate("p@1", &StaticProvenance::none());
        assert_ne!(a.build_id, b.build_id);
    }

    #[test]
    fn vcs_fields_are_both_present_or_both_absent() {
        let without = Manifest::generate("p@1", &StaticProvenance::none());
        let json = serde_json::to_value(&without).unwrap();
        assert!(json.get("gitRepo").is_none());
        assert!(json.get("gitCommit").is_none());

        let with = Manifest::generate("p@1", &StaticProvenance::new("https://github.com/o/r", "abc"));
        let json = serde_json::to_value(&with).unwrap();
        assert_eq!(json["gitRepo"], "https://github.com/o/r");
        assert_eq!(json["gitCommit"], "abc");

        let back = Manifest::from_json(&with.to_json().unwrap()).unwrap();
        assert_eq!(back, with);
        let back = Manifest::from_json(&without.to_json().unwrap()).unwrap();
        assert_eq!(back.vcs, None);
    }

    #[test]
    fn contributions_are_appended_in_order() {
        let mut m = Manifest::generate("p@1", &StaticProvenance::none());
        m.add_functions([sig("b"), sig("a")]);
        m.add_functions([sig("c")]);
        let names: Vec<_> = m.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn json_keys_are_camel_case() {
        let m = Manifest::generate("p@1", &StaticProvenance::none());
        let json = serde_json::to_value(&m).unwrap();
        for key in ["buildId", "buildTs", "plugin", "library", "functions", "types"] {
            assert!(json.get(key).is_some(), "{key}");
        }
    }
}
