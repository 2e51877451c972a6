//! Per-build rewrite state.

use std::collections::{BTreeMap, BTreeSet};

use hyperfn_types::signature::OptionalParamRecord;

/// State shared by the rewrite pass and the later metadata stages of one
/// build. Each build owns its own context; [`RewriteContext::reset`]
/// empties it before a new pass.
#[derive(Debug, Clone, Default)]
pub struct RewriteContext {
    required: BTreeSet<String>,
    /// Default records keyed by resolved function name.
    records: BTreeMap<String, Vec<OptionalParamRecord>>,
    /// Resolved names of processed functions, in source order.
    processed: Vec<String>,
}

impl RewriteContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything a previous pass recorded.
    pub fn reset(&mut self) {
        self.required.clear();
        self.records.clear();
        self.processed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.records.is_empty() && self.processed.is_empty()
    }

    pub(crate) fn require(&mut self, name: impl Into<String>) {
        self.required.insert(name.into());
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.required.iter().map(String::as_str)
    }

    /// Store the default records of one processed function. A later
    /// function with the same resolved name replaces the earlier entry.
    pub(crate) fn record(&mut self, name: &str, records: Vec<OptionalParamRecord>) {
        if !self.records.contains_key(name) {
            self.processed.push(name.to_string());
        }
        self.records.insert(name.to_string(), records);
    }

    /// Default records of a processed function; empty when it declared no
    /// defaults, `None` when it was not processed.
    pub fn records(&self, name: &str) -> Option<&[OptionalParamRecord]> {
        self.records.get(name).map(Vec::as_slice)
    }

    pub fn processed(&self) -> &[String] {
        &self.processed
    }
}
