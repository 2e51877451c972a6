//! Attaching the manifest to a compiled module as a custom section.
//!
//! The module is re-emitted section by section: every section other than
//! the manifest section is copied byte-for-byte in its original order. An
//! existing manifest section is replaced in place, otherwise the new one is
//! appended. The result is validated with `wasmparser`.

use std::borrow::Cow;

use sha2::{Digest, Sha256};
use tracing::info;
use wasm_encoder::{CustomSection, Module, RawSection};
use wasmparser::{Encoding, Parser, Payload};

use crate::error::{EmbedError, EmbedResult};
use crate::manifest::Manifest;

/// Default custom section name.
pub const SECTION_NAME: &str = "hypermode_meta";

/// What [`embed`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSummary {
    pub section: String,
    pub payload_len: usize,
    /// Lowercase hex SHA-256 of the payload.
    pub sha256: String,
    /// Whether an existing section of the same name was replaced.
    pub replaced: bool,
}

/// Write `manifest` into the custom section `section` of `wasm`.
///
/// Returns the new module bytes. The same manifest and input give the same
/// bytes.
pub fn embed(
    wasm: &[u8],
    manifest: &Manifest,
    section: &str,
) -> EmbedResult<(Vec<u8>, EmbedSummary)> {
    if section.is_empty() {
        return Err(EmbedError::InvalidSectionName(section.to_string()));
    }
    let data = manifest.to_json()?;
    let custom = CustomSection {
        name: Cow::Borrowed(section),
        data: Cow::Borrowed(&data),
    };

    let mut module = Module::new();
    let mut replaced = false;
    for payload in Parser::new(0).parse_all(wasm) {
        let payload = payload.map_err(|e| EmbedError::InvalidModule(e.to_string()))?;
        match &payload {
            Payload::Version { encoding, .. } if *encoding != Encoding::Module => {
                return Err(EmbedError::InvalidModule(
                    "components are not supported".to_string(),
                ));
            }
            Payload::CustomSection(reader) if reader.name() == section => {
                // Keep only the first occurrence, rewritten.
                if !replaced {
                    module.section(&custom);
                    replaced = true;
                }
                continue;
            }
            _ => {}
        }
        if let Some((id, range)) = payload.as_section() {
            module.section(&RawSection {
                id,
                data: &wasm[range],
            });
        }
    }
    if !replaced {
        module.section(&custom);
    }

    let bytes = module.finish();
    wasmparser::validate(&bytes).map_err(|e| EmbedError::ValidationFailed {
        section: section.to_string(),
        reason: e.to_string(),
    })?;

    let summary = EmbedSummary {
        section: section.to_string(),
        payload_len: data.len(),
        sha256: format!("{:x}", Sha256::digest(&data)),
        replaced,
    };
    info!(
        "Embedded manifest in section '{}': {} bytes, sha256 {}",
        summary.section, summary.payload_len, summary.sha256
    );
    Ok((bytes, summary))
}

/// Decode the manifest stored in custom section `section`, if present.
pub fn read_manifest(wasm: &[u8], section: &str) -> EmbedResult<Option<Manifest>> {
    for payload in Parser::new(0).parse_all(wasm) {
        let payload = payload.map_err(|e| EmbedError::InvalidModule(e.to_string()))?;
        if let Payload::CustomSection(reader) = payload {
            if reader.name() == section {
                return Ok(Some(Manifest::from_json(reader.data())?));
            }
        }
    }
    Ok(None)
}
