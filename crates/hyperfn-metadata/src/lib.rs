//! hyperfn manifest pipeline.
//!
//! Takes the signatures and type table of one build and turns them into:
//! - human-readable signature text ([`stringify`])
//! - a [`Manifest`] with build identity and VCS provenance ([`manifest`], [`provenance`])
//! - a custom section inside the compiled module ([`embed`])
//! - a plain or markdown report ([`report`])

pub mod embed;
pub mod error;
pub mod manifest;
pub mod provenance;
pub mod report;
pub mod stringify;

pub use embed::{embed, read_manifest, EmbedSummary, SECTION_NAME};
pub use error::{EmbedError, EmbedResult};
pub use manifest::{library_identity, Manifest};
pub use provenance::{normalize_remote, GitProvenance, Provenance, StaticProvenance, VcsInfo};
pub use report::{write_report, ReportFormat, ReportOptions};
pub use stringify::{signature_to_string, type_to_string, NoRecords, RecordLookup, INTERNAL_PREFIX};
