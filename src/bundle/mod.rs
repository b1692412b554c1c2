//! Bundle container format.
//!
//! A bundle is a single file holding any number of files and directories:
//!
//! ```text
//! [ payload 1 ][ payload 2 ] ... [ payload N ]
//! [ serialized manifest ]
//! [ u64 little-endian: manifest length ]
//! ```
//!
//! Payloads are concatenated without padding; only the manifest knows where
//! each one starts and ends. The manifest is bincode-encoded and carries a
//! format version that must match [`ARCHIVE_VERSION`] exactly.
//!
//! ## Architecture
//!
//! - [`structures`]: manifest model and trailer
//! - [`writer`]: walks input trees and streams payloads into a bundle
//! - [`parser`]: reads trailer and manifest from the end and validates them
//! - [`extractor`]: decodes payloads back to disk or memory
//! - [`codec`]: per-entry compression (none, LZ4 frame, zstd)
//! - [`path`]: entry path conversion and traversal checks

pub mod codec;
mod extractor;
mod parser;
pub mod path;
mod structures;
mod writer;

pub use extractor::{BundleExtractor, ExtractSummary, extract_bundle};
pub use parser::{BundleParser, ValidatedManifest, validate_entries};
pub use structures::*;
pub use writer::{BundleOptions, BundleSummary, BundleWriter, create_bundle};
