//! # file-bundler
//!
//! Packs files and directories into a single bundle file and extracts them
//! again.
//!
//! A bundle stores the entry payloads back to back, followed by a
//! bincode-encoded manifest and an 8-byte little-endian trailer giving the
//! manifest length. Readers start from the end of the file, so the manifest
//! can be listed without touching any payload.
//!
//! ## Features
//!
//! - Recursive bundling of any number of files and directories
//! - Per-bundle compression: none, LZ4 (fast) or zstd (better ratio)
//! - Strict validation on read: version gate, trailer and offset bounds,
//!   path traversal rejection
//! - Selective extraction with glob patterns
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use file_bundler::{
//!     BundleExtractor, BundleOptions, CompressionMethod, EntryFilter, create_bundle,
//! };
//!
//! fn main() -> file_bundler::Result<()> {
//!     let options = BundleOptions::with_compression(CompressionMethod::Zstd);
//!     create_bundle(&["assets"], Path::new("assets.bundle"), options)?;
//!
//!     let extractor = BundleExtractor::open(Path::new("assets.bundle"))?;
//!     for entry in extractor.list_files() {
//!         println!("{} ({} bytes)", entry.path, entry.original_size);
//!     }
//!     extractor.extract_all(Path::new("restored"), &EntryFilter::default())?;
//!
//!     Ok(())
//! }
//! ```

pub mod bundle;
pub mod cli;
pub mod error;
pub mod filter;
pub mod io;

pub use bundle::{
    ARCHIVE_VERSION, ArchiveManifest, BundleExtractor, BundleOptions, BundleSummary, BundleWriter,
    CompressionMethod, ExtractSummary, FileEntry, create_bundle, extract_bundle,
};
pub use cli::Cli;
pub use error::{BundleError, Result};
pub use filter::EntryFilter;
pub use io::{LocalFileReader, ReadAt};
