//! Error types for bundle creation and extraction.
//!
//! Errors fall into two groups: plain I/O failures (unreadable source,
//! unwritable destination) and format failures that mean the bundle itself
//! cannot be trusted. [`BundleError::is_format_error`] tells them apart so
//! callers can report "incompatible version" differently from "disk error".

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundle operations
pub type Result<T> = std::result::Result<T, BundleError>;

/// Main error type for all bundle operations
#[derive(Error, Debug)]
pub enum BundleError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A source entry could not be read while walking the input tree
    #[error("Cannot read source entry: {0}")]
    Walk(#[from] walkdir::Error),

    /// Source path that cannot be stored as a UTF-8 entry path
    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    /// File too short to hold the trailer or the manifest it points at
    #[error("Bundle is truncated: {len} bytes, at least {needed} required")]
    Truncated {
        /// Actual file length
        len: u64,
        /// Minimum length implied by the trailer
        needed: u64,
    },

    /// Manifest could not be encoded or decoded
    #[error("Invalid manifest: {0}")]
    Manifest(#[from] bincode::Error),

    /// Manifest written by an incompatible version of the format
    #[error("Incompatible bundle version {found} (supported: {expected})")]
    VersionMismatch {
        /// Version stored in the manifest
        found: u32,
        /// Version this build reads and writes
        expected: u32,
    },

    /// Entry payload range reaches past the body region
    #[error(
        "Entry {path} at offset {offset} with {size} bytes exceeds bundle body of {body_len} bytes"
    )]
    EntryOutOfBounds {
        path: String,
        offset: u64,
        size: u64,
        body_len: u64,
    },

    /// Entry path that would resolve outside the extraction root
    #[error("Unsafe entry path: {path}")]
    UnsafePath { path: String },

    /// Two entries share the same path
    #[error("Duplicate entry path: {path}")]
    DuplicatePath { path: String },

    /// Entry that would have to be created inside a file entry
    #[error("Entry {path} is placed under file entry {file}")]
    PathConflict { path: String, file: String },

    /// Directory entry claiming stored bytes
    #[error("Directory entry {path} has {size} stored bytes")]
    DirectoryWithPayload { path: String, size: u64 },

    /// Stored payload could not be decoded
    #[error("Failed to decompress {path}: {source}")]
    Decompress {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl BundleError {
    /// Whether the error means the bundle contents are invalid, as opposed to
    /// a failure of the underlying storage.
    pub fn is_format_error(&self) -> bool {
        !matches!(
            self,
            BundleError::Io(_) | BundleError::Walk(_) | BundleError::NonUtf8Path(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_errors_are_distinguished_from_io() {
        let io = BundleError::Io(std::io::Error::other("disk"));
        assert!(!io.is_format_error());

        let version = BundleError::VersionMismatch {
            found: 1,
            expected: 2,
        };
        assert!(version.is_format_error());
        assert_eq!(
            version.to_string(),
            "Incompatible bundle version 1 (supported: 2)"
        );

        let truncated = BundleError::Truncated { len: 3, needed: 8 };
        assert!(truncated.is_format_error());
    }
}
