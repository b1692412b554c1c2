//! Low-level bundle parser.
//!
//! Bundles are read from the end:
//! 1. Read the 8-byte trailer to learn the manifest length
//! 2. Read and decode the manifest that sits right before the trailer
//! 3. Check the format version
//! 4. Validate every entry against the body region before any payload is
//!    touched
//!
//! Only after all of that succeeds is the manifest handed to the
//! [`BundleExtractor`](super::BundleExtractor).

use std::collections::{HashMap, HashSet};

use crate::error::{BundleError, Result};
use crate::io::ReadAt;

use super::path::sanitize_entry_path;
use super::structures::{ArchiveManifest, FileEntry, Trailer};

/// A manifest that passed every structural check
#[derive(Debug, Clone)]
pub struct ValidatedManifest {
    pub manifest: ArchiveManifest,
    /// Length of the payload region at the start of the bundle
    pub body_len: u64,
}

/// Low-level bundle parser, generic over the data source.
pub struct BundleParser<R: ReadAt> {
    /// The underlying data source
    reader: R,
    /// Total size of the bundle in bytes
    size: u64,
}

impl<R: ReadAt> BundleParser<R> {
    pub fn new(reader: R) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Read the trailer at the end of the bundle.
    ///
    /// # Errors
    ///
    /// [`BundleError::Truncated`] if the file is shorter than the trailer.
    pub fn read_trailer(&self) -> Result<Trailer> {
        if self.size < Trailer::SIZE as u64 {
            return Err(BundleError::Truncated {
                len: self.size,
                needed: Trailer::SIZE as u64,
            });
        }

        let mut buf = [0u8; Trailer::SIZE];
        self.reader
            .read_exact_at(self.size - Trailer::SIZE as u64, &mut buf)?;
        Trailer::from_bytes(&buf)
    }

    /// Read, decode and version-check the manifest.
    ///
    /// Returns the manifest together with the length of the body region
    /// that precedes it.
    pub fn read_manifest(&self) -> Result<(ArchiveManifest, u64)> {
        let trailer = self.read_trailer()?;
        let body_len = trailer.body_len(self.size)?;

        // bounded by the file length through body_len above
        let mut data = vec![0u8; trailer.manifest_size as usize];
        self.reader.read_exact_at(body_len, &mut data)?;

        let manifest = ArchiveManifest::from_bytes(&data)?;
        manifest.check_version()?;

        Ok((manifest, body_len))
    }

    /// Read the manifest and check every entry against the bundle.
    pub fn parse(&self) -> Result<ValidatedManifest> {
        let (manifest, body_len) = self.read_manifest()?;
        validate_entries(&manifest.entries, body_len)?;
        Ok(ValidatedManifest { manifest, body_len })
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Check entries for unsafe or duplicate paths, payload-carrying
/// directories, and payload ranges that leave `[0, body_len)`.
///
/// Paths are compared after normalization, so `a.txt` and `./a.txt` count
/// as the same entry. An entry placed below a file entry (`a` and `a/b`) is
/// a [`BundleError::PathConflict`].
pub fn validate_entries(entries: &[FileEntry], body_len: u64) -> Result<()> {
    let mut resolved = Vec::with_capacity(entries.len());
    let mut seen = HashSet::with_capacity(entries.len());
    let mut files = HashMap::new();

    for entry in entries {
        let path = sanitize_entry_path(&entry.path)?;

        if !seen.insert(path.clone()) {
            return Err(BundleError::DuplicatePath {
                path: entry.path.clone(),
            });
        }

        if entry.is_directory {
            if entry.size != 0 {
                return Err(BundleError::DirectoryWithPayload {
                    path: entry.path.clone(),
                    size: entry.size,
                });
            }
        } else {
            match entry.end_offset() {
                Some(end) if end <= body_len => {}
                _ => {
                    return Err(BundleError::EntryOutOfBounds {
                        path: entry.path.clone(),
                        offset: entry.offset,
                        size: entry.size,
                        body_len,
                    });
                }
            }
            files.insert(path.clone(), entry.path.as_str());
        }

        resolved.push((entry, path));
    }

    for (entry, path) in &resolved {
        if let Some(file) = path.ancestors().skip(1).find_map(|a| files.get(a)) {
            return Err(BundleError::PathConflict {
                path: entry.path.clone(),
                file: file.to_string(),
            });
        }
    }

    Ok(())
}
