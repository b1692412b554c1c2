//! Bundle creation.
//!
//! Payloads are streamed straight into the output in walk order. The stored
//! length of each entry is taken from the output stream position before and
//! after it was written, never from what the compressor reports.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{BundleError, Result};

use super::codec::{self, DEFAULT_ZSTD_LEVEL};
use super::path::to_entry_path;
use super::structures::{ArchiveManifest, CompressionMethod, FileEntry, Trailer};

/// Settings chosen once per bundle
#[derive(Debug, Clone, Copy)]
pub struct BundleOptions {
    pub compression: CompressionMethod,
    /// Only used with [`CompressionMethod::Zstd`]
    pub zstd_level: i32,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            compression: CompressionMethod::None,
            zstd_level: DEFAULT_ZSTD_LEVEL,
        }
    }
}

impl BundleOptions {
    pub fn with_compression(compression: CompressionMethod) -> Self {
        Self {
            compression,
            ..Self::default()
        }
    }
}

/// Totals for a finished bundle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSummary {
    pub files: usize,
    pub directories: usize,
    /// Sum of `original_size` over all files
    pub original_bytes: u64,
    /// Sum of stored payload bytes
    pub stored_bytes: u64,
    pub manifest_bytes: u64,
}

impl BundleSummary {
    /// Total size of the bundle on disk
    pub fn bundle_bytes(&self) -> u64 {
        self.stored_bytes + self.manifest_bytes + Trailer::SIZE as u64
    }
}

/// Streaming bundle writer.
///
/// Entries are appended with [`add_path`](Self::add_path) (filesystem walk)
/// or the lower level [`add_file`](Self::add_file) and
/// [`add_directory`](Self::add_directory). Nothing is valid until
/// [`finish`](Self::finish) writes the manifest and trailer.
pub struct BundleWriter<W: Write + Seek> {
    writer: W,
    options: BundleOptions,
    entries: Vec<FileEntry>,
    seen: HashSet<String>,
    summary: BundleSummary,
    /// Canonical path of a file the walk must not pick up (the bundle itself)
    excluded: Option<PathBuf>,
}

impl BundleWriter<BufWriter<File>> {
    /// Create (or truncate) the bundle file at `path`.
    pub fn create(path: &Path, options: BundleOptions) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = Self::new(BufWriter::new(file), options);
        writer.exclude_path(path)?;
        Ok(writer)
    }
}

impl<W: Write + Seek> BundleWriter<W> {
    pub fn new(writer: W, options: BundleOptions) -> Self {
        Self {
            writer,
            options,
            entries: Vec::new(),
            seen: HashSet::new(),
            summary: BundleSummary::default(),
            excluded: None,
        }
    }

    /// Never bundle the existing file at `path`, even when a walk reaches it.
    ///
    /// [`create`](Self::create) sets this to the output file, so bundling a
    /// directory into a file inside it does not read the growing bundle.
    pub fn exclude_path(&mut self, path: &Path) -> Result<()> {
        self.excluded = Some(std::fs::canonicalize(path)?);
        Ok(())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let Some(excluded) = &self.excluded else {
            return false;
        };
        if path.file_name() != excluded.file_name() {
            return false;
        }
        std::fs::canonicalize(path).is_ok_and(|p| &p == excluded)
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Walk `root` and add everything under it.
    ///
    /// A directory root contributes its contents with paths relative to the
    /// root (the root itself is not an entry). A file root is stored under
    /// its file name.
    pub fn add_path(&mut self, root: &Path) -> Result<()> {
        let metadata = std::fs::metadata(root)?;

        if metadata.is_file() {
            if self.is_excluded(root) {
                log::warn!("Skipping {} (it is the bundle being written)", root.display());
                return Ok(());
            }
            let name = root
                .file_name()
                .ok_or_else(|| BundleError::UnsafePath {
                    path: root.display().to_string(),
                })?;
            let path = to_entry_path(Path::new(name))?;
            let file = File::open(root)?;
            return self.add_file(path, metadata.len(), file);
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| BundleError::UnsafePath {
                    path: entry.path().display().to_string(),
                })?;
            let path = to_entry_path(relative)?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                self.add_directory(path)?;
            } else if file_type.is_file() {
                if self.is_excluded(entry.path()) {
                    log::warn!(
                        "Skipping {} (it is the bundle being written)",
                        entry.path().display()
                    );
                    continue;
                }
                let original_size = entry.metadata()?.len();
                let file = File::open(entry.path())?;
                self.add_file(path, original_size, file)?;
            } else {
                log::warn!(
                    "Skipping {} (not a regular file or directory)",
                    entry.path().display()
                );
            }
        }

        Ok(())
    }

    /// Record a directory entry. No bytes are written.
    pub fn add_directory(&mut self, path: String) -> Result<()> {
        self.claim_path(&path)?;
        let offset = self.writer.stream_position()?;

        log::debug!("dir  {}", path);
        self.entries.push(FileEntry::directory(path, offset));
        self.summary.directories += 1;
        Ok(())
    }

    /// Stream `source` into the bundle as a file entry.
    ///
    /// `original_size` is recorded as given; it is expected to come from the
    /// source's filesystem metadata.
    pub fn add_file<R: Read>(&mut self, path: String, original_size: u64, source: R) -> Result<()> {
        self.claim_path(&path)?;
        let method = self.options.compression;

        let offset = self.writer.stream_position()?;
        let consumed = codec::encode(method, self.options.zstd_level, source, &mut self.writer)?;
        let size = self.writer.stream_position()? - offset;

        if consumed != original_size {
            log::warn!(
                "{} changed while bundling: expected {} bytes, read {}",
                path,
                original_size,
                consumed
            );
        }
        log::debug!("file {} ({} -> {} bytes, {})", path, original_size, size, method);

        self.entries.push(FileEntry {
            path,
            size,
            original_size,
            offset,
            is_directory: false,
            compression_method: method,
        });
        self.summary.files += 1;
        self.summary.original_bytes += original_size;
        self.summary.stored_bytes += size;
        Ok(())
    }

    /// Write the manifest and trailer, flush, and hand back the writer.
    pub fn finish(mut self) -> Result<(W, BundleSummary)> {
        let manifest = ArchiveManifest::new(self.entries);
        let manifest_bytes = manifest.to_bytes()?;
        let manifest_size = manifest_bytes.len() as u64;

        self.writer.write_all(&manifest_bytes)?;
        Trailer { manifest_size }.write_to(&mut self.writer)?;
        self.writer.flush()?;

        self.summary.manifest_bytes = manifest_size;
        Ok((self.writer, self.summary))
    }

    fn claim_path(&mut self, path: &str) -> Result<()> {
        if !self.seen.insert(path.to_string()) {
            return Err(BundleError::DuplicatePath {
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Bundle every path in `inputs` into a new file at `output`.
pub fn create_bundle<P: AsRef<Path>>(
    inputs: &[P],
    output: &Path,
    options: BundleOptions,
) -> Result<BundleSummary> {
    let mut writer = BundleWriter::create(output, options)?;
    for input in inputs {
        writer.add_path(input.as_ref())?;
    }
    let (_, summary) = writer.finish()?;
    Ok(summary)
}
