use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{BundleError, Result};
use crate::filter::EntryFilter;
use crate::io::{LocalFileReader, RangeReader, ReadAt};

use super::codec;
use super::parser::{BundleParser, ValidatedManifest};
use super::path::resolve_under;
use super::structures::FileEntry;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Totals for a finished extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub bytes_written: u64,
}

/// Bundle extractor.
///
/// Construction reads and validates the whole manifest, so every later call
/// works on entries already known to be in bounds and safe to place under a
/// destination root.
pub struct BundleExtractor<R: ReadAt> {
    parser: BundleParser<R>,
    manifest: ValidatedManifest,
}

impl BundleExtractor<LocalFileReader> {
    pub fn open(path: &Path) -> Result<Self> {
        Self::new(LocalFileReader::new(path)?)
    }
}

impl<R: ReadAt> BundleExtractor<R> {
    pub fn new(reader: R) -> Result<Self> {
        let parser = BundleParser::new(reader);
        let manifest = parser.parse()?;
        Ok(Self { parser, manifest })
    }

    /// List all entries in manifest order
    pub fn list_files(&self) -> &[FileEntry] {
        &self.manifest.manifest.entries
    }

    pub fn manifest(&self) -> &ValidatedManifest {
        &self.manifest
    }

    /// Decode one entry into `dest`, returning the decoded length.
    pub fn extract_to_writer<W: Write>(&self, entry: &FileEntry, dest: W) -> Result<u64> {
        if entry.is_directory {
            return Ok(0);
        }

        let payload = BufReader::with_capacity(
            READ_BUFFER_SIZE,
            RangeReader::new(self.parser.reader(), entry.offset, entry.size),
        );

        let mut dest = WriteTracker { inner: dest, failed: false };
        let written = match codec::decode(entry.compression_method, payload, &mut dest) {
            Ok(n) => n,
            Err(e) if dest.failed => return Err(e.into()),
            Err(source) => {
                return Err(BundleError::Decompress {
                    path: entry.path.clone(),
                    source,
                });
            }
        };

        if written != entry.original_size {
            log::warn!(
                "{}: decoded {} bytes, manifest records {}",
                entry.path,
                written,
                entry.original_size
            );
        }

        Ok(written)
    }

    /// Extract file data to memory
    pub fn extract_to_memory(&self, entry: &FileEntry) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(entry.original_size.min(READ_BUFFER_SIZE as u64) as usize);
        self.extract_to_writer(entry, &mut buf)?;
        Ok(buf)
    }

    /// Extract one entry below `root`, creating parent directories as needed.
    pub fn extract_entry(&self, entry: &FileEntry, root: &Path) -> Result<u64> {
        let dest_path = resolve_under(root, &entry.path)?;

        if entry.is_directory {
            fs::create_dir_all(&dest_path)?;
            return Ok(0);
        }

        if let Some(parent) = dest_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = BufWriter::new(File::create(&dest_path)?);
        let written = self.extract_to_writer(entry, &mut file)?;
        file.flush()?;

        Ok(written)
    }

    /// Extract every entry selected by `filter` into `root`.
    ///
    /// `root` is created if absent. The first failing entry aborts the
    /// extraction; files already written are left in place.
    pub fn extract_all(&self, root: &Path, filter: &EntryFilter) -> Result<ExtractSummary> {
        self.extract_all_with(root, filter, |_| {})
    }

    /// Like [`extract_all`](Self::extract_all), calling `on_entry` right
    /// before each selected entry is written.
    pub fn extract_all_with<F>(
        &self,
        root: &Path,
        filter: &EntryFilter,
        mut on_entry: F,
    ) -> Result<ExtractSummary>
    where
        F: FnMut(&FileEntry),
    {
        fs::create_dir_all(root)?;

        let mut summary = ExtractSummary::default();
        for entry in self.list_files().iter().filter(|e| filter.matches(e)) {
            log::debug!("extracting {}", entry.path);
            on_entry(entry);
            let written = self.extract_entry(entry, root)?;

            if entry.is_directory {
                summary.directories += 1;
            } else {
                summary.files += 1;
                summary.bytes_written += written;
            }
        }

        Ok(summary)
    }
}

/// Remembers whether an error came from the destination rather than the
/// decoder, so disk failures are not reported as corrupt payloads.
struct WriteTracker<W> {
    inner: W,
    failed: bool,
}

impl<W: Write> Write for WriteTracker<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf).inspect_err(|_| self.failed = true)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush().inspect_err(|_| self.failed = true)
    }
}

/// Extract the whole bundle at `bundle` into `output_dir`.
pub fn extract_bundle(bundle: &Path, output_dir: &Path) -> Result<ExtractSummary> {
    BundleExtractor::open(bundle)?.extract_all(output_dir, &EntryFilter::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BundleOptions, BundleWriter, CompressionMethod};
    use std::io::Cursor;

    fn build(options: BundleOptions) -> Vec<u8> {
        let mut writer = BundleWriter::new(Cursor::new(Vec::new()), options);
        writer.add_file("a.txt".into(), 5, &b"hello"[..]).unwrap();
        writer.add_directory("dir".into()).unwrap();
        writer.add_file("dir/b.txt".into(), 5, &b"world"[..]).unwrap();
        writer.finish().unwrap().0.into_inner()
    }

    #[test]
    fn test_extract_to_memory_for_each_method() {
        for method in [CompressionMethod::None, CompressionMethod::Lz4, CompressionMethod::Zstd] {
            let bytes = build(BundleOptions::with_compression(method));
            let extractor = BundleExtractor::new(bytes).unwrap();
            let entries = extractor.list_files();
            assert_eq!(entries.len(), 3);

            assert_eq!(extractor.extract_to_memory(&entries[0]).unwrap(), b"hello");
            assert!(extractor.extract_to_memory(&entries[1]).unwrap().is_empty());
            assert_eq!(extractor.extract_to_memory(&entries[2]).unwrap(), b"world");
        }
    }

    #[test]
    fn test_dispatch_follows_each_entry() {
        // splice a zstd payload into an otherwise uncompressed bundle
        let mut zstd_payload = Vec::new();
        codec::encode(CompressionMethod::Zstd, 3, &b"mixed"[..], &mut zstd_payload).unwrap();

        let mut writer = BundleWriter::new(Cursor::new(Vec::new()), BundleOptions::default());
        writer.add_file("plain".into(), 5, &b"plain"[..]).unwrap();
        writer
            .add_file("packed".into(), zstd_payload.len() as u64, &zstd_payload[..])
            .unwrap();
        let (cursor, _) = writer.finish().unwrap();
        let mut bytes = cursor.into_inner();

        let parser = BundleParser::new(bytes.clone());
        let (mut manifest, body_len) = parser.read_manifest().unwrap();
        manifest.entries[1].compression_method = CompressionMethod::Zstd;
        manifest.entries[1].original_size = 5;
        let manifest_bytes = manifest.to_bytes().unwrap();
        bytes.truncate(body_len as usize);
        bytes.extend_from_slice(&manifest_bytes);
        bytes.extend_from_slice(&(manifest_bytes.len() as u64).to_le_bytes());

        let extractor = BundleExtractor::new(bytes).unwrap();
        let entries = extractor.list_files();
        assert_eq!(extractor.extract_to_memory(&entries[0]).unwrap(), b"plain");
        assert_eq!(extractor.extract_to_memory(&entries[1]).unwrap(), b"mixed");
    }

    #[test]
    fn test_corrupt_payload_is_a_decompress_error() {
        let mut bytes = build(BundleOptions::with_compression(CompressionMethod::Lz4));
        // lz4 frame magic of the first payload
        bytes[0] ^= 0xFF;

        let extractor = BundleExtractor::new(bytes).unwrap();
        let err = extractor.extract_to_memory(&extractor.list_files()[0]).unwrap_err();
        assert!(matches!(err, BundleError::Decompress { ref path, .. } if path == "a.txt"));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_extract_all_with_filter() {
        let extractor = BundleExtractor::new(build(BundleOptions::default())).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let filter = EntryFilter::new(vec!["b.txt".into()], Vec::new());
        let summary = extractor.extract_all(dir.path(), &filter).unwrap();

        assert_eq!(summary.files, 1);
        assert_eq!(summary.directories, 0);
        assert_eq!(fs::read(dir.path().join("dir").join("b.txt")).unwrap(), b"world");
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_extract_all_reports_each_entry() {
        let extractor = BundleExtractor::new(build(BundleOptions::default())).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut seen = Vec::new();
        let summary = extractor
            .extract_all_with(dir.path(), &EntryFilter::default(), |e| seen.push(e.path.clone()))
            .unwrap();

        assert_eq!(seen, ["a.txt", "dir", "dir/b.txt"]);
        assert_eq!(
            summary,
            ExtractSummary {
                files: 2,
                directories: 1,
                bytes_written: 10,
            }
        );
    }
}
