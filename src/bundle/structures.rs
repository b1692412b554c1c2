use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Cursor, Write};

use crate::error::{BundleError, Result};

/// Format version written into every manifest and required on read.
///
/// Bumping this is the only way to make an incompatible format change.
pub const ARCHIVE_VERSION: u32 = 2;

/// Per-entry compression method
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    #[default]
    None,
    Lz4,
    Zstd,
}

impl CompressionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::None => "none",
            CompressionMethod::Lz4 => "lz4",
            CompressionMethod::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One file or directory stored in a bundle
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Relative path, components separated by `/`
    pub path: String,
    /// Bytes stored in the bundle (after compression)
    pub size: u64,
    /// Uncompressed length at bundling time
    pub original_size: u64,
    /// Absolute offset of the stored bytes
    pub offset: u64,
    pub is_directory: bool,
    pub compression_method: CompressionMethod,
}

impl FileEntry {
    pub fn directory(path: String, offset: u64) -> Self {
        Self {
            path,
            size: 0,
            original_size: 0,
            offset,
            is_directory: true,
            compression_method: CompressionMethod::None,
        }
    }

    /// End of the stored range, `None` on overflow.
    pub fn end_offset(&self) -> Option<u64> {
        self.offset.checked_add(self.size)
    }

    /// Percentage of space saved by compression, 0 for empty entries.
    pub fn savings_percent(&self) -> u64 {
        savings_percent(self.size, self.original_size)
    }
}

pub fn savings_percent(stored: u64, original: u64) -> u64 {
    if original == 0 || stored >= original {
        0
    } else {
        100 - stored * 100 / original
    }
}

/// Whole-bundle index, stored after the last payload
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArchiveManifest {
    pub entries: Vec<FileEntry>,
    pub version: u32,
}

impl ArchiveManifest {
    pub fn new(entries: Vec<FileEntry>) -> Self {
        Self {
            entries,
            version: ARCHIVE_VERSION,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(data)?)
    }

    /// Fail unless the manifest was written with [`ARCHIVE_VERSION`].
    pub fn check_version(&self) -> Result<()> {
        if self.version != ARCHIVE_VERSION {
            return Err(BundleError::VersionMismatch {
                found: self.version,
                expected: ARCHIVE_VERSION,
            });
        }
        Ok(())
    }
}

/// Fixed-size record at the very end of a bundle - 8 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailer {
    /// Length of the serialized manifest that precedes the trailer
    pub manifest_size: u64,
}

impl Trailer {
    pub const SIZE: usize = 8;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(BundleError::Truncated {
                len: data.len() as u64,
                needed: Self::SIZE as u64,
            });
        }

        let mut cursor = Cursor::new(data);
        Ok(Self {
            manifest_size: cursor.read_u64::<LittleEndian>()?,
        })
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u64::<LittleEndian>(self.manifest_size)?;
        Ok(())
    }

    /// Length of the payload region for a bundle of `file_len` bytes.
    ///
    /// Fails when the file cannot hold this trailer plus the manifest it
    /// points at.
    pub fn body_len(&self, file_len: u64) -> Result<u64> {
        let needed = self.manifest_size.saturating_add(Self::SIZE as u64);
        if file_len < needed {
            return Err(BundleError::Truncated {
                len: file_len,
                needed,
            });
        }
        Ok(file_len - needed)
    }
}
