//! Random access reading for bundle files.
//!
//! A bundle is read from the end: trailer first, then the manifest, then each
//! payload at its recorded offset. [`ReadAt`] captures that access pattern so
//! the parser never depends on a shared cursor position.

mod local;
mod range;

pub use local::LocalFileReader;
pub use range::RangeReader;

use std::io;

/// Trait for random access reading from a data source
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill the whole buffer from `offset`, failing with `UnexpectedEof` if
    /// the source ends first.
    fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "failed to fill whole buffer",
                    ));
                }
                Ok(n) => {
                    let rest = buf;
                    buf = &mut rest[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// In-memory bundles, mostly useful for tests and tooling.
impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_exact_at_reports_eof() {
        let data = b"hello".to_vec();

        let mut buf = [0u8; 3];
        data.read_exact_at(2, &mut buf).unwrap();
        assert_eq!(&buf, b"llo");

        let mut buf = [0u8; 4];
        let err = data.read_exact_at(2, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_read_past_end_returns_zero() {
        let data = b"abc".to_vec();
        let mut buf = [0u8; 2];
        assert_eq!(data.read_at(10, &mut buf).unwrap(), 0);
        assert_eq!(data.size(), 3);
    }
}
