use std::io::{self, Read};

use super::ReadAt;

/// Sequential [`Read`] view over the byte range `[offset, offset + len)` of
/// a [`ReadAt`] source.
///
/// Reaching the end of the underlying source before the range is exhausted
/// is an `UnexpectedEof` error, not a short read.
pub struct RangeReader<'a, R: ReadAt + ?Sized> {
    reader: &'a R,
    pos: u64,
    end: u64,
}

impl<'a, R: ReadAt + ?Sized> RangeReader<'a, R> {
    pub fn new(reader: &'a R, offset: u64, len: u64) -> Self {
        Self {
            reader,
            pos: offset,
            end: offset.saturating_add(len),
        }
    }

    /// Bytes left in the range
    pub fn remaining(&self) -> u64 {
        self.end - self.pos
    }
}

impl<R: ReadAt + ?Sized> Read for RangeReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining();
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let want = (buf.len() as u64).min(remaining) as usize;
        let n = self.reader.read_at(self.pos, &mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "entry payload ends past the end of the bundle",
            ));
        }

        self.pos += n as u64;
        Ok(n)
    }
}
