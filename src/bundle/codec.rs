//! Compression strategy.
//!
//! The writer picks one method per bundle; the reader dispatches on the
//! method stored in each entry, so bundles mixing methods still decode.

use std::io::{self, Read, Write};

use super::structures::CompressionMethod;

/// Default zstd level, favoring ratio over the LZ4 path.
pub const DEFAULT_ZSTD_LEVEL: i32 = zstd::DEFAULT_COMPRESSION_LEVEL;

/// Stream `source` into `dest` using `method`.
///
/// Returns the number of uncompressed bytes consumed from `source`.
pub fn encode<R: Read, W: Write>(
    method: CompressionMethod,
    zstd_level: i32,
    source: R,
    dest: W,
) -> io::Result<u64> {
    let mut source = CountingReader::new(source);
    let mut dest = dest;

    match method {
        CompressionMethod::None => {
            io::copy(&mut source, &mut dest)?;
        }
        CompressionMethod::Lz4 => {
            let mut encoder = lz4_flex::frame::FrameEncoder::new(&mut dest);
            io::copy(&mut source, &mut encoder)?;
            encoder.finish().map_err(io::Error::other)?;
        }
        CompressionMethod::Zstd => {
            zstd::stream::copy_encode(&mut source, &mut dest, zstd_level)?;
        }
    }

    Ok(source.count)
}

/// Wrap `source` in the decoder for `method`.
pub fn decoder<'a, R: Read + 'a>(
    method: CompressionMethod,
    source: R,
) -> io::Result<Box<dyn Read + 'a>> {
    Ok(match method {
        CompressionMethod::None => Box::new(source),
        CompressionMethod::Lz4 => Box::new(lz4_flex::frame::FrameDecoder::new(source)),
        CompressionMethod::Zstd => Box::new(zstd::stream::read::Decoder::new(source)?),
    })
}

/// Decode everything from `source` into `dest`, returning the decoded length.
pub fn decode<R: Read, W: Write>(method: CompressionMethod, source: R, dest: W) -> io::Result<u64> {
    let mut dest = dest;
    let mut decoder = decoder(method, source)?;
    io::copy(&mut decoder, &mut dest)
}

struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R> CountingReader<R> {
    fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}
