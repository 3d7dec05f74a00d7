//! Block and window compression handling.
//!
//! The index and the packed strings of a config resource are stored as whole blocks
//! ([`BlockCodec`]); entry payloads are either stored raw or LZSS coded ([`LzssReader`]).

use std::io::{self, BufRead, Read, Seek, Write};

use byteorder::ReadBytesExt;
use flate2::{bufread::ZlibDecoder, write::ZlibEncoder, Compression as Level};
use tracing::instrument;

use crate::error::Result;

/// How an entry's data is stored inside its content archive
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Compression {
    /// Not known until the entry has been extracted
    #[default]
    Unknown,

    /// Stored as it is
    Raw,

    /// Stored LZSS coded
    Window,
}

impl Compression {
    /// Numeric flag as persisted in the cache sidecar
    pub fn as_flag(self) -> i32 {
        match self {
            Compression::Unknown => -1,
            Compression::Raw => 0,
            Compression::Window => 1,
        }
    }
}

impl From<i32> for Compression {
    fn from(value: i32) -> Self {
        match value {
            0 => Compression::Raw,
            1 => Compression::Window,
            _ => Compression::Unknown,
        }
    }
}

/// Codec for self delimiting compressed blocks
pub trait BlockCodec {
    /// Decompress exactly one block from `reader`, leaving anything after it unread
    fn decompress(&self, reader: &mut dyn BufRead) -> Result<Vec<u8>>;

    /// Compress `data` as one block into `writer`
    fn compress(&self, data: &[u8], writer: &mut dyn Write) -> Result<()>;
}

/// Zlib backed [`BlockCodec`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibBlock {
    level: Level,
}

impl ZlibBlock {
    /// Use a specific compression level when writing
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Level::new(level),
        }
    }
}

impl BlockCodec for ZlibBlock {
    #[instrument(skip_all, err)]
    fn decompress(&self, reader: &mut dyn BufRead) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(reader);
        let mut data = Vec::new();
        decoder.read_to_end(&mut data)?;
        Ok(data)
    }

    #[instrument(skip_all, err, fields(size = data.len()))]
    fn compress(&self, data: &[u8], writer: &mut dyn Write) -> Result<()> {
        let mut encoder = ZlibEncoder::new(writer, self.level);
        encoder.write_all(data)?;
        encoder.finish()?;
        Ok(())
    }
}

const RING_SIZE: usize = 4096;
const RING_MASK: usize = RING_SIZE - 1;
const MAX_MATCH: usize = 18;
const THRESHOLD: usize = 2;

/// Streaming LZSS decoder
///
/// Every flag byte governs the next eight tokens, lowest bit first. A set bit is a literal byte;
/// a clear bit is a two byte back reference into a 4 KiB ring buffer holding a 12 bit position
/// and a 4 bit length (plus three). The ring starts zeroed with the write cursor at `0xFEE`.
pub struct LzssReader<R> {
    inner: R,
    ring: Box<[u8; RING_SIZE]>,
    position: usize,
    flags: u16,
    copy_from: usize,
    pending: usize,
}

impl<R: Read> LzssReader<R> {
    /// Decode the LZSS stream provided by `inner`
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            ring: Box::new([0u8; RING_SIZE]),
            position: RING_SIZE - MAX_MATCH,
            flags: 0,
            copy_from: 0,
            pending: 0,
        }
    }

    /// Unwrap and return the inner reader
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        match self.inner.read_u8() {
            Ok(b) => Ok(Some(b)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn emit(&mut self, b: u8) {
        self.ring[self.position] = b;
        self.position = (self.position + 1) & RING_MASK;
    }
}

impl<R: Read> Read for LzssReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            if self.pending > 0 {
                let b = self.ring[self.copy_from];
                self.copy_from = (self.copy_from + 1) & RING_MASK;
                self.pending -= 1;
                self.emit(b);
                buf[written] = b;
                written += 1;
                continue;
            }

            self.flags >>= 1;
            if self.flags & 0x100 == 0 {
                let Some(flags) = self.next_byte()? else {
                    break;
                };
                self.flags = u16::from(flags) | 0xFF00;
            }

            if self.flags & 1 == 1 {
                let Some(b) = self.next_byte()? else {
                    break;
                };
                self.emit(b);
                buf[written] = b;
                written += 1;
            } else {
                let (Some(low), Some(high)) = (self.next_byte()?, self.next_byte()?) else {
                    break;
                };
                self.copy_from = usize::from(low) | (usize::from(high & 0xF0) << 4);
                self.pending = usize::from(high & 0x0F) + THRESHOLD + 1;
            }
        }
        Ok(written)
    }
}

/// Reader over the bytes of a single entry inside a content archive
pub(crate) enum EntryReader<'a, R: Read + Seek> {
    Raw(io::Take<&'a mut R>),
    Window(Box<LzssReader<io::Take<&'a mut R>>>),
}

impl<'a, R: Read + Seek> EntryReader<'a, R> {
    #[tracing::instrument(skip(reader))]
    pub fn new(reader: &'a mut R, start: u64, limit: u64, compression: Compression) -> Result<Self> {
        reader.seek(io::SeekFrom::Start(start))?;

        let limit_reader = reader.by_ref().take(limit);
        Ok(match compression {
            Compression::Window => EntryReader::Window(Box::new(LzssReader::new(limit_reader))),
            Compression::Raw | Compression::Unknown => EntryReader::Raw(limit_reader),
        })
    }

    /// Read until `buf` is full or the entry runs out, returning how much was filled
    pub fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0;
        while total < buf.len() {
            match self.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }
}

impl<R: Read + Seek> Read for EntryReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            EntryReader::Raw(r) => r.read(buf),
            EntryReader::Window(r) => r.read(buf),
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::{BufRead, Cursor, Read};

    use pretty_assertions::assert_eq;

    use super::{BlockCodec, Compression, LzssReader, ZlibBlock};
    use crate::error::Result;

    #[test]
    fn lzss_literals_only() -> Result<()> {
        let input = [0xFF, b'H', b'e', b'l', b'l', b'o', b'!', b'!', b'!'];
        let mut output = Vec::new();
        LzssReader::new(Cursor::new(input)).read_to_end(&mut output)?;
        assert_eq!(output, b"Hello!!!");
        Ok(())
    }

    #[test]
    fn lzss_overlapping_back_reference() -> Result<()> {
        // three literals, then six bytes copied from ring position 0xFEE
        let input = [0x07, b'A', b'B', b'C', 0xEE, 0xF3];
        let mut output = Vec::new();
        LzssReader::new(Cursor::new(input)).read_to_end(&mut output)?;
        assert_eq!(output, b"ABCABCABC");
        Ok(())
    }

    #[test]
    fn lzss_reference_into_zeroed_ring() -> Result<()> {
        let input = [0x00, 0x00, 0x00];
        let mut output = Vec::new();
        LzssReader::new(Cursor::new(input)).read_to_end(&mut output)?;
        assert_eq!(output, vec![0u8; 3]);
        Ok(())
    }

    #[test]
    fn lzss_small_reads() -> Result<()> {
        let input = [0x07, b'A', b'B', b'C', 0xEE, 0xF3];
        let mut reader = LzssReader::new(Cursor::new(input));
        let mut output = Vec::new();
        let mut chunk = [0u8; 2];
        loop {
            let n = reader.read(&mut chunk)?;
            if n == 0 {
                break;
            }
            output.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(output, b"ABCABCABC");
        assert_eq!(reader.into_inner().position(), 6);
        Ok(())
    }

    #[test]
    fn zlib_levels_read_back_alike() -> Result<()> {
        let data = b"abcabcabcabcabcabcabcabcabcabcabcabc".repeat(8);
        let mut stored = Vec::new();
        ZlibBlock::with_level(0).compress(&data, &mut stored)?;
        let mut best = Vec::new();
        ZlibBlock::with_level(9).compress(&data, &mut best)?;
        assert!(best.len() < stored.len());

        let codec = ZlibBlock::default();
        assert_eq!(codec.decompress(&mut Cursor::new(stored))?, data);
        assert_eq!(codec.decompress(&mut Cursor::new(best))?, data);
        Ok(())
    }

    #[test]
    fn zlib_block_leaves_trailing_bytes() -> Result<()> {
        let codec = ZlibBlock::default();
        let mut stream = Vec::new();
        codec.compress(b"index data", &mut stream)?;
        stream.extend_from_slice(b"tail");

        let mut reader = Cursor::new(stream);
        assert_eq!(codec.decompress(&mut reader)?, b"index data");
        assert_eq!(reader.fill_buf()?, b"tail");
        Ok(())
    }

    #[test]
    fn compression_flags() {
        assert_eq!(Compression::from(Compression::Raw.as_flag()), Compression::Raw);
        assert_eq!(Compression::from(Compression::Window.as_flag()), Compression::Window);
        assert_eq!(Compression::from(7), Compression::Unknown);
        assert_eq!(Compression::Unknown.as_flag(), -1);
    }
}
