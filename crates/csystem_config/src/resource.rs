//! Binary config resources
//!

use std::{
    fmt,
    io::{BufRead, BufReader, Read, Write},
};

use csystem_arc::{BcdLength, BlockCodec, LengthCodec, ZlibBlock};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    items,
};

/// Upper bound on the number of items any known schema uses
pub const MAX_ITEMS: usize = 10;

/// Number of optional data blocks following the items
pub const MAX_DATA_BLOCKS: usize = 4;

/// Selects which items and data blocks use which encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion(pub u32);

impl SchemaVersion {
    /// Dictionary in item 1
    pub const V23: SchemaVersion = SchemaVersion(23);

    /// Dictionary moved to the first data block
    pub const V24: SchemaVersion = SchemaVersion(24);

    /// Last item index still holding text
    pub fn last_text_item(self) -> usize {
        if self == Self::V24 {
            6
        } else {
            5
        }
    }

    /// Whether item 1 holds the dictionary
    pub fn has_dictionary_item(self) -> bool {
        self != Self::V24
    }

    /// Whether data block 0 holds a fixed-stride dictionary
    pub fn has_dictionary_data(self) -> bool {
        self == Self::V24
    }

    /// Whether the layout of this version is known
    pub fn is_known(self) -> bool {
        self == Self::V23 || self == Self::V24
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::V23
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SchemaVersion {
    fn from(value: u32) -> Self {
        SchemaVersion(value)
    }
}

/// Contents of a config resource
///
/// A resource is a compressed block holding the packed items (see [`crate::items`]), followed by
/// up to [`MAX_DATA_BLOCKS`] length prefixed data blocks. Absent blocks are simply not stored, so
/// only trailing blocks can be missing from a file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigResource {
    /// Layout used to interpret the items
    pub version: SchemaVersion,

    /// Items, with sentinel and terminator removed
    pub items: Vec<Vec<u8>>,

    /// Optional data blocks
    pub data: [Option<Vec<u8>>; MAX_DATA_BLOCKS],
}

impl ConfigResource {
    /// Read a zlib coded resource
    pub fn read(reader: impl Read, version: SchemaVersion) -> Result<ConfigResource> {
        Self::read_with(reader, version, &ZlibBlock::default(), &BcdLength)
    }

    /// Read a resource using specific codecs
    #[instrument(skip_all, err, fields(%version))]
    pub fn read_with(
        reader: impl Read,
        version: SchemaVersion,
        codec: &impl BlockCodec,
        lengths: &impl LengthCodec,
    ) -> Result<ConfigResource> {
        let mut reader = BufReader::new(reader);
        let packed = codec.decompress(&mut reader)?;
        let items = items::unpack(&packed)?;
        debug!(items = items.len(), "unpacked items");

        let mut data: [Option<Vec<u8>>; MAX_DATA_BLOCKS] = Default::default();
        for (index, slot) in data.iter_mut().enumerate() {
            if reader.fill_buf()?.is_empty() {
                break;
            }

            let expected = lengths.read_length(&mut reader)? as usize;
            let mut block = Vec::with_capacity(expected);
            (&mut reader).take(expected as u64).read_to_end(&mut block)?;
            if block.len() < expected {
                return Err(Error::TruncatedDataBlock { index, expected });
            }
            debug!(index, size = block.len(), "read data block");
            *slot = Some(block);
        }

        if !reader.fill_buf()?.is_empty() {
            return Err(Error::TrailingData);
        }

        Ok(ConfigResource {
            version,
            items,
            data,
        })
    }

    /// Write the resource zlib coded
    pub fn write(&self, writer: &mut impl Write) -> Result<()> {
        self.write_with(writer, &ZlibBlock::default(), &BcdLength)
    }

    /// Write the resource using specific codecs
    #[instrument(skip_all, err)]
    pub fn write_with(
        &self,
        writer: &mut impl Write,
        codec: &impl BlockCodec,
        lengths: &impl LengthCodec,
    ) -> Result<()> {
        codec.compress(&items::pack(&self.items)?, writer)?;

        for block in self.data.iter().flatten() {
            let length = u32::try_from(block.len()).map_err(|_| Error::ItemTooLarge(block.len()))?;
            lengths.write_length(writer, length)?;
            writer.write_all(block)?;
        }
        Ok(())
    }

    /// Write the resource zlib coded into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}
