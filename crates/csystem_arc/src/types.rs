//! Base types for the structure of the archive index.

use binrw::{BinRead, BinWrite};
use bon::Builder;

use crate::compression::Compression;

/// Archive index record
///
/// Fixed 24 byte little endian record describing a single entry. The index is a block coded
/// sequence of these records with nothing in between.
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct IndexRecord {
    /// Identity of the entry
    pub id: i32,

    /// Version of the entry, zero or negative when unknown
    pub version: i32,

    /// Offset of the entry's data from the start of its content archive
    pub offset: u32,

    /// Size of the entry's data in the content archive
    pub compressed_size: u32,

    /// Size of the entry's data once decoded
    pub uncompressed_size: u32,

    /// ASCII type tag the entry is grouped by
    pub kind: u8,

    /// Which content archive holds the data
    #[brw(pad_after = 2)]
    pub content_archive: u8,
}

/// A catalogued entry of the archive.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ArchiveEntry {
    /// Identity of the entry
    pub id: i32,

    /// Type tag the entry is grouped by
    pub kind: char,

    /// Position within the group of entries sharing the same type tag
    #[builder(default)]
    pub index: usize,

    /// Offset of the entry's data from the start of its content archive
    pub offset: u64,

    /// Size of the entry's data in the content archive
    pub compressed_size: u64,

    /// Size of the entry's data once decoded
    pub uncompressed_size: u64,

    /// Which content archive holds the data
    #[builder(default)]
    pub content_archive: usize,

    /// Version of the entry, zero or negative when unknown
    #[builder(default)]
    pub version: i32,

    /// Length of the uncatalogued gap the catalog found in front of this entry
    #[builder(default)]
    pub gap: u64,

    /// Uncatalogued bytes sitting directly in front of this entry, once captured by extraction
    /// or restored from the cache
    pub pre_data: Option<Vec<u8>>,

    /// How the data is stored, known once the entry has been extracted or backfilled
    #[builder(default)]
    pub compression: Compression,
}

impl ArchiveEntry {
    /// Offset just past the end of this entry's data
    pub fn end(&self) -> u64 {
        self.offset + self.compressed_size
    }

    /// Length of the bytes in front of this entry, from the captured pre data if there is any
    pub fn pre_data_len(&self) -> u64 {
        self.pre_data.as_ref().map_or(self.gap, |p| p.len() as u64)
    }

    /// Whether the archive stored a usable version for this entry
    pub fn has_version(&self) -> bool {
        self.version > 0
    }
}

impl From<IndexRecord> for ArchiveEntry {
    fn from(record: IndexRecord) -> Self {
        ArchiveEntry::builder()
            .id(record.id)
            .kind(char::from(record.kind))
            .offset(record.offset as u64)
            .compressed_size(record.compressed_size as u64)
            .uncompressed_size(record.uncompressed_size as u64)
            .content_archive(record.content_archive as usize)
            .version(record.version)
            .build()
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;

    use crate::compression::Compression;
    use crate::error::Result;
    use crate::types::{ArchiveEntry, IndexRecord};

    #[test]
    fn read_record() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x07, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0x24, 0x00, 0x00, 0x00,
            0x0B, 0x00, 0x00, 0x00,
            0x10, 0x00, 0x00, 0x00,
            0x62, 0x01, 0x00, 0x00,
        ]);

        let expected = IndexRecord {
            id: 7,
            version: 2,
            offset: 36,
            compressed_size: 11,
            uncompressed_size: 16,
            kind: b'b',
            content_archive: 1,
        };

        assert_eq!(IndexRecord::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn write_record() -> Result<()> {
        #[rustfmt::skip]
        let expected = vec![
            0xFF, 0xFF, 0xFF, 0xFF,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x0A, 0x00, 0x00, 0x00,
            0x0A, 0x00, 0x00, 0x00,
            0x61, 0x00, 0x00, 0x00,
        ];

        let record = IndexRecord {
            id: -1,
            compressed_size: 10,
            uncompressed_size: 10,
            kind: b'a',
            ..Default::default()
        };

        let mut actual = Vec::new();
        record.write(&mut Cursor::new(&mut actual))?;

        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn entry_from_record() {
        let record = IndexRecord {
            id: 3,
            version: -1,
            offset: 20,
            compressed_size: 5,
            uncompressed_size: 9,
            kind: b'x',
            content_archive: 2,
        };

        let entry = ArchiveEntry::from(record);
        assert_eq!(entry.kind, 'x');
        assert_eq!(entry.end(), 25);
        assert_eq!(entry.content_archive, 2);
        assert_eq!(entry.compression, Compression::Unknown);
        assert_eq!(entry.pre_data_len(), 0);
        assert!(!entry.has_version());
    }

    #[test]
    fn captured_pre_data_overrides_gap() {
        let mut entry = ArchiveEntry::builder()
            .id(1)
            .kind('a')
            .offset(8)
            .compressed_size(1)
            .uncompressed_size(1)
            .gap(3)
            .build();
        assert_eq!(entry.pre_data_len(), 3);

        entry.pre_data = Some(vec![1, 2]);
        assert_eq!(entry.pre_data_len(), 2);
    }
}
