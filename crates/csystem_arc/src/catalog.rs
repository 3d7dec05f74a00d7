//! Catalog of the entries described by an archive index

use std::io::Cursor;

use binrw::BinRead;
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{ArchiveEntry, IndexRecord},
};

/// Entries of an archive grouped by their type tag.
///
/// Groups keep the order in which their type tag was first seen, entries within a group keep
/// index order and carry their position in [`ArchiveEntry::index`].
#[derive(Debug, Default, Clone)]
pub struct ArchiveCatalog {
    groups: IndexMap<char, Vec<ArchiveEntry>>,
    cursor: u64,
}

impl ArchiveCatalog {
    /// Parse an already decompressed index into a catalog
    #[instrument(skip_all, err, fields(size = index.len()))]
    pub fn read(index: &[u8]) -> Result<ArchiveCatalog> {
        let mut catalog = ArchiveCatalog::default();
        let mut reader = Cursor::new(index);
        while (reader.position() as usize) < index.len() {
            let record = IndexRecord::read(&mut reader)?;
            catalog.push(record.into())?;
        }
        Ok(catalog)
    }

    /// Build a catalog from entries that have already been decoded, in index order
    pub fn from_entries(entries: impl IntoIterator<Item = ArchiveEntry>) -> Result<ArchiveCatalog> {
        let mut catalog = ArchiveCatalog::default();
        for entry in entries {
            catalog.push(entry)?;
        }
        Ok(catalog)
    }

    fn push(&mut self, mut entry: ArchiveEntry) -> Result<()> {
        // ids are not required to be increasing, only offsets are
        if entry.offset > self.cursor {
            let gap = entry.offset - self.cursor;
            debug!(id = entry.id, gap, "uncatalogued bytes before entry");
            entry.gap = gap;
        } else if entry.offset < self.cursor {
            return Err(Error::OffsetRegression {
                id: entry.id,
                offset: entry.offset,
                cursor: self.cursor,
            });
        }
        self.cursor = entry.end();

        let group = self.groups.entry(entry.kind).or_default();
        entry.index = group.len();
        debug!(id = entry.id, kind = %entry.kind, index = entry.index, "catalogued entry");
        group.push(entry);
        Ok(())
    }

    /// Number of entries across all types
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Whether the catalog contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type tags present in the catalog, in the order they were first seen
    pub fn kinds(&self) -> impl Iterator<Item = char> + '_ {
        self.groups.keys().copied()
    }

    /// All entries, grouped by type
    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.groups.values().flatten()
    }

    /// All entries sharing a type tag
    pub fn entries_of(&self, kind: char) -> &[ArchiveEntry] {
        self.groups
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Get an entry by its type tag and position within that type
    pub fn get(&self, kind: char, index: usize) -> Result<&ArchiveEntry> {
        self.groups
            .get(&kind)
            .and_then(|g| g.get(index))
            .ok_or(Error::EntryNotFound { kind, index })
    }

    /// Mutable access to an entry, for applying extraction results or cache data
    pub fn get_mut(&mut self, kind: char, index: usize) -> Result<&mut ArchiveEntry> {
        self.groups
            .get_mut(&kind)
            .and_then(|g| g.get_mut(index))
            .ok_or(Error::EntryNotFound { kind, index })
    }

    /// Mutable access to all entries
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut ArchiveEntry> {
        self.groups.values_mut().flatten()
    }
}
