//! Types for reading archives
//!

use std::{
    fs::File,
    io::{BufReader, Read, Seek},
    path::Path,
};

use tracing::{debug, instrument};

use crate::{
    cache::{CacheRecord, EntryCache},
    catalog::ArchiveCatalog,
    compression::{BlockCodec, Compression, EntryReader, ZlibBlock},
    error::{Error, Result},
    types::ArchiveEntry,
};

/// Result of extracting a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// Decoded entry data, exactly `uncompressed_size` bytes
    pub data: Vec<u8>,

    /// How the data was stored
    pub compression: Compression,

    /// Uncatalogued bytes read from in front of the entry
    pub pre_data: Option<Vec<u8>>,
}

impl ExtractedEntry {
    /// Copy what extraction learned about the entry back onto it
    pub fn apply_to(&self, entry: &mut ArchiveEntry) {
        entry.compression = self.compression;
        if self.pre_data.is_some() {
            entry.pre_data.clone_from(&self.pre_data);
        }
    }

    /// Build the cache record describing this extraction
    pub fn cache_record(&self, entry: &ArchiveEntry) -> CacheRecord {
        CacheRecord {
            id: entry.id,
            version: entry.version,
            compression: self.compression,
            pre_data: self.pre_data.clone(),
        }
    }
}

/// Archive reader
///
/// The reader owns its content archives. To keep using a content archive after the reader is
/// gone, hand in `&mut File` (or any other borrowed `Read + Seek`) instead of the file itself, or
/// take them back with [`ArchiveReader::into_inner`].
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn dump_archive(index: impl Read, content: impl Read + Seek) -> csystem_arc::error::Result<()> {
///     let mut archive = csystem_arc::ArchiveReader::new(index, vec![content])?;
///     let entries: Vec<_> = archive.entries().cloned().collect();
///
///     for entry in entries {
///         let extracted = archive.extract(&entry)?;
///         println!("{}{}: {} bytes", entry.kind, entry.index, extracted.data.len());
///     }
///
///     Ok(())
/// }
/// ```
pub struct ArchiveReader<R> {
    catalog: ArchiveCatalog,
    contents: Vec<R>,
}

impl ArchiveReader<File> {
    /// Open an index file and the content archives it refers to
    #[instrument(skip_all, err)]
    pub fn open(
        index: impl AsRef<Path>,
        contents: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Result<ArchiveReader<File>> {
        let files = contents
            .into_iter()
            .map(|p| File::open(p.as_ref()))
            .collect::<std::io::Result<Vec<_>>>()?;

        ArchiveReader::new(File::open(index.as_ref())?, files)
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Read a block coded index and catalog its entries.
    pub fn new(index: impl Read, contents: Vec<R>) -> Result<ArchiveReader<R>> {
        Self::with_codec(index, contents, &ZlibBlock::default())
    }

    /// Read an index compressed with a specific block codec.
    pub fn with_codec(
        index: impl Read,
        contents: Vec<R>,
        codec: &impl BlockCodec,
    ) -> Result<ArchiveReader<R>> {
        let mut index = BufReader::new(index);
        let data = codec.decompress(&mut index)?;
        let catalog = ArchiveCatalog::read(&data)?;
        debug!(entries = catalog.len(), "read archive index");

        Ok(ArchiveReader { catalog, contents })
    }

    /// The catalogued entries
    pub fn catalog(&self) -> &ArchiveCatalog {
        &self.catalog
    }

    /// Mutable access to the catalogued entries
    pub fn catalog_mut(&mut self) -> &mut ArchiveCatalog {
        &mut self.catalog
    }

    /// Number of entries contained in the archive
    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    /// Whether the archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Returns an iterator over all entries, grouped by type
    pub fn entries(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.catalog.entries()
    }

    /// Get an entry by its type tag and position within that type
    pub fn get_entry(&self, kind: char, index: usize) -> Result<&ArchiveEntry> {
        self.catalog.get(kind, index)
    }

    /// Extract the data of an entry
    pub fn extract(&mut self, entry: &ArchiveEntry) -> Result<ExtractedEntry> {
        read_entry(&mut self.contents, entry)
    }

    /// Extract a catalogued entry, memoizing what was learned onto the catalog
    pub fn extract_at(&mut self, kind: char, index: usize) -> Result<ExtractedEntry> {
        let entry = self.catalog.get_mut(kind, index)?;
        let extracted = read_entry(&mut self.contents, entry)?;
        extracted.apply_to(entry);
        Ok(extracted)
    }

    /// Extract the data of an entry and append the outcome to `cache`
    pub fn extract_into(
        &mut self,
        entry: &ArchiveEntry,
        cache: &mut EntryCache,
    ) -> Result<ExtractedEntry> {
        let extracted = self.extract(entry)?;
        cache.record(extracted.cache_record(entry));
        Ok(extracted)
    }

    /// Unwrap and return the content archives
    ///
    /// The position of the readers is undefined.
    pub fn into_inner(self) -> Vec<R> {
        self.contents
    }
}

#[instrument(skip_all, err, fields(id = entry.id, kind = %entry.kind, index = entry.index))]
fn read_entry<R: Read + Seek>(contents: &mut [R], entry: &ArchiveEntry) -> Result<ExtractedEntry> {
    let content = contents
        .get_mut(entry.content_archive)
        .ok_or(Error::MissingContentArchive(entry.content_archive))?;

    let pre_data = match entry.pre_data_len() {
        0 => None,
        len => {
            let start = entry.offset.checked_sub(len).ok_or(Error::PreDataBeforeStart {
                id: entry.id,
                offset: entry.offset,
                len,
            })?;
            let mut pre = vec![0u8; len as usize];
            let mut reader = EntryReader::new(&mut *content, start, len, Compression::Raw)?;
            let read = reader.fill(&mut pre)?;
            if read < pre.len() {
                return Err(Error::InsufficientSourceBytes {
                    id: entry.id,
                    expected: len,
                    actual: read as u64,
                });
            }
            Some(pre)
        }
    };

    let compression = if entry.compressed_size == entry.uncompressed_size {
        Compression::Raw
    } else {
        Compression::Window
    };

    let mut data = vec![0u8; entry.uncompressed_size as usize];
    let mut reader = EntryReader::new(content, entry.offset, entry.compressed_size, compression)?;
    let read = reader.fill(&mut data)?;
    if read < data.len() {
        return Err(Error::InsufficientSourceBytes {
            id: entry.id,
            expected: entry.uncompressed_size,
            actual: read as u64,
        });
    }

    debug!(?compression, size = data.len(), "extracted entry");
    Ok(ExtractedEntry {
        data,
        compression,
        pre_data,
    })
}
