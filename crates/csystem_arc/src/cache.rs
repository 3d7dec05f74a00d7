//! Cross-session memory of what extraction learned about entries.
//!
//! Some facts about an entry, such as whether its payload was LZSS coded or which bytes sat in
//! an uncatalogued gap in front of it, are only known after extraction. The cache keeps those
//! facts in an XML sidecar so later runs can restore them without touching the archive:
//!
//! ```xml
//! <Cache>
//!   <EntryList>
//!     <Entry Id="12" Version="3" IsCompressed="1">
//!       <PreData>00 01 02</PreData>
//!     </Entry>
//!   </EntryList>
//! </Cache>
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};
use tracing::{info, instrument};

use crate::{
    compression::Compression,
    error::{Error, Result},
    hex::{from_hex, to_hex},
    types::ArchiveEntry,
};

/// File name of the sidecar inside the cache directory
pub const CACHE_FILE_NAME: &str = "cache.xml";

/// What is remembered about a single extracted entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    /// Id of the entry
    pub id: i32,
    /// Version of the entry at the time it was extracted
    pub version: i32,
    /// How the entry's data was stored
    pub compression: Compression,
    /// Uncatalogued bytes in front of the entry
    pub pre_data: Option<Vec<u8>>,
}

impl From<&ArchiveEntry> for CacheRecord {
    fn from(entry: &ArchiveEntry) -> Self {
        CacheRecord {
            id: entry.id,
            version: entry.version,
            compression: entry.compression,
            pre_data: entry.pre_data.clone(),
        }
    }
}

/// Append-only list of [`CacheRecord`]s.
///
/// Recording the same id twice keeps both records, and lookups always return the first one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryCache {
    records: Vec<CacheRecord>,
}

impl EntryCache {
    /// Number of records, duplicates included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in the order they were recorded
    pub fn records(&self) -> &[CacheRecord] {
        &self.records
    }

    /// Append a record
    pub fn record(&mut self, record: impl Into<CacheRecord>) {
        self.records.push(record.into());
    }

    /// First record for an id
    pub fn lookup(&self, id: i32) -> Option<&CacheRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Restore remembered facts onto an entry.
    ///
    /// A version already known to the entry is never overwritten. Without a record the entry's
    /// compression becomes [`Compression::Unknown`].
    pub fn backfill(&self, entry: &mut ArchiveEntry) {
        let Some(record) = self.lookup(entry.id) else {
            entry.compression = Compression::Unknown;
            return;
        };

        entry.compression = record.compression;
        if !entry.has_version() {
            entry.version = record.version;
        }
        if let Some(pre_data) = record.pre_data.as_ref().filter(|p| !p.is_empty()) {
            entry.pre_data = Some(pre_data.clone());
        }
    }

    /// Load the sidecar from `dir`, or start empty if there is none
    #[instrument(skip_all, err, fields(dir = %dir.as_ref().display()))]
    pub fn load(dir: impl AsRef<Path>) -> Result<EntryCache> {
        let path = dir.as_ref().join(CACHE_FILE_NAME);
        if !path.is_file() {
            return Ok(EntryCache::default());
        }

        let cache = Self::from_xml(&fs::read_to_string(&path)?)?;
        info!("loaded {} cache records from {}", cache.len(), path.display());
        Ok(cache)
    }

    /// Save the sidecar into `dir`, returning the path written
    #[instrument(skip_all, err, fields(dir = %dir.as_ref().display()))]
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(CACHE_FILE_NAME);
        fs::write(&path, self.to_xml()?)?;
        info!("saved {} cache records to {}", self.len(), path.display());
        Ok(path)
    }

    /// Render the records as sidecar XML
    pub fn to_xml(&self) -> Result<String> {
        let mut output = Vec::new();
        let mut writer = Writer::new_with_indent(&mut output, b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("Cache")))?;
        writer.write_event(Event::Start(BytesStart::new("EntryList")))?;

        for record in &self.records {
            let mut elem = BytesStart::new("Entry");
            elem.push_attribute(("Id", record.id.to_string().as_str()));
            elem.push_attribute(("Version", record.version.to_string().as_str()));
            elem.push_attribute((
                "IsCompressed",
                record.compression.as_flag().to_string().as_str(),
            ));

            match &record.pre_data {
                Some(pre_data) => {
                    writer.write_event(Event::Start(elem))?;
                    writer.write_event(Event::Start(BytesStart::new("PreData")))?;
                    writer.write_event(Event::Text(BytesText::new(&to_hex(pre_data))))?;
                    writer.write_event(Event::End(BytesEnd::new("PreData")))?;
                    writer.write_event(Event::End(BytesEnd::new("Entry")))?;
                }
                None => writer.write_event(Event::Empty(elem))?,
            }
        }

        writer.write_event(Event::End(BytesEnd::new("EntryList")))?;
        writer.write_event(Event::End(BytesEnd::new("Cache")))?;

        let mut xml = String::from_utf8_lossy(&output).into_owned();
        xml.push('\n');
        Ok(xml)
    }

    /// Parse sidecar XML
    pub fn from_xml(content: &str) -> Result<EntryCache> {
        let mut reader = Reader::from_str(content);
        reader.trim_text(true);

        let mut records = Vec::new();
        let mut in_pre_data = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == b"Entry" => {
                    records.push(parse_entry(&e)?);
                }
                Event::Empty(e) if e.name().as_ref() == b"Entry" => {
                    records.push(parse_entry(&e)?);
                }
                Event::Start(e) if e.name().as_ref() == b"PreData" => in_pre_data = true,
                Event::End(e) if e.name().as_ref() == b"PreData" => in_pre_data = false,
                Event::Text(e) if in_pre_data => {
                    let text = e.unescape()?;
                    let record = records.last_mut().ok_or_else(|| {
                        Error::InvalidCacheEntry("PreData outside of an Entry".into())
                    })?;
                    if !text.is_empty() {
                        record.pre_data = Some(from_hex(&text)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(EntryCache { records })
    }
}

fn parse_entry(e: &BytesStart) -> Result<CacheRecord> {
    Ok(CacheRecord {
        id: parse_attribute(e, "Id")?,
        version: parse_attribute(e, "Version")?,
        compression: Compression::from(parse_attribute::<i32>(e, "IsCompressed")?),
        pre_data: None,
    })
}

fn parse_attribute<T: FromStr>(e: &BytesStart, name: &str) -> Result<T> {
    let attr = e
        .try_get_attribute(name)
        .map_err(quick_xml::Error::from)?
        .ok_or_else(|| Error::InvalidCacheEntry(format!("missing attribute {name}")))?;
    let value = attr.unescape_value()?;
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidCacheEntry(format!("{name}=\"{value}\"")))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{CacheRecord, EntryCache, CACHE_FILE_NAME};
    use crate::{
        compression::Compression,
        error::{Error, Result},
        types::ArchiveEntry,
    };

    fn entry(id: i32, version: i32) -> ArchiveEntry {
        ArchiveEntry::builder()
            .id(id)
            .kind('a')
            .offset(0)
            .compressed_size(1)
            .uncompressed_size(1)
            .version(version)
            .build()
    }

    fn record(id: i32, version: i32, compression: Compression) -> CacheRecord {
        CacheRecord {
            id,
            version,
            compression,
            pre_data: None,
        }
    }

    #[test]
    fn backfill_keeps_known_version() {
        let mut cache = EntryCache::default();
        cache.record(record(1, 9, Compression::Window));

        let mut known = entry(1, 4);
        cache.backfill(&mut known);
        assert_eq!(known.version, 4);
        assert_eq!(known.compression, Compression::Window);

        let mut unknown = entry(1, 0);
        cache.backfill(&mut unknown);
        assert_eq!(unknown.version, 9);
    }

    #[test]
    fn backfill_without_record() {
        let cache = EntryCache::default();
        let mut e = entry(1, 0);
        e.compression = Compression::Raw;
        cache.backfill(&mut e);
        assert_eq!(e.compression, Compression::Unknown);
        assert_eq!(e.version, 0);
    }

    #[test]
    fn backfill_restores_pre_data() {
        let mut cache = EntryCache::default();
        cache.record(CacheRecord {
            pre_data: Some(vec![1, 2, 3]),
            ..record(7, 1, Compression::Raw)
        });

        let mut e = entry(7, 1);
        cache.backfill(&mut e);
        assert_eq!(e.pre_data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn first_record_wins() {
        let mut cache = EntryCache::default();
        cache.record(record(1, 2, Compression::Raw));
        cache.record(record(1, 3, Compression::Window));

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.records().iter().map(|r| r.version).collect::<Vec<_>>(),
            vec![2, 3]
        );
        let mut e = entry(1, -1);
        cache.backfill(&mut e);
        assert_eq!(e.version, 2);
        assert_eq!(e.compression, Compression::Raw);
    }

    #[test]
    fn xml_round_trip() -> Result<()> {
        let mut cache = EntryCache::default();
        cache.record(record(1, 2, Compression::Raw));
        cache.record(CacheRecord {
            pre_data: Some(vec![0x00, 0xAB]),
            ..record(2, 0, Compression::Window)
        });
        cache.record(record(3, -1, Compression::Unknown));

        let xml = cache.to_xml()?;
        assert!(xml.contains(r#"<Entry Id="1" Version="2" IsCompressed="0"/>"#));
        assert!(xml.contains("<PreData>00 AB</PreData>"));

        assert_eq!(EntryCache::from_xml(&xml)?, cache);
        Ok(())
    }

    #[test]
    fn invalid_attribute() {
        let xml = r#"<Cache><EntryList><Entry Id="x" Version="1" IsCompressed="0"/></EntryList></Cache>"#;
        assert!(matches!(
            EntryCache::from_xml(xml),
            Err(Error::InvalidCacheEntry(_))
        ));
    }

    #[traced_test]
    #[test]
    fn save_and_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(EntryCache::load(dir.path())?.is_empty());

        let mut cache = EntryCache::default();
        cache.record(&entry(5, 6));
        let path = cache.save(dir.path())?;
        assert_eq!(path, dir.path().join(CACHE_FILE_NAME));

        assert_eq!(EntryCache::load(dir.path())?, cache);
        assert!(logs_contain("saved 1 cache records"));
        Ok(())
    }
}
