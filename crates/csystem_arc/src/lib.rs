//! This library handles reading the archives used by games built on the *C,system* engine.
//!
//! # Archive Format Documentation
//!
//! An archive is split over an **index** file and one or more **content** files. The index
//! catalogues the entries; the content files hold the entry payloads back to back, sometimes with
//! stretches of bytes in between that no entry claims.
//!
//! ## Index
//!
//! The index file is a single compressed block (see [`compression::BlockCodec`]). Once
//! decompressed it is a flat sequence of fixed size records and nothing else:
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Id                     | 4 bytes: Identity of the entry                             |
//! | 0x0004         | Version                | 4 bytes: Entry version, zero or negative when unknown      |
//! | 0x0008         | Offset                 | 4 bytes: Start of the payload in its content file          |
//! | 0x000C         | Compressed Size        | 4 bytes: Size of the payload in the content file           |
//! | 0x0010         | Uncompressed Size      | 4 bytes: Size of the payload once decoded                  |
//! | 0x0014         | Type                   | 1 byte: ASCII type tag                                     |
//! | 0x0015         | Content Archive        | 1 byte: Which content file holds the payload               |
//! | 0x0016         | Reserved               | 2 bytes                                                    |
//!
//! Entries are grouped by their type tag and numbered within each group in index order. Within
//! the index, each entry must start at or after the point where the previous one ended. Bytes
//! between the end of one entry and the start of the next are kept as the *pre data* of the later
//! entry so they can be reproduced when the archive is rebuilt.
//!
//! ## Payloads
//!
//! A payload whose compressed and uncompressed sizes match is stored as it is. Otherwise it is
//! LZSS coded (see [`compression::LzssReader`]).
//!
//! ## Cache
//!
//! Extraction learns things the index does not say. These are collected in an [`EntryCache`] and
//! persisted as `cache.xml` next to the extracted files.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod cache;
pub mod catalog;
pub mod compression;
pub mod error;
pub mod hex;
pub mod length;
pub mod read;
pub mod types;

pub use cache::{CacheRecord, EntryCache};
pub use catalog::ArchiveCatalog;
pub use compression::{BlockCodec, Compression, ZlibBlock};
pub use length::{BcdLength, Int32Length, LengthCodec};
pub use read::{ArchiveReader, ExtractedEntry};
pub use types::ArchiveEntry;
