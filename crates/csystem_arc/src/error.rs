//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent wrapper for [`quick_xml::Error`]
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),

    /// an entry starts before the end of the entry preceding it
    #[error("entry {id} starts at {offset} which is before the end of the previous entry at {cursor}")]
    #[diagnostic(help("the index is corrupt or entries overlap"))]
    OffsetRegression {
        /// Id of the offending entry
        id: i32,
        /// Offset the entry claims
        offset: u64,
        /// End of the previously catalogued entry
        cursor: u64,
    },

    /// a content archive ended before an entry could be read completely
    #[error("entry {id} needs {expected} bytes but the content archive only had {actual}")]
    InsufficientSourceBytes {
        /// Id of the entry being extracted
        id: i32,
        /// Number of bytes that were requested
        expected: u64,
        /// Number of bytes that were available
        actual: u64,
    },

    /// the bytes in front of an entry would start before the content archive does
    #[error("entry {id} at {offset} cannot have {len} bytes in front of it")]
    #[diagnostic(help("the cached pre data may belong to a different archive"))]
    PreDataBeforeStart {
        /// Id of the entry being extracted
        id: i32,
        /// Offset of the entry
        offset: u64,
        /// Length of the pre data
        len: u64,
    },

    /// the entry refers to a content archive which has not been supplied
    #[error("content archive {0} is not available")]
    MissingContentArchive(usize),

    /// unable to find requested entry
    #[error("no entry of type '{kind}' at index {index}")]
    EntryNotFound {
        /// Type tag that was requested
        kind: char,
        /// Position within the type group
        index: usize,
    },

    /// hex text has an odd number of digits
    #[error("hex string must have an even number of digits")]
    OddHexLength,

    /// hex text contains a character which is not a hex digit
    #[error("invalid hex digit in {0:?}")]
    InvalidHexDigit(String),

    /// a length prefix could not be decoded
    #[error("invalid length prefix: {0}")]
    InvalidLength(String),

    /// a cache record is missing a field or has a malformed one
    #[error("invalid cache entry: {0}")]
    InvalidCacheEntry(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
