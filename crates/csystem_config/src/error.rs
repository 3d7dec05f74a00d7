//! Error types that can be emitted from this library
//!

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`csystem_arc::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    ArchiveError(#[from] csystem_arc::error::Error),

    /// Transparent wrapper for [`quick_xml::Error`]
    #[error(transparent)]
    XmlError(#[from] quick_xml::Error),

    /// Transparent wrapper for [`widestring::error::Utf16Error`]
    #[error(transparent)]
    UTF16Error(#[from] widestring::error::Utf16Error),

    /// More items than any known schema uses
    #[error("unexpected number of items: {0}")]
    UnexpectedItemCount(usize),

    /// An item's payload is shorter than its length prefix claims
    #[error("item {index} needs {expected} bytes but only {actual} remain")]
    TruncatedItem {
        /// Position of the item
        index: usize,
        /// Length claimed by the prefix
        expected: usize,
        /// Bytes left in the packed data
        actual: usize,
    },

    /// An item is too large to be given a length prefix
    #[error("item of {0} bytes is too large to pack")]
    ItemTooLarge(usize),

    /// A data block is shorter than its length prefix claims
    #[error("data block {index} needs {expected} bytes but the resource ended early")]
    TruncatedDataBlock {
        /// Position of the data block
        index: usize,
        /// Length claimed by the prefix
        expected: usize,
    },

    /// Bytes remain after the last data block
    #[error("unexpected data after the last data block")]
    TrailingData,

    /// A dictionary item does not begin with `#`
    #[error("dictionary item does not start with '#'")]
    MissingDictionaryMarker,

    /// A dictionary value run has no terminator
    #[error("dictionary value is not terminated")]
    UnterminatedDictionaryValue,

    /// A UTF-16 code unit is cut off by the end of the data
    #[error("truncated UTF-16 code unit at offset {0}")]
    TruncatedCodeUnit(usize),

    /// Dictionary values can't be less than -1
    #[error("dictionary value {0} is less than -1")]
    DictionaryValueOutOfRange(i32),

    /// A fixed-stride dictionary holds a different number of entries than it declares
    #[error("fixed-stride dictionary declares {declared} entries but holds {actual}")]
    FixedStrideCountMismatch {
        /// Count stored in the header
        declared: u32,
        /// Entries actually decoded
        actual: usize,
    },

    /// A key does not fit the fixed-stride key slot
    #[error("key {0:?} does not fit in a 16 byte slot")]
    FixedStrideKeyTooLong(String),

    /// A fixed-stride dictionary ends in the middle of an entry or header
    #[error("fixed-stride dictionary is truncated")]
    TruncatedFixedStride,

    /// The tree's root element is not `csystem`
    #[error("invalid root element name: {0}")]
    InvalidRoot(String),

    /// A required element is missing from the tree
    #[error("<{0}> element missing")]
    MissingElement(String),

    /// A required attribute is missing from an element
    #[error("<{element}> is missing the {attribute} attribute")]
    MissingAttribute {
        /// Element name
        element: String,
        /// Attribute name
        attribute: String,
    },

    /// A node's type attribute is absent or not one of the known types
    #[error("unrecognized type {0:?}")]
    UnrecognizedType(String),

    /// Element text that should be an integer is not
    #[error("invalid integer {0:?}")]
    InvalidInteger(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
