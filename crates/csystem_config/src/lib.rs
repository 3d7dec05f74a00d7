//! # Config Resource Format Documentation
//!
//! This crate reads and writes the config resources of games built on the *C,system* engine, and
//! converts them to and from a descriptive XML tree that can be edited by hand.
//!
//! ## File Structure
//!
//! | Field       | Description                                                              |
//! |-------------|--------------------------------------------------------------------------|
//! | Items       | Compressed block holding the packed item list (see [`items`])            |
//! | Data 1..4   | Optional, each prefixed with a binary coded decimal length               |
//!
//! Nothing may follow the fourth data block.
//!
//! ### Items
//!
//! Each item is one of:
//!
//! - **Text**: UTF-16LE string
//! - **Dictionary**: keys mapped to small integers (see [`dict`])
//! - **Binary**: anything else
//!
//! Which item holds what depends on the [`SchemaVersion`]:
//!
//! | Item     | Version 23   | Version 24   |
//! |----------|--------------|--------------|
//! | 0        | Text         | Text         |
//! | 1        | Dictionary   | Text         |
//! | 2..=5    | Text         | Text         |
//! | 6        | Binary       | Text         |
//! | 7..      | Binary       | Binary       |
//!
//! ### Data blocks
//!
//! Under version 24 the first data block holds a fixed-stride dictionary (see [`stride`]). Other
//! blocks whose size is a multiple of four are lists of little endian `i32`s.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod dict;
pub mod error;
pub mod items;
pub mod resource;
pub mod stride;
pub mod text;
pub mod tree;
pub mod xml;

pub use dict::{DictEntry, DictionaryMapping};
pub use resource::{ConfigResource, SchemaVersion};
pub use tree::{ConfigNode, ConfigTree};
