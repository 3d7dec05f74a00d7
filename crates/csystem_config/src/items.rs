//! Framing of the item list stored in a config resource.
//!
//! Items are stored back to back, each behind a length prefix `L` describing an `L + 1` byte
//! payload. Payloads start with the sentinel `S` and may end with the terminator `FE 0A`; both are
//! stripped when unpacking. Packing always restores the sentinel but never the terminator, so
//! packing is only the exact inverse of unpacking for items without one.

use std::io::{Cursor, Read};

use csystem_arc::{Int32Length, LengthCodec};
use tracing::{instrument, warn};

use crate::error::{Error, Result};

/// Leading byte of every stored item
pub const SENTINEL: u8 = b'S';

/// Trailing bytes stripped from stored items
pub const TERMINATOR: [u8; 2] = [0xFE, 0x0A];

/// Unpack items framed with four byte little endian lengths
pub fn unpack(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    unpack_with(data, &Int32Length)
}

/// Pack items framed with four byte little endian lengths
pub fn pack(items: &[Vec<u8>]) -> Result<Vec<u8>> {
    pack_with(items, &Int32Length)
}

/// Unpack items framed by `codec`
#[instrument(skip_all, err, fields(size = data.len()))]
pub fn unpack_with(data: &[u8], codec: &impl LengthCodec) -> Result<Vec<Vec<u8>>> {
    let mut reader = Cursor::new(data);
    let mut items = Vec::new();

    while (reader.position() as usize) < data.len() {
        let index = items.len();
        let expected = codec.read_length(&mut reader)? as usize + 1;

        let mut item = Vec::with_capacity(expected);
        (&mut reader).take(expected as u64).read_to_end(&mut item)?;
        if item.len() < expected {
            return Err(Error::TruncatedItem {
                index,
                expected,
                actual: item.len(),
            });
        }

        if item.first() == Some(&SENTINEL) {
            item.remove(0);
        } else {
            warn!(index, "item does not start with 'S'");
        }
        if item.ends_with(&TERMINATOR) {
            item.truncate(item.len() - TERMINATOR.len());
        }

        items.push(item);
    }

    Ok(items)
}

/// Pack items framed by `codec`
pub fn pack_with(items: &[Vec<u8>], codec: &impl LengthCodec) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for item in items {
        // the stored length excludes one byte, which the sentinel accounts for
        let length = u32::try_from(item.len()).map_err(|_| Error::ItemTooLarge(item.len()))?;
        codec.write_length(&mut out, length)?;
        out.push(SENTINEL);
        out.extend_from_slice(item);
    }
    Ok(out)
}
