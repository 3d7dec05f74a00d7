//! Fixed-stride dictionaries stored in data blocks.
//!
//! | Offset (bytes) | Field   | Description                                                   |
//! |----------------|---------|---------------------------------------------------------------|
//! | 0x0000         | Count   | 4 bytes: Number of entries                                    |
//! | 0x0004         | Key     | 16 bytes: UTF-16 key followed by `:`, zero padded             |
//! | 0x0014         | Value   | 4 bytes: Signed value                                         |
//!
//! The key and value pair repeats for every entry.

use byteorder::{ByteOrder, LittleEndian};
use widestring::U16Str;

use crate::{
    dict::{DictEntry, DictionaryMapping},
    error::{Error, Result},
    text,
};

/// Bytes reserved for a key and its `:` terminator
pub const KEY_SLOT: usize = 0x10;

const HEADER: usize = 4;
const VALUE: usize = 4;
const SEPARATOR: u16 = b':' as u16;

/// Decode a fixed-stride dictionary
pub fn decode(data: &[u8]) -> Result<DictionaryMapping> {
    if data.len() < HEADER {
        return Err(Error::TruncatedFixedStride);
    }
    let declared = LittleEndian::read_u32(&data[..HEADER]);

    let mut entries = Vec::new();
    let mut offset = HEADER;
    while offset < data.len() {
        let value_offset = offset + KEY_SLOT;

        let mut units = Vec::new();
        loop {
            let unit = data
                .get(offset..offset + 2)
                .map(LittleEndian::read_u16)
                .ok_or(Error::TruncatedFixedStride)?;
            offset += 2;
            if unit == SEPARATOR {
                break;
            }
            units.push(unit);
            if offset >= value_offset {
                return Err(Error::FixedStrideKeyTooLong(
                    String::from_utf16_lossy(&units),
                ));
            }
        }
        let key = U16Str::from_slice(&units).to_string()?;

        let value = data
            .get(value_offset..value_offset + VALUE)
            .map(LittleEndian::read_i32)
            .ok_or(Error::TruncatedFixedStride)?;
        offset = value_offset + VALUE;

        entries.push(DictEntry { key, value });
    }

    if entries.len() != declared as usize {
        return Err(Error::FixedStrideCountMismatch {
            declared,
            actual: entries.len(),
        });
    }
    Ok(DictionaryMapping::new(entries))
}

/// Encode entries as a fixed-stride dictionary
pub fn encode(mapping: &DictionaryMapping) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER + mapping.len() * (KEY_SLOT + VALUE));
    out.extend_from_slice(&(mapping.len() as u32).to_le_bytes());

    for entry in mapping {
        let mut slot = text::encode(&entry.key);
        text::push_str(&mut slot, ":");
        if slot.len() > KEY_SLOT {
            return Err(Error::FixedStrideKeyTooLong(entry.key.clone()));
        }
        slot.resize(KEY_SLOT, 0);

        out.extend_from_slice(&slot);
        out.extend_from_slice(&entry.value.to_le_bytes());
    }
    Ok(out)
}
