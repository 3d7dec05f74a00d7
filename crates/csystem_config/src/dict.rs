//! Dictionary items: string keys mapped to small non-negative integers.
//!
//! An item holds the UTF-16 unit `#` followed by one run per entry: the key's UTF-16 units, a `:`
//! unit, then the value as a sequence of two byte units of which only the low byte is used.
//!
//! | Unit      | Meaning                                   |
//! |-----------|-------------------------------------------|
//! | `0..=200` | Added to the value                        |
//! | `201`     | Ends the value                            |
//! | `250`     | Resets the value to zero                  |
//!
//! A value made of the terminator alone is `-1`.

use derive_more::derive::{Constructor, Deref, From, IntoIterator};
use tracing::debug;
use widestring::U16Str;

use crate::{
    error::{Error, Result},
    text,
};

/// Largest amount a single unit can add
pub const MAX_UNIT: u8 = 200;

/// Unit ending a value
pub const TERMINATOR_UNIT: u8 = 201;

/// Unit resetting a value to zero
pub const RESET_UNIT: u8 = 250;

const MARKER: u16 = b'#' as u16;
const SEPARATOR: u16 = b':' as u16;

/// Encode a value as its units, terminator included.
///
/// ```
/// assert_eq!(csystem_config::dict::encode_value(201).unwrap(), vec![200, 1, 201]);
/// ```
pub fn encode_value(value: i32) -> Result<Vec<u8>> {
    match value {
        ..=-2 => Err(Error::DictionaryValueOutOfRange(value)),
        -1 => Ok(vec![TERMINATOR_UNIT]),
        0 => Ok(vec![RESET_UNIT, TERMINATOR_UNIT]),
        mut remaining => {
            let mut units = Vec::with_capacity(remaining as usize / MAX_UNIT as usize + 2);
            while remaining > i32::from(MAX_UNIT) {
                units.push(MAX_UNIT);
                remaining -= i32::from(MAX_UNIT);
            }
            units.push(remaining as u8);
            units.push(TERMINATOR_UNIT);
            Ok(units)
        }
    }
}

/// Decode one value from its units.
///
/// Returns the value and the number of units consumed, terminator included.
pub fn decode_value(units: impl IntoIterator<Item = u8>) -> Result<(i32, usize)> {
    let mut value: i32 = 0;
    let mut consumed = 0;

    for unit in units {
        consumed += 1;
        match unit {
            TERMINATOR_UNIT if consumed == 1 => return Ok((-1, consumed)),
            TERMINATOR_UNIT => return Ok((value, consumed)),
            RESET_UNIT => value = 0,
            0..=MAX_UNIT => value = value.wrapping_add(i32::from(unit)),
            other => debug!(unit = other, "ignoring unexpected dictionary unit"),
        }
    }

    Err(Error::UnterminatedDictionaryValue)
}

/// One key and its value
#[derive(Constructor, Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    /// Entry key
    pub key: String,
    /// Entry value, `-1` or greater
    pub value: i32,
}

/// Ordered list of dictionary entries, as stored
#[derive(Constructor, Debug, Default, Clone, PartialEq, Eq, Deref, From, IntoIterator)]
#[into_iterator(owned, ref)]
pub struct DictionaryMapping(Vec<DictEntry>);

impl DictionaryMapping {
    /// Decode a dictionary item
    pub fn decode_item(item: &[u8]) -> Result<DictionaryMapping> {
        let units = text::code_units(item)?;
        if units.first() != Some(&MARKER) {
            return Err(Error::MissingDictionaryMarker);
        }

        let mut entries = Vec::new();
        let mut pos = 1;
        while pos < units.len() {
            let key_start = pos;
            while pos < units.len() && units[pos] != SEPARATOR {
                pos += 1;
            }
            let key = U16Str::from_slice(&units[key_start..pos]).to_string()?;

            // skip the separator, a key without a value run is dropped
            pos += 1;
            if pos >= units.len() {
                break;
            }

            let (value, consumed) = decode_value(units[pos..].iter().map(|&u| u as u8))?;
            pos += consumed;
            entries.push(DictEntry { key, value });
        }

        Ok(DictionaryMapping(entries))
    }

    /// Encode the entries as a dictionary item
    pub fn encode_item(&self) -> Result<Vec<u8>> {
        let mut out = text::encode("#");
        for entry in &self.0 {
            text::push_str(&mut out, &entry.key);
            text::push_str(&mut out, ":");
            for unit in encode_value(entry.value)? {
                out.extend_from_slice(&[unit, 0]);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{decode_value, encode_value, DictEntry, DictionaryMapping};
    use crate::error::{Error, Result};

    #[test]
    fn value_boundaries() -> Result<()> {
        assert_eq!(encode_value(-1)?, vec![201]);
        assert_eq!(encode_value(0)?, vec![250, 201]);
        assert_eq!(encode_value(200)?, vec![200, 201]);
        assert_eq!(encode_value(201)?, vec![200, 1, 201]);
        assert_eq!(encode_value(400)?, vec![200, 200, 201]);
        Ok(())
    }

    #[test]
    fn values_survive_encoding() -> Result<()> {
        for value in -1..=10_000 {
            let units = encode_value(value)?;
            assert_eq!(decode_value(units.iter().copied())?, (value, units.len()));
        }
        Ok(())
    }

    #[test]
    fn values_below_minus_one() {
        assert!(matches!(
            encode_value(-2),
            Err(Error::DictionaryValueOutOfRange(-2))
        ));
    }

    #[test]
    fn reset_and_unknown_units() -> Result<()> {
        assert_eq!(decode_value([5, 250, 7, 230, 201, 9])?, (7, 5));
        assert!(matches!(
            decode_value([5, 6]),
            Err(Error::UnterminatedDictionaryValue)
        ));
        Ok(())
    }

    #[test]
    fn item_layout() -> Result<()> {
        let mapping = DictionaryMapping::new(vec![
            DictEntry::new(String::new(), -1),
            DictEntry::new("k".into(), 0),
        ]);
        let item = mapping.encode_item()?;
        assert_eq!(
            item,
            vec![b'#', 0, b':', 0, 201, 0, b'k', 0, b':', 0, 250, 0, 201, 0]
        );
        assert_eq!(DictionaryMapping::decode_item(&item)?, mapping);
        Ok(())
    }

    #[test]
    fn trailing_key_is_dropped() -> Result<()> {
        let item = [b'#', 0, b'a', 0, b':', 0, 3, 0, 201, 0, b'b', 0, b':', 0];
        let mapping = DictionaryMapping::decode_item(&item)?;
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[0], DictEntry::new("a".into(), 3));
        Ok(())
    }

    #[test]
    fn missing_marker() {
        assert!(matches!(
            DictionaryMapping::decode_item(&[b'a', 0]),
            Err(Error::MissingDictionaryMarker)
        ));
        assert!(matches!(
            DictionaryMapping::decode_item(&[]),
            Err(Error::MissingDictionaryMarker)
        ));
    }
}
