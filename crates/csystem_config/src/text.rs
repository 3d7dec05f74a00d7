//! UTF-16 little endian helpers for config items

use widestring::{U16Str, U16String};

use crate::error::{Error, Result};

/// Split bytes into little endian UTF-16 code units
///
/// Fails with [`Error::TruncatedCodeUnit`] when a lone byte is left over.
pub fn code_units(bytes: &[u8]) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return Err(Error::TruncatedCodeUnit(bytes.len() - 1));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Decode UTF-16LE bytes into a string.
///
/// Odd lengths and unpaired surrogates are errors, which callers treat as "this is not text".
pub fn decode(bytes: &[u8]) -> Result<String> {
    let units = code_units(bytes)?;
    Ok(U16Str::from_slice(&units).to_string()?)
}

/// Encode a string as UTF-16LE bytes
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    push_str(&mut out, text);
    out
}

/// Append a string as UTF-16LE bytes
pub fn push_str(out: &mut Vec<u8>, text: &str) {
    for unit in U16String::from_str(text).into_vec() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::{decode, encode};
    use crate::error::Error;

    #[test]
    fn encode_and_decode() {
        let bytes = encode("hé");
        assert_eq!(bytes, vec![b'h', 0x00, 0xE9, 0x00]);
        assert_eq!(decode(&bytes).ok(), Some("hé".to_string()));
    }

    #[test]
    fn odd_length_is_not_text() {
        assert!(matches!(
            decode(&[0x41, 0x00, 0x42]),
            Err(Error::TruncatedCodeUnit(2))
        ));
    }

    #[test]
    fn unpaired_surrogate_is_not_text() {
        assert!(matches!(
            decode(&[0x00, 0xD8, 0x41, 0x00]),
            Err(Error::UTF16Error(_))
        ));
    }
}
