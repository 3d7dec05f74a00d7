//! Hex text used for binary payloads in the XML sidecars.
//!
//! Bytes are printed as uppercase pairs separated by a single space (`0A FF 10`).
//! When parsing, all spaces are dropped before the digits are paired up.

use crate::error::{Error, Result};

/// Format bytes as space separated uppercase hex pairs
pub fn to_hex(bytes: &[u8]) -> String {
    let encoded = hex::encode_upper(bytes);
    encoded
        .as_bytes()
        .chunks(2)
        .filter_map(|pair| std::str::from_utf8(pair).ok())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse hex text as produced by [`to_hex`]
pub fn from_hex(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    if compact.len() % 2 != 0 {
        return Err(Error::OddHexLength);
    }

    hex::decode(&compact).map_err(|e| match e {
        hex::FromHexError::OddLength => Error::OddHexLength,
        _ => Error::InvalidHexDigit(text.to_owned()),
    })
}
