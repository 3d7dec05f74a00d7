//! Length prefixes used to frame items and data blocks.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Reads and writes a non-negative length in front of a payload
pub trait LengthCodec {
    /// Read one length prefix
    fn read_length(&self, reader: &mut dyn Read) -> Result<u32>;

    /// Write one length prefix
    fn write_length(&self, writer: &mut dyn Write, length: u32) -> Result<()>;
}

/// Fixed four byte little endian length
#[derive(Debug, Default, Clone, Copy)]
pub struct Int32Length;

impl LengthCodec for Int32Length {
    fn read_length(&self, reader: &mut dyn Read) -> Result<u32> {
        Ok(reader.read_u32::<LittleEndian>()?)
    }

    fn write_length(&self, writer: &mut dyn Write, length: u32) -> Result<()> {
        writer.write_u32::<LittleEndian>(length)?;
        Ok(())
    }
}

/// Maximum number of decimal digits needed for a `u32`
const MAX_DIGITS: u8 = 10;

/// Binary coded decimal length
///
/// One byte holding the digit count, followed by that many bytes each holding a single decimal
/// digit, most significant first.
#[derive(Debug, Default, Clone, Copy)]
pub struct BcdLength;

impl LengthCodec for BcdLength {
    fn read_length(&self, reader: &mut dyn Read) -> Result<u32> {
        let digits = reader.read_u8()?;
        if digits == 0 || digits > MAX_DIGITS {
            return Err(Error::InvalidLength(format!("{digits} digits")));
        }

        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = reader.read_u8()?;
            if digit > 9 {
                return Err(Error::InvalidLength(format!("digit {digit:#04x}")));
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(digit)))
                .ok_or_else(|| Error::InvalidLength("value exceeds 32 bits".into()))?;
        }
        Ok(value)
    }

    fn write_length(&self, writer: &mut dyn Write, length: u32) -> Result<()> {
        let digits: Vec<u8> = length.to_string().bytes().map(|b| b - b'0').collect();
        writer.write_u8(digits.len() as u8)?;
        writer.write_all(&digits)?;
        Ok(())
    }
}
