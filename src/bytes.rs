//! Positional Byte Reader
//!
//! Decodes little-endian integers, fixed-width hashes, and Bitcoin's
//! variable-length "compact size" integers from an immutable buffer.

use thiserror::Error;

use crate::hashutil::{DisplayHash, InternalHash};

/// Errors raised while reading a byte buffer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("truncated input: wanted {wanted} bytes at offset {offset}, had {available}")]
    Truncated {
        offset: usize,
        wanted: usize,
        available: usize,
    },
}

/// A cursor over a borrowed byte slice.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        if self.remaining() < n {
            return Err(ReadError::Truncated {
                offset: self.pos,
                wanted: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        self.take(n)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ReadError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ReadError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, ReadError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_i32_le(&mut self) -> Result<i32, ReadError> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes(b.try_into().unwrap()))
    }

    /// 32-byte hash, kept in wire (internal) byte order.
    pub fn read_hash_internal(&mut self) -> Result<InternalHash, ReadError> {
        let b = self.take(32)?;
        Ok(InternalHash::from_slice(b))
    }

    /// 32-byte hash, reversed into display order as it is read.
    pub fn read_hash_display(&mut self) -> Result<DisplayHash, ReadError> {
        let b = self.take(32)?;
        Ok(InternalHash::from_slice(b).to_display())
    }

    /// Bitcoin compact-size integer. Returns (value, bytes consumed).
    pub fn read_varint(&mut self) -> Result<(u64, usize), ReadError> {
        let first = self.read_u8()?;
        match first {
            0..=0xFC => Ok((first as u64, 1)),
            0xFD => Ok((self.read_u16_le()? as u64, 3)),
            0xFE => Ok((self.read_u32_le()? as u64, 5)),
            0xFF => Ok((self.read_u64_le()?, 9)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_integers() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u32_le().unwrap(), 1);
        assert_eq!(r.read_u16_le().unwrap(), 0xFFFF);
    }

    #[test]
    fn varint_single_byte() {
        let data = [0x05];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_varint().unwrap(), (5, 1));
    }

    #[test]
    fn varint_u16_prefix() {
        let data = [0xFD, 0x34, 0x12];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_varint().unwrap(), (0x1234, 3));
    }

    #[test]
    fn varint_u32_prefix() {
        let data = [0xFE, 0x78, 0x56, 0x34, 0x12];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_varint().unwrap(), (0x12345678, 5));
    }

    #[test]
    fn varint_u64_prefix() {
        let data = [0xFF, 1, 0, 0, 0, 0, 0, 0, 0];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_varint().unwrap(), (1, 9));
    }

    #[test]
    fn truncated_read_reports_offset() {
        let data = [0x00, 0x01];
        let mut r = ByteReader::new(&data);
        let err = r.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            ReadError::Truncated {
                offset: 0,
                wanted: 4,
                available: 2
            }
        );
    }
}
