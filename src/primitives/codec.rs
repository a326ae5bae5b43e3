//! Canonical little-endian byte form
//!
//! Writers append fixed-width integers and `u32`-length-prefixed byte
//! strings; `ByteReader` reads the same layout back and rejects short or
//! malformed input instead of panicking.

use thiserror::Error;
use crate::crypto::Hash;

/// Errors while decoding the canonical byte form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unexpected end of data")]
    UnexpectedEnd,
    #[error("Text field is not valid UTF-8")]
    InvalidUtf8,
    #[error("{0} trailing bytes after the record")]
    TrailingBytes(usize),
}

/// Append a length-prefixed byte string (u32 little-endian length)
pub fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buf.extend_from_slice(data);
}

/// Cursor over a canonical byte form
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEnd);
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_hash(&mut self) -> Result<Hash, DecodeError> {
        Ok(Hash::from_bytes(self.take_array()?))
    }

    /// Element count of a sequence
    pub fn read_count(&mut self) -> Result<usize, DecodeError> {
        Ok(self.read_u32()? as usize)
    }

    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_count()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        String::from_utf8(self.read_var_bytes()?).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Fail unless every byte was consumed
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(DecodeError::TrailingBytes(extra)),
        }
    }
}
