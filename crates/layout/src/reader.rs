//! Little-endian primitive reads over an account buffer
//!
//! Every read is bounds checked against the buffer and addressed by an
//! absolute byte offset, mirroring the fixed offsets of the on-chain layout.

use solana_program::pubkey::Pubkey;

use crate::error::{DecodeError, DecodeResult};

/// Width of an account key block
pub const KEY_LEN: usize = 32;

/// Read-only view over raw account bytes
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow `width` bytes starting at `offset`
    pub fn bytes(&self, offset: usize, width: usize) -> DecodeResult<&'a [u8]> {
        let end = offset.checked_add(width).ok_or(DecodeError::OutOfBounds {
            offset,
            width,
            len: self.data.len(),
        })?;

        self.data.get(offset..end).ok_or(DecodeError::OutOfBounds {
            offset,
            width,
            len: self.data.len(),
        })
    }

    fn array<const N: usize>(&self, offset: usize) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(offset, N)?);
        Ok(out)
    }

    pub fn read_u8(&self, offset: usize) -> DecodeResult<u8> {
        Ok(u8::from_le_bytes(self.array(offset)?))
    }

    pub fn read_i8(&self, offset: usize) -> DecodeResult<i8> {
        Ok(i8::from_le_bytes(self.array(offset)?))
    }

    pub fn read_u16(&self, offset: usize) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.array(offset)?))
    }

    pub fn read_i16(&self, offset: usize) -> DecodeResult<i16> {
        Ok(i16::from_le_bytes(self.array(offset)?))
    }

    pub fn read_u32(&self, offset: usize) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.array(offset)?))
    }

    pub fn read_i32(&self, offset: usize) -> DecodeResult<i32> {
        Ok(i32::from_le_bytes(self.array(offset)?))
    }

    pub fn read_u64(&self, offset: usize) -> DecodeResult<u64> {
        Ok(u64::from_le_bytes(self.array(offset)?))
    }

    pub fn read_i64(&self, offset: usize) -> DecodeResult<i64> {
        Ok(i64::from_le_bytes(self.array(offset)?))
    }

    /// Read a 32-byte key verbatim, including the all-zero key
    pub fn read_pubkey(&self, offset: usize) -> DecodeResult<Pubkey> {
        Ok(Pubkey::new_from_array(self.array(offset)?))
    }

    /// Read a 32-byte key, mapping the all-zero block to `None`
    pub fn read_key(&self, offset: usize) -> DecodeResult<Option<Pubkey>> {
        let raw: [u8; KEY_LEN] = self.array(offset)?;
        if raw == [0u8; KEY_LEN] {
            Ok(None)
        } else {
            Ok(Some(Pubkey::new_from_array(raw)))
        }
    }
}
