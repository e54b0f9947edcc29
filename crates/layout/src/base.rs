//! Account header shared by every oracle account

use serde::Serialize;

use crate::error::{DecodeError, DecodeResult};
use crate::reader::ByteReader;

/// Magic number identifying an oracle account
pub const MAGIC: u32 = 0xA1B2C3D4;

/// Current account format version
pub const VERSION_2: u32 = 2;
pub const VERSION: u32 = VERSION_2;

/// Size of the common header in bytes
pub const HEADER_LEN: usize = 16;

/// Account type tags
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AccountType {
    Unknown = 0,
    Mapping = 1,
    Product = 2,
    Price = 3,
    Test = 4,
    Permission = 5,
}

impl TryFrom<u32> for AccountType {
    type Error = DecodeError;

    fn try_from(tag: u32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(AccountType::Unknown),
            1 => Ok(AccountType::Mapping),
            2 => Ok(AccountType::Product),
            3 => Ok(AccountType::Price),
            4 => Ok(AccountType::Test),
            5 => Ok(AccountType::Permission),
            _ => Err(DecodeError::UnknownAccountType { tag }),
        }
    }
}

/// Decoded account header
///
/// ```text
/// offset 0   magic: u32
/// offset 4   version: u32
/// offset 8   account type: u32
/// offset 12  used size: u32
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Base {
    pub magic: u32,
    pub version: u32,
    /// Raw type tag as stored on chain
    pub tag: u32,
    pub size: u32,
}

impl Base {
    /// Read the header fields without checking the magic
    pub(crate) fn read(reader: &ByteReader<'_>) -> DecodeResult<Self> {
        Ok(Self {
            magic: reader.read_u32(0)?,
            version: reader.read_u32(4)?,
            tag: reader.read_u32(8)?,
            size: reader.read_u32(12)?,
        })
    }

    /// Resolve the raw tag, failing on tags this decoder does not know
    pub fn account_type(&self) -> DecodeResult<AccountType> {
        AccountType::try_from(self.tag)
    }

    pub fn validate(&self) -> bool {
        self.magic == MAGIC
    }
}

/// Decode the header of an arbitrary buffer.
///
/// Returns `None` when the buffer is too short to carry the magic number or
/// carries a different one; such buffers are simply not oracle accounts.
/// A buffer with the magic but no room for the rest of the header also
/// yields `None` here; use [`decode_header`] to tell the two apart.
pub fn decode_base(data: &[u8]) -> Option<Base> {
    decode_header(data).ok().flatten()
}

/// Decode the header, failing on a recognised buffer cut short.
///
/// - `Ok(None)`: shorter than the magic number, or a different magic
/// - `Err(OutOfBounds)`: the magic matches but the header is truncated
pub fn decode_header(data: &[u8]) -> DecodeResult<Option<Base>> {
    let reader = ByteReader::new(data);
    match reader.read_u32(0) {
        Ok(MAGIC) => Base::read(&reader).map(Some),
        _ => Ok(None),
    }
}
