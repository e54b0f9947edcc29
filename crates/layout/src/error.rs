//! Decode errors

use thiserror::Error;

/// Errors raised while decoding an oracle account buffer.
///
/// A buffer that is not an oracle account at all (too short for the magic
/// number, or the wrong magic) is not an error: [`crate::decode_header`]
/// returns `Ok(None)` for it and callers skip it. A buffer with the magic
/// that is cut short is [`DecodeError::OutOfBounds`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A fixed-layout read would run past the end of the buffer
    #[error("Read of {width} bytes at offset {offset} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// The account type tag is newer than this decoder understands
    #[error("Unknown account type: {tag}. Try upgrading pyth-layout")]
    UnknownAccountType { tag: u32 },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
