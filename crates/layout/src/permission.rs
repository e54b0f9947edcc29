//! Permission account: the three program authorities

use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::base::{Base, HEADER_LEN};
use crate::error::DecodeResult;
use crate::reader::{ByteReader, KEY_LEN};

/// Declared used size of a permission account
pub const PERMISSION_SIZE: usize = HEADER_LEN + 3 * KEY_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionAccount {
    pub header: Base,
    pub master_authority: Pubkey,
    pub data_curation_authority: Pubkey,
    pub security_authority: Pubkey,
}

impl PermissionAccount {
    /// Layout consistency: the declared size covers exactly the three keys
    pub fn has_expected_size(&self) -> bool {
        self.header.size as usize == PERMISSION_SIZE
    }
}

pub fn decode_permission(data: &[u8]) -> DecodeResult<PermissionAccount> {
    let reader = ByteReader::new(data);
    let account = PermissionAccount {
        header: Base::read(&reader)?,
        master_authority: reader.read_pubkey(HEADER_LEN)?,
        data_curation_authority: reader.read_pubkey(HEADER_LEN + KEY_LEN)?,
        security_authority: reader.read_pubkey(HEADER_LEN + 2 * KEY_LEN)?,
    };

    if !account.has_expected_size() {
        log::warn!(
            "Permission account declares {} bytes, expected {}",
            account.header.size,
            PERMISSION_SIZE
        );
    }

    Ok(account)
}
