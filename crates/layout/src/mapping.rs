//! Mapping accounts: one page of the linked list of product keys

use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::base::Base;
use crate::error::DecodeResult;
use crate::reader::{ByteReader, KEY_LEN};

const NUM_PRODUCTS_OFFSET: usize = 16;
const NEXT_MAPPING_OFFSET: usize = 24;
const PRODUCT_KEYS_OFFSET: usize = 56;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingAccount {
    pub header: Base,
    /// Next page in the list, `None` on the last page
    pub next_mapping_account: Option<Pubkey>,
    /// Product keys in on-chain slot order
    pub product_account_keys: Vec<Pubkey>,
}

pub fn decode_mapping(data: &[u8]) -> DecodeResult<MappingAccount> {
    let reader = ByteReader::new(data);
    let header = Base::read(&reader)?;
    let num_products = reader.read_u32(NUM_PRODUCTS_OFFSET)? as usize;
    let next_mapping_account = reader.read_key(NEXT_MAPPING_OFFSET)?;

    // Bounds check the whole key table before allocating for it
    reader.bytes(PRODUCT_KEYS_OFFSET, num_products.saturating_mul(KEY_LEN))?;

    let product_account_keys = (0..num_products)
        .map(|i| reader.read_pubkey(PRODUCT_KEYS_OFFSET + i * KEY_LEN))
        .collect::<DecodeResult<Vec<_>>>()?;

    Ok(MappingAccount {
        header,
        next_mapping_account,
        product_account_keys,
    })
}
