//! Product accounts and their string metadata

use indexmap::IndexMap;
use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::base::Base;
use crate::error::DecodeResult;
use crate::reader::ByteReader;

const PRICE_ACCOUNT_OFFSET: usize = 16;
const ATTRIBUTES_OFFSET: usize = 48;

pub const SYMBOL: &str = "symbol";
pub const ASSET_TYPE: &str = "asset_type";
pub const QUOTE_CURRENCY: &str = "quote_currency";
pub const TENOR: &str = "tenor";

/// Ordered product metadata.
///
/// Entries keep the order they were stored on chain. Lookups go by key;
/// the well-known keys have named accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductAttributes(IndexMap<String, String>);

impl ProductAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A repeated key keeps its first position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn symbol(&self) -> Option<&str> {
        self.get(SYMBOL)
    }

    pub fn asset_type(&self) -> Option<&str> {
        self.get(ASSET_TYPE)
    }

    pub fn quote_currency(&self) -> Option<&str> {
        self.get(QUOTE_CURRENCY)
    }

    pub fn tenor(&self) -> Option<&str> {
        self.get(TENOR)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProductAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAccount {
    pub header: Base,
    /// First price account of this product, `None` if it has no feed yet
    pub price_account_key: Option<Pubkey>,
    pub attributes: ProductAttributes,
}

/// Decode a product account.
///
/// Metadata is a run of `(u8 len, key bytes, u8 len, value bytes)` pairs
/// starting at offset 48 and ending at the declared used size. A zero key
/// length ends the run early.
pub fn decode_product(data: &[u8]) -> DecodeResult<ProductAccount> {
    let reader = ByteReader::new(data);
    let header = Base::read(&reader)?;
    let price_account_key = reader.read_key(PRICE_ACCOUNT_OFFSET)?;

    let size = header.size as usize;
    let mut attributes = ProductAttributes::new();
    let mut cursor = ATTRIBUTES_OFFSET;

    while cursor < size {
        let key_len = reader.read_u8(cursor)? as usize;
        cursor += 1;
        if key_len == 0 {
            break;
        }
        let key = reader.bytes(cursor, key_len)?;
        cursor += key_len;

        let value_len = reader.read_u8(cursor)? as usize;
        cursor += 1;
        let value = reader.bytes(cursor, value_len)?;
        cursor += value_len;

        attributes.insert(
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value),
        );
    }

    Ok(ProductAccount {
        header,
        price_account_key,
        attributes,
    })
}
