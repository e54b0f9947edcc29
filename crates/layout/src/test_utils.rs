//! Builders for hand-constructed account buffers
//!
//! Every builder writes the common header with the oracle magic, version 2
//! and a used size equal to the final buffer length.

use solana_program::pubkey::Pubkey;

use crate::base::{AccountType, HEADER_LEN, MAGIC, VERSION};
use crate::permission::PERMISSION_SIZE;
use crate::price::{COMPONENTS_OFFSET, PRICE_INFO_LEN};

/// Deterministic non-zero key filled with `seed`
pub fn key(seed: u8) -> Pubkey {
    assert_ne!(seed, 0, "seed 0 would produce the absent key");
    Pubkey::new_from_array([seed; 32])
}

fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn finish(mut data: Vec<u8>) -> Vec<u8> {
    let size = data.len() as u32;
    put(&mut data, 12, &size.to_le_bytes());
    data
}

/// Header only, with an explicit tag and declared size
pub fn header_bytes(tag: u32, size: u32) -> Vec<u8> {
    let mut data = vec![0u8; HEADER_LEN];
    put(&mut data, 0, &MAGIC.to_le_bytes());
    put(&mut data, 4, &VERSION.to_le_bytes());
    put(&mut data, 8, &tag.to_le_bytes());
    put(&mut data, 12, &size.to_le_bytes());
    data
}

pub fn permission_bytes(master: Pubkey, data_curation: Pubkey, security: Pubkey) -> Vec<u8> {
    let mut data = header_bytes(AccountType::Permission as u32, PERMISSION_SIZE as u32);
    data.extend_from_slice(master.as_ref());
    data.extend_from_slice(data_curation.as_ref());
    data.extend_from_slice(security.as_ref());
    data
}

#[derive(Debug, Default)]
pub struct MappingBuilder {
    next: Option<Pubkey>,
    products: Vec<Pubkey>,
}

impl MappingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(mut self, next: Pubkey) -> Self {
        self.next = Some(next);
        self
    }

    pub fn products(mut self, keys: &[Pubkey]) -> Self {
        self.products.extend_from_slice(keys);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut data = header_bytes(AccountType::Mapping as u32, 0);
        data.resize(56, 0);
        put(&mut data, 16, &(self.products.len() as u32).to_le_bytes());
        if let Some(next) = self.next {
            put(&mut data, 24, next.as_ref());
        }
        for product in &self.products {
            data.extend_from_slice(product.as_ref());
        }
        finish(data)
    }
}

#[derive(Debug, Default)]
pub struct ProductBuilder {
    price_account: Option<Pubkey>,
    attrs: Vec<(String, String)>,
}

impl ProductBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn price_account(mut self, key: Pubkey) -> Self {
        self.price_account = Some(key);
        self
    }

    pub fn attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut data = header_bytes(AccountType::Product as u32, 0);
        data.resize(48, 0);
        if let Some(price) = self.price_account {
            put(&mut data, 16, price.as_ref());
        }
        for (k, v) in &self.attrs {
            data.push(k.len() as u8);
            data.extend_from_slice(k.as_bytes());
            data.push(v.len() as u8);
            data.extend_from_slice(v.as_bytes());
        }
        finish(data)
    }
}

/// Raw fields of one 32-byte price record
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceInfoFields {
    pub price: i64,
    pub confidence: u64,
    pub status: u32,
    pub corp_action: u32,
    pub publish_slot: u64,
}

impl PriceInfoFields {
    fn bytes(&self) -> [u8; PRICE_INFO_LEN] {
        let mut out = [0u8; PRICE_INFO_LEN];
        put(&mut out, 0, &self.price.to_le_bytes());
        put(&mut out, 8, &self.confidence.to_le_bytes());
        put(&mut out, 16, &self.status.to_le_bytes());
        put(&mut out, 20, &self.corp_action.to_le_bytes());
        put(&mut out, 24, &self.publish_slot.to_le_bytes());
        out
    }
}

#[derive(Debug)]
pub struct PriceBuilder {
    data: Vec<u8>,
    components: Vec<u8>,
}

impl Default for PriceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceBuilder {
    pub fn new() -> Self {
        let mut data = header_bytes(AccountType::Price as u32, 0);
        data.resize(COMPONENTS_OFFSET, 0);
        // price type: Price
        put(&mut data, 16, &1u32.to_le_bytes());
        Self {
            data,
            components: Vec::new(),
        }
    }

    pub fn exponent(mut self, exponent: i32) -> Self {
        put(&mut self.data, 20, &exponent.to_le_bytes());
        self
    }

    pub fn counts(mut self, num_component_prices: u32, num_quoters: u32) -> Self {
        put(&mut self.data, 24, &num_component_prices.to_le_bytes());
        put(&mut self.data, 28, &num_quoters.to_le_bytes());
        self
    }

    pub fn slots(mut self, last_slot: u64, valid_slot: u64) -> Self {
        put(&mut self.data, 32, &last_slot.to_le_bytes());
        put(&mut self.data, 40, &valid_slot.to_le_bytes());
        self
    }

    fn ema(mut self, offset: usize, value: i64, numerator: i64, denominator: i64) -> Self {
        put(&mut self.data, offset, &value.to_le_bytes());
        put(&mut self.data, offset + 8, &numerator.to_le_bytes());
        put(&mut self.data, offset + 16, &denominator.to_le_bytes());
        self
    }

    pub fn ema_price(self, value: i64, numerator: i64, denominator: i64) -> Self {
        self.ema(48, value, numerator, denominator)
    }

    pub fn ema_confidence(self, value: i64, numerator: i64, denominator: i64) -> Self {
        self.ema(72, value, numerator, denominator)
    }

    pub fn derived(mut self, drv1: i64, min_publishers: u8, drv2: i8, drv3: i16, drv4: i32) -> Self {
        put(&mut self.data, 96, &drv1.to_le_bytes());
        put(&mut self.data, 104, &min_publishers.to_le_bytes());
        put(&mut self.data, 105, &drv2.to_le_bytes());
        put(&mut self.data, 106, &drv3.to_le_bytes());
        put(&mut self.data, 108, &drv4.to_le_bytes());
        self
    }

    pub fn product(mut self, key: Pubkey) -> Self {
        put(&mut self.data, 112, key.as_ref());
        self
    }

    pub fn next(mut self, key: Pubkey) -> Self {
        put(&mut self.data, 144, key.as_ref());
        self
    }

    pub fn previous(mut self, slot: u64, price: i64, confidence: u64) -> Self {
        put(&mut self.data, 176, &slot.to_le_bytes());
        put(&mut self.data, 184, &price.to_le_bytes());
        put(&mut self.data, 192, &confidence.to_le_bytes());
        self
    }

    pub fn drv5(mut self, drv5: i64) -> Self {
        put(&mut self.data, 200, &drv5.to_le_bytes());
        self
    }

    pub fn aggregate(mut self, fields: PriceInfoFields) -> Self {
        put(&mut self.data, 208, &fields.bytes());
        self
    }

    pub fn component(mut self, publisher: Pubkey, aggregate: PriceInfoFields, latest: PriceInfoFields) -> Self {
        self.components.extend_from_slice(publisher.as_ref());
        self.components.extend_from_slice(&aggregate.bytes());
        self.components.extend_from_slice(&latest.bytes());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut data = self.data;
        data.extend_from_slice(&self.components);
        finish(data)
    }
}
