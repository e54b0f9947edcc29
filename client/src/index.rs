//! Correlation of price accounts with their owning product

use std::collections::HashMap;

use pyth_layout::{ProductAccount, Pubkey};

/// A decoded product together with where and when it was observed
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub key: Pubkey,
    pub slot: u64,
    pub account: ProductAccount,
}

/// Maps price accounts to their product, and products to their metadata.
///
/// Populated as product accounts are observed, in any order relative to
/// the price accounts that refer to them.
#[derive(Debug, Default)]
pub struct CorrelationIndex {
    price_to_product: HashMap<Pubkey, Pubkey>,
    products: HashMap<Pubkey, ProductUpdate>,
}

impl CorrelationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a product, linking its price account if it has one
    pub fn observe_product(&mut self, key: Pubkey, account: ProductAccount, slot: u64) {
        let price_key = account.price_account_key;

        if let Some(previous) = self.products.get(&key) {
            if let Some(old_price) = previous.account.price_account_key {
                if Some(old_price) != price_key && self.price_to_product.get(&old_price) == Some(&key) {
                    self.price_to_product.remove(&old_price);
                }
            }
        }

        if let Some(price_key) = price_key {
            self.price_to_product.insert(price_key, key);
        }
        self.products.insert(key, ProductUpdate { key, slot, account });
    }

    /// Product owning `price_key`, if both hops are known
    pub fn resolve_product_for(&self, price_key: &Pubkey) -> Option<&ProductUpdate> {
        let product_key = self.price_to_product.get(price_key)?;
        self.products.get(product_key)
    }

    pub fn product(&self, key: &Pubkey) -> Option<&ProductUpdate> {
        self.products.get(key)
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductUpdate> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Clear all entries.
    ///
    /// The streaming client resets before each enumeration. The bulk client
    /// builds a fresh index per fetch instead, so a failed fetch leaves the
    /// previous one in place.
    pub fn reset(&mut self) {
        self.price_to_product.clear();
        self.products.clear();
    }
}
