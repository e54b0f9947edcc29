//! Pyth Integration Tests
//!
//! End-to-end scenarios driving both clients against an in-memory oracle
//! program. [`oracle_accounts`] builds a small but complete program account
//! set: one mapping, a permission account, and a product/price pair per
//! [`Feed`].

use pyth_layout::test_utils::{
    key, permission_bytes, MappingBuilder, PriceBuilder, PriceInfoFields, ProductBuilder,
};
use pyth_layout::{PriceStatus, Pubkey};

/// Program key every fixture is served under
pub fn program_key() -> Pubkey {
    key(200)
}

pub fn mapping_key() -> Pubkey {
    key(201)
}

pub fn permission_key() -> Pubkey {
    key(202)
}

/// One product and its price account
#[derive(Debug, Clone)]
pub struct Feed {
    pub product_key: Pubkey,
    pub price_key: Pubkey,
    pub symbol: &'static str,
    pub asset_type: &'static str,
    /// Aggregate price in units of 10^-5
    pub price: i64,
    pub confidence: u64,
    pub status: PriceStatus,
    pub publish_slot: u64,
}

impl Feed {
    pub fn new(seed: u8, symbol: &'static str, asset_type: &'static str) -> Self {
        Self {
            product_key: key(seed),
            price_key: key(seed + 100),
            symbol,
            asset_type,
            price: 100_000,
            confidence: 100,
            status: PriceStatus::Trading,
            publish_slot: 1_000,
        }
    }

    pub fn price(mut self, price: i64, confidence: u64) -> Self {
        self.price = price;
        self.confidence = confidence;
        self
    }

    pub fn published(mut self, status: PriceStatus, publish_slot: u64) -> Self {
        self.status = status;
        self.publish_slot = publish_slot;
        self
    }

    pub fn product_bytes(&self) -> Vec<u8> {
        let quote = self.symbol.rsplit('/').next().unwrap_or("USD");
        ProductBuilder::new()
            .price_account(self.price_key)
            .attr("symbol", self.symbol)
            .attr("asset_type", self.asset_type)
            .attr("quote_currency", quote)
            .build()
    }

    pub fn price_bytes(&self) -> Vec<u8> {
        let aggregate = PriceInfoFields {
            price: self.price,
            confidence: self.confidence,
            status: self.status as u32,
            corp_action: 0,
            publish_slot: self.publish_slot,
        };
        PriceBuilder::new()
            .exponent(-5)
            .counts(2, 2)
            .slots(self.publish_slot, self.publish_slot)
            .product(self.product_key)
            .aggregate(aggregate)
            .component(key(150), aggregate, aggregate)
            .component(key(151), aggregate, aggregate)
            .build()
    }
}

/// Account set of an oracle program serving `feeds`.
///
/// With `prices_first` every price account precedes every product account.
pub fn oracle_accounts(feeds: &[Feed], prices_first: bool) -> Vec<(Pubkey, Vec<u8>)> {
    let product_keys: Vec<Pubkey> = feeds.iter().map(|f| f.product_key).collect();
    let mut accounts = vec![
        (
            mapping_key(),
            MappingBuilder::new().products(&product_keys).build(),
        ),
        (
            permission_key(),
            permission_bytes(key(210), key(211), key(212)),
        ),
    ];

    let products = feeds.iter().map(|f| (f.product_key, f.product_bytes()));
    let prices = feeds.iter().map(|f| (f.price_key, f.price_bytes()));
    if prices_first {
        accounts.extend(prices);
        accounts.extend(products);
    } else {
        accounts.extend(products);
        accounts.extend(prices);
    }
    accounts
}

/// Three feeds across two asset types
pub fn default_feeds() -> Vec<Feed> {
    vec![
        Feed::new(1, "Crypto.BTC/USD", "Crypto").price(6_512_345_678, 2_500_000),
        Feed::new(2, "Crypto.ETH/USD", "Crypto").price(868_725, 1_310),
        Feed::new(3, "FX.EUR/USD", "FX")
            .price(108_250, 5)
            .published(PriceStatus::Halted, 990),
    ]
}
