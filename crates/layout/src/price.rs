//! Price accounts
//!
//! ```text
//! 16   price type: u32            112  product account: key
//! 20   exponent: i32              144  next price account: key
//! 24   num component prices: u32  176  previous slot: u64
//! 28   num quoters: u32           184  previous price: i64
//! 32   last slot: u64             192  previous confidence: u64
//! 40   valid slot: u64            200  drv5: i64
//! 48   ema price (24)             208  aggregate price info (32)
//! 72   ema confidence (24)        240  components, 96 bytes each
//! 96   drv1: i64, 104 min publishers: u8, 105 drv2: i8,
//!      106 drv3: i16, 108 drv4: i32
//! ```

use serde::Serialize;
use solana_program::pubkey::Pubkey;

use crate::base::Base;
use crate::error::DecodeResult;
use crate::reader::{ByteReader, KEY_LEN};
use crate::staleness::effective_status;

/// Width of an aggregate or component price record
pub const PRICE_INFO_LEN: usize = 32;
/// Width of an EMA record
pub const EMA_LEN: usize = 24;
/// Width of one component: publisher key plus two price records
pub const COMPONENT_LEN: usize = KEY_LEN + 2 * PRICE_INFO_LEN;
/// Upper bound on publisher components stored in one account
pub const MAX_COMPONENTS: usize = 32;

pub const AGGREGATE_OFFSET: usize = 208;
pub const COMPONENTS_OFFSET: usize = 240;

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceStatus {
    Unknown = 0,
    Trading = 1,
    Halted = 2,
    Auction = 3,
}

impl From<u32> for PriceStatus {
    fn from(raw: u32) -> Self {
        match raw {
            1 => PriceStatus::Trading,
            2 => PriceStatus::Halted,
            3 => PriceStatus::Auction,
            _ => PriceStatus::Unknown,
        }
    }
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PriceType {
    Unknown = 0,
    Price = 1,
}

impl From<u32> for PriceType {
    fn from(raw: u32) -> Self {
        match raw {
            1 => PriceType::Price,
            _ => PriceType::Unknown,
        }
    }
}

/// Scale a fixed-point magnitude by `10^exponent` for display
pub fn scale(magnitude: i128, exponent: i32) -> f64 {
    magnitude as f64 * 10f64.powi(exponent)
}

/// One price/confidence observation, aggregate or per publisher
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceInfo {
    pub price_component: i64,
    pub price: f64,
    pub confidence_component: u64,
    pub confidence: f64,
    pub status: PriceStatus,
    pub corp_action: u32,
    pub publish_slot: u64,
}

impl PriceInfo {
    fn read(reader: &ByteReader<'_>, offset: usize, exponent: i32) -> DecodeResult<Self> {
        let price_component = reader.read_i64(offset)?;
        let confidence_component = reader.read_u64(offset + 8)?;
        Ok(Self {
            price_component,
            price: scale(price_component as i128, exponent),
            confidence_component,
            confidence: scale(confidence_component as i128, exponent),
            status: PriceStatus::from(reader.read_u32(offset + 16)?),
            corp_action: reader.read_u32(offset + 20)?,
            publish_slot: reader.read_u64(offset + 24)?,
        })
    }
}

/// Exponential moving average with the oracle's accumulator state.
///
/// `numerator` and `denominator` are carried verbatim, never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ema {
    pub value_component: i64,
    pub value: f64,
    pub numerator: i64,
    pub denominator: i64,
}

impl Ema {
    fn read(reader: &ByteReader<'_>, offset: usize, exponent: i32) -> DecodeResult<Self> {
        let value_component = reader.read_i64(offset)?;
        Ok(Self {
            value_component,
            value: scale(value_component as i128, exponent),
            numerator: reader.read_i64(offset + 8)?,
            denominator: reader.read_i64(offset + 16)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceComponent {
    pub publisher: Pubkey,
    /// Contribution of this publisher to the current aggregate
    pub aggregate: PriceInfo,
    /// Latest submission from this publisher
    pub latest: PriceInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAccount {
    pub header: Base,
    pub price_type: PriceType,
    pub exponent: i32,
    pub num_component_prices: u32,
    pub num_quoters: u32,
    pub last_slot: u64,
    pub valid_slot: u64,
    pub ema_price: Ema,
    pub ema_confidence: Ema,
    pub drv1_component: i64,
    pub drv1: f64,
    pub min_publishers: u8,
    pub drv2: i8,
    pub drv3: i16,
    pub drv4: i32,
    pub product_account_key: Pubkey,
    pub next_price_account_key: Option<Pubkey>,
    pub previous_slot: u64,
    pub previous_price_component: i64,
    pub previous_price: f64,
    pub previous_confidence_component: u64,
    pub previous_confidence: f64,
    pub drv5_component: i64,
    pub drv5: f64,
    pub aggregate: PriceInfo,
    pub price_components: Vec<PriceComponent>,
    /// Aggregate price, defined only while `status` is Trading
    pub price: Option<f64>,
    /// Aggregate confidence, defined only while `status` is Trading
    pub confidence: Option<f64>,
    /// Aggregate status after the staleness rule
    pub status: PriceStatus,
}

impl PriceAccount {
    /// Re-derive `status`, `price` and `confidence` against `current_slot`.
    ///
    /// Starts from the raw aggregate, so it can be applied repeatedly as the
    /// ledger advances.
    pub fn refresh(&mut self, current_slot: Option<u64>) {
        self.status = effective_status(&self.aggregate, current_slot);
        if self.status == PriceStatus::Trading {
            self.price = Some(self.aggregate.price);
            self.confidence = Some(self.aggregate.confidence);
        } else {
            self.price = None;
            self.confidence = None;
        }
    }
}

/// Decode a price account.
///
/// With `current_slot`, a Trading aggregate published too long ago is
/// reported as Unknown (see [`crate::staleness`]).
pub fn decode_price(data: &[u8], current_slot: Option<u64>) -> DecodeResult<PriceAccount> {
    let reader = ByteReader::new(data);
    let header = Base::read(&reader)?;
    let exponent = reader.read_i32(20)?;

    let drv1_component = reader.read_i64(96)?;
    let previous_price_component = reader.read_i64(184)?;
    let previous_confidence_component = reader.read_u64(192)?;
    let drv5_component = reader.read_i64(200)?;

    let mut account = PriceAccount {
        header,
        price_type: PriceType::from(reader.read_u32(16)?),
        exponent,
        num_component_prices: reader.read_u32(24)?,
        num_quoters: reader.read_u32(28)?,
        last_slot: reader.read_u64(32)?,
        valid_slot: reader.read_u64(40)?,
        ema_price: Ema::read(&reader, 48, exponent)?,
        ema_confidence: Ema::read(&reader, 48 + EMA_LEN, exponent)?,
        drv1_component,
        drv1: scale(drv1_component as i128, exponent),
        min_publishers: reader.read_u8(104)?,
        drv2: reader.read_i8(105)?,
        drv3: reader.read_i16(106)?,
        drv4: reader.read_i32(108)?,
        product_account_key: reader.read_pubkey(112)?,
        next_price_account_key: reader.read_key(144)?,
        previous_slot: reader.read_u64(176)?,
        previous_price_component,
        previous_price: scale(previous_price_component as i128, exponent),
        previous_confidence_component,
        previous_confidence: scale(previous_confidence_component as i128, exponent),
        drv5_component,
        drv5: scale(drv5_component as i128, exponent),
        aggregate: PriceInfo::read(&reader, AGGREGATE_OFFSET, exponent)?,
        price_components: decode_components(&reader, exponent)?,
        price: None,
        confidence: None,
        status: PriceStatus::Unknown,
    };
    account.refresh(current_slot);

    Ok(account)
}

/// Components are packed from offset 240. The scan ends at the first
/// all-zero publisher, when no full key fits, or at [`MAX_COMPONENTS`].
fn decode_components(reader: &ByteReader<'_>, exponent: i32) -> DecodeResult<Vec<PriceComponent>> {
    let mut components = Vec::new();
    let mut offset = COMPONENTS_OFFSET;

    while components.len() < MAX_COMPONENTS && offset + KEY_LEN <= reader.len() {
        let Some(publisher) = reader.read_key(offset)? else {
            break;
        };
        let aggregate = PriceInfo::read(reader, offset + KEY_LEN, exponent)?;
        let latest = PriceInfo::read(reader, offset + KEY_LEN + PRICE_INFO_LEN, exponent)?;
        components.push(PriceComponent {
            publisher,
            aggregate,
            latest,
        });
        offset += COMPONENT_LEN;
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::test_utils::{key, PriceBuilder, PriceInfoFields};
    use proptest::prelude::*;

    fn trading(price: i64, conf: u64, slot: u64) -> PriceInfoFields {
        PriceInfoFields {
            price,
            confidence: conf,
            status: PriceStatus::Trading as u32,
            corp_action: 0,
            publish_slot: slot,
        }
    }

    #[test]
    fn test_decode_known_values() {
        let data = PriceBuilder::new()
            .exponent(-5)
            .product(key(1))
            .aggregate(trading(868_725, 1_310, 1000))
            .build();

        let price = decode_price(&data, None).unwrap();
        assert_eq!(price.header.magic, 0xA1B2C3D4);
        assert_eq!(price.header.version, 2);
        assert_eq!(price.header.tag, 3);
        assert_eq!(price.exponent, -5);
        assert_eq!(price.price_type, PriceType::Price);
        assert_eq!(price.product_account_key, key(1));
        assert_eq!(price.aggregate.price_component, 868_725);
        assert_eq!(price.status, PriceStatus::Trading);
        assert!((price.price.unwrap() - 8.68725).abs() < 1e-9);
        assert!((price.confidence.unwrap() - 0.0131).abs() < 1e-9);
        assert!(price.price_components.is_empty());
    }

    #[test]
    fn test_scalar_fields_at_fixed_offsets() {
        let data = PriceBuilder::new()
            .exponent(-8)
            .counts(7, 5)
            .slots(1_234, 1_240)
            .ema_price(4_200_000_000, -17, 99)
            .ema_confidence(1_000, 3, 4)
            .derived(-100, 3, -2, -300, 70_000)
            .product(key(8))
            .next(key(9))
            .previous(1_111, -5_000, 6_000)
            .drv5(-12)
            .aggregate(trading(1, 2, 1_239))
            .build();

        let price = decode_price(&data, None).unwrap();
        assert_eq!(price.num_component_prices, 7);
        assert_eq!(price.num_quoters, 5);
        assert_eq!(price.last_slot, 1_234);
        assert_eq!(price.valid_slot, 1_240);
        assert_eq!(price.ema_price.value_component, 4_200_000_000);
        assert!((price.ema_price.value - 42.0).abs() < 1e-9);
        assert_eq!(price.ema_price.numerator, -17);
        assert_eq!(price.ema_price.denominator, 99);
        assert_eq!(price.ema_confidence.value_component, 1_000);
        assert_eq!(price.ema_confidence.numerator, 3);
        assert_eq!(price.ema_confidence.denominator, 4);
        assert_eq!(price.drv1_component, -100);
        assert_eq!(price.min_publishers, 3);
        assert_eq!(price.drv2, -2);
        assert_eq!(price.drv3, -300);
        assert_eq!(price.drv4, 70_000);
        assert_eq!(price.next_price_account_key, Some(key(9)));
        assert_eq!(price.previous_slot, 1_111);
        assert_eq!(price.previous_price_component, -5_000);
        assert_eq!(price.previous_confidence_component, 6_000);
        assert_eq!(price.drv5_component, -12);
    }

    #[test]
    fn test_stale_after_threshold() {
        let data = PriceBuilder::new()
            .exponent(-5)
            .aggregate(trading(868_725, 1_310, 1000))
            .build();

        let fresh = decode_price(&data, Some(1025)).unwrap();
        assert_eq!(fresh.status, PriceStatus::Trading);
        assert!(fresh.price.is_some());
        assert!(fresh.confidence.is_some());

        let stale = decode_price(&data, Some(1026)).unwrap();
        assert_eq!(stale.status, PriceStatus::Unknown);
        assert_eq!(stale.price, None);
        assert_eq!(stale.confidence, None);
        // Raw aggregate is left untouched
        assert_eq!(stale.aggregate.status, PriceStatus::Trading);
        assert_eq!(stale.aggregate.price_component, 868_725);
    }

    #[test]
    fn test_non_trading_has_no_price() {
        let mut halted = trading(10, 1, 50);
        halted.status = PriceStatus::Halted as u32;
        let data = PriceBuilder::new().aggregate(halted).build();

        let price = decode_price(&data, Some(50)).unwrap();
        assert_eq!(price.status, PriceStatus::Halted);
        assert_eq!(price.price, None);
        assert_eq!(price.confidence, None);
    }

    #[test]
    fn test_component_list_stops_at_zero_publisher() {
        let mut data = PriceBuilder::new()
            .exponent(-2)
            .component(key(11), trading(100, 1, 10), trading(101, 2, 11))
            .component(key(12), trading(200, 1, 10), trading(201, 2, 11))
            .component(key(13), trading(300, 1, 10), trading(301, 2, 11))
            .build();
        data.extend_from_slice(&[0u8; KEY_LEN]);
        data.extend((0..200).map(|i| (i * 7 + 3) as u8));

        let price = decode_price(&data, None).unwrap();
        assert_eq!(price.price_components.len(), 3);
        assert_eq!(price.price_components[0].publisher, key(11));
        assert_eq!(price.price_components[2].publisher, key(13));
        assert_eq!(price.price_components[1].latest.price_component, 201);
        assert!((price.price_components[1].aggregate.price - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_component_scan_stops_at_end_of_buffer() {
        let mut data = PriceBuilder::new()
            .component(key(11), trading(100, 1, 10), trading(101, 2, 11))
            .build();
        // Fewer than 32 bytes left: not a publisher key
        data.extend_from_slice(&[0xAB; 20]);

        let price = decode_price(&data, None).unwrap();
        assert_eq!(price.price_components.len(), 1);
    }

    #[test]
    fn test_truncated_component_is_error() {
        let mut data = PriceBuilder::new()
            .component(key(11), trading(100, 1, 10), trading(101, 2, 11))
            .build();
        data.truncate(data.len() - 8);

        assert!(matches!(
            decode_price(&data, None),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_components_capped() {
        let mut builder = PriceBuilder::new();
        for i in 0..(MAX_COMPONENTS as u8 + 2) {
            builder = builder.component(key(100 + i), trading(1, 1, 1), trading(1, 1, 1));
        }
        let price = decode_price(&builder.build(), None).unwrap();
        assert_eq!(price.price_components.len(), MAX_COMPONENTS);
    }

    #[test]
    fn test_short_buffer_is_error() {
        let data = PriceBuilder::new().build();
        assert!(decode_price(&data[..AGGREGATE_OFFSET], None).is_err());
    }

    #[test]
    fn test_refresh_can_restore_trading() {
        let data = PriceBuilder::new().aggregate(trading(5, 1, 100)).build();
        let mut price = decode_price(&data, Some(500)).unwrap();
        assert_eq!(price.status, PriceStatus::Unknown);

        price.refresh(Some(110));
        assert_eq!(price.status, PriceStatus::Trading);
        assert_eq!(price.price, Some(price.aggregate.price));
    }

    proptest! {
        #[test]
        fn prop_decode_price_is_idempotent(
            exponent in -12i32..4,
            magnitude in any::<i64>(),
            conf in any::<u64>(),
            status in 0u32..6,
            publish_slot in 0u64..1_000_000,
            current in proptest::option::of(0u64..1_000_100),
        ) {
            let data = PriceBuilder::new()
                .exponent(exponent)
                .aggregate(PriceInfoFields {
                    price: magnitude,
                    confidence: conf,
                    status,
                    corp_action: 0,
                    publish_slot,
                })
                .component(key(1), trading(magnitude, conf, publish_slot), trading(1, 1, 1))
                .build();

            let first = decode_price(&data, current).unwrap();
            let second = decode_price(&data, current).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
