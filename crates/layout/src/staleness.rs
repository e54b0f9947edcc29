//! Staleness rule for aggregate prices
//!
//! A Trading aggregate is only trusted for [`MAX_SLOT_DIFFERENCE`] slots
//! after its publish slot. Past that it reads as Unknown, without a price or
//! confidence, until the oracle publishes again.

use crate::price::{PriceInfo, PriceStatus};

/// Number of slots that can pass before a price is no longer trusted
pub const MAX_SLOT_DIFFERENCE: u64 = 25;

/// True once `current_slot` is more than [`MAX_SLOT_DIFFERENCE`] past `publish_slot`
pub fn is_stale(publish_slot: u64, current_slot: u64) -> bool {
    current_slot.saturating_sub(publish_slot) > MAX_SLOT_DIFFERENCE
}

/// Status of `aggregate` as seen at `current_slot`.
///
/// Without a current slot the raw status is returned unchanged.
pub fn effective_status(aggregate: &PriceInfo, current_slot: Option<u64>) -> PriceStatus {
    match (aggregate.status, current_slot) {
        (PriceStatus::Trading, Some(slot)) if is_stale(aggregate.publish_slot, slot) => {
            PriceStatus::Unknown
        }
        (status, _) => status,
    }
}
