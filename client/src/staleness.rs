//! Priority queue of Trading prices awaiting staleness (min-heap by publish slot)

use priority_queue::PriorityQueue;
use pyth_layout::staleness::is_stale;
use pyth_layout::{PriceStatus, Pubkey};
use std::cmp::Reverse;
use std::collections::HashMap;

/// Last dispatched Trading price of one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPrice {
    /// Price account key
    pub key: Pubkey,
    /// Publish slot of the dispatched aggregate
    pub publish_slot: u64,
    /// Raw account bytes, re-decoded once the price goes stale
    pub data: Vec<u8>,
}

/// Prices that were Trading when last dispatched.
///
/// Ordered by publish slot so a slot advance only inspects the entries
/// that can be due. A newer update for a key replaces its entry.
pub struct StalenessQueue {
    /// Priority queue (using Reverse for min-heap)
    queue: PriorityQueue<Pubkey, Reverse<u64>>,
    /// Map for O(1) lookups
    map: HashMap<Pubkey, TrackedPrice>,
}

impl StalenessQueue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            map: HashMap::new(),
        }
    }

    /// Record the latest dispatched status of a price account.
    ///
    /// Trading prices are (re)queued under their publish slot; any other
    /// status drops the key, since only Trading can go stale.
    pub fn track(&mut self, key: Pubkey, status: PriceStatus, publish_slot: u64, data: &[u8]) {
        if status != PriceStatus::Trading {
            self.remove(&key);
            return;
        }

        self.map.insert(
            key,
            TrackedPrice {
                key,
                publish_slot,
                data: data.to_vec(),
            },
        );
        self.queue.push(key, Reverse(publish_slot));
    }

    /// Pop every entry that is stale at `current_slot`, oldest first
    pub fn pop_due(&mut self, current_slot: u64) -> Vec<TrackedPrice> {
        let mut due = Vec::new();

        while let Some((_, Reverse(publish_slot))) = self.queue.peek() {
            if !is_stale(*publish_slot, current_slot) {
                break;
            }
            let Some((key, _)) = self.queue.pop() else {
                break;
            };
            if let Some(tracked) = self.map.remove(&key) {
                due.push(tracked);
            }
        }

        due
    }

    /// Peek at the entry that goes stale first
    pub fn peek(&self) -> Option<&TrackedPrice> {
        let (key, _priority) = self.queue.peek()?;
        self.map.get(key)
    }

    /// Remove price from queue
    pub fn remove(&mut self, key: &Pubkey) -> Option<TrackedPrice> {
        self.queue.remove(key);
        self.map.remove(key)
    }

    pub fn get(&self, key: &Pubkey) -> Option<&TrackedPrice> {
        self.map.get(key)
    }

    pub fn contains(&self, key: &Pubkey) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
    }
}

impl Default for StalenessQueue {
    fn default() -> Self {
        Self::new()
    }
}
