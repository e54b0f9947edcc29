//! Price observers and their dispatch

use std::sync::Arc;

use parking_lot::Mutex;
use pyth_layout::{PriceAccount, ProductAttributes, Pubkey};

use crate::error::ClientError;
use crate::index::ProductUpdate;

/// A decoded price account together with where and when it was observed
#[derive(Debug, Clone, PartialEq)]
pub struct PriceUpdate {
    pub key: Pubkey,
    pub slot: u64,
    pub account: PriceAccount,
}

type VerboseObserver = Arc<dyn Fn(&ProductUpdate, &PriceUpdate) + Send + Sync>;
type ErrorObserver = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Ordered list of price observers.
///
/// Observers run synchronously, in registration order, on the task that
/// received the update. Clones share the same list.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    observers: Arc<Mutex<Vec<VerboseObserver>>>,
    error_observers: Arc<Mutex<Vec<ErrorObserver>>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer that sees the product metadata and decoded price
    pub fn on_price_change<F>(&self, observer: F)
    where
        F: Fn(&ProductAttributes, &PriceAccount) + Send + Sync + 'static,
    {
        self.on_price_change_verbose(move |product, price| {
            observer(&product.account.attributes, &price.account)
        });
    }

    /// Register an observer that also sees account keys and update slots
    pub fn on_price_change_verbose<F>(&self, observer: F)
    where
        F: Fn(&ProductUpdate, &PriceUpdate) + Send + Sync + 'static,
    {
        self.observers.lock().push(Arc::new(observer));
    }

    /// Register an observer for per-update errors
    pub fn on_error<F>(&self, observer: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.error_observers.lock().push(Arc::new(observer));
    }

    pub fn dispatch(&self, product: &ProductUpdate, price: &PriceUpdate) {
        // Snapshot so observers may register or clear without deadlocking
        let observers = self.observers.lock().clone();
        for observer in observers {
            observer(product, price);
        }
    }

    pub fn report(&self, error: &ClientError) {
        let observers = self.error_observers.lock().clone();
        for observer in observers {
            observer(error);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.lock().is_empty()
    }

    /// Drop every observer. No dispatch started afterwards reaches them.
    pub fn clear(&self) {
        self.observers.lock().clear();
        self.error_observers.lock().clear();
    }
}
