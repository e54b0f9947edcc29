//! Subscription client: live price updates pushed to observers

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use pyth_layout::{
    decode_header, decode_price, decode_product, AccountType, DecodeError, PriceAccount,
    ProductAttributes, Pubkey,
};
use tokio::task::JoinHandle;

use crate::dispatch::{ObserverRegistry, PriceUpdate};
use crate::error::{ClientError, ClientResult};
use crate::index::{CorrelationIndex, ProductUpdate};
use crate::source::{AccountSource, AccountUpdate};
use crate::staleness::StalenessQueue;

#[derive(Default)]
struct FeedState {
    index: CorrelationIndex,
    staleness: StalenessQueue,
}

/// Reads oracle prices from live account subscriptions.
///
/// [`Self::start`] enumerates every account of the program once to learn
/// all products, then streams changes. Each price account change is
/// decoded against the slot it was observed at and handed to the
/// registered observers together with its product. Prices that were
/// Trading are re-dispatched as Unknown once enough slots pass without a
/// new publish.
pub struct PythConnection<S> {
    source: Arc<S>,
    program_key: Pubkey,
    feeds: Option<Arc<HashSet<Pubkey>>>,
    state: Arc<Mutex<FeedState>>,
    observers: ObserverRegistry,
}

impl<S> Clone for PythConnection<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            program_key: self.program_key,
            feeds: self.feeds.clone(),
            state: self.state.clone(),
            observers: self.observers.clone(),
        }
    }
}

impl<S: AccountSource + 'static> PythConnection<S> {
    pub fn new(source: Arc<S>, program_key: Pubkey) -> Self {
        Self {
            source,
            program_key,
            feeds: None,
            state: Arc::new(Mutex::new(FeedState::default())),
            observers: ObserverRegistry::new(),
        }
    }

    /// Only dispatch updates for these price accounts. An empty list keeps all.
    pub fn with_feeds(mut self, feeds: impl IntoIterator<Item = Pubkey>) -> Self {
        let feeds: HashSet<Pubkey> = feeds.into_iter().collect();
        self.feeds = if feeds.is_empty() {
            None
        } else {
            Some(Arc::new(feeds))
        };
        self
    }

    /// Register callback to receive price updates
    pub fn on_price_change<F>(&self, observer: F)
    where
        F: Fn(&ProductAttributes, &PriceAccount) + Send + Sync + 'static,
    {
        self.observers.on_price_change(observer);
    }

    /// Register a callback that also receives account keys and slots
    pub fn on_price_change_verbose<F>(&self, observer: F)
    where
        F: Fn(&ProductUpdate, &PriceUpdate) + Send + Sync + 'static,
    {
        self.observers.on_price_change_verbose(observer);
    }

    /// Register callback to receive per-update errors
    pub fn on_error<F>(&self, observer: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.observers.on_error(observer);
    }

    /// Start receiving price updates.
    ///
    /// Subscribes first and enumerates second, so changes made during the
    /// enumeration are buffered rather than lost. A subscription the source
    /// cannot establish fails the call.
    ///
    /// Returns the handle of the task that drives the subscriptions. The task
    /// ends, reporting [`ClientError::SubscriptionClosed`], as soon as either
    /// the account or the slot stream ends.
    pub async fn start(&self) -> ClientResult<JoinHandle<()>> {
        let mut account_updates = self.source.subscribe_program(&self.program_key).await?;
        let mut slot_updates = self.source.subscribe_slots().await?;

        let (accounts, slot) = tokio::try_join!(
            self.source.program_accounts(&self.program_key),
            self.source.current_slot(),
        )?;
        {
            let mut state = self.state.lock();
            state.index.reset();
            state.staleness.clear();
        }
        for (key, data) in &accounts {
            self.handle_account(key, data, slot, true)?;
        }
        log::info!(
            "Tracking {} products of program {} from slot {}",
            self.state.lock().index.len(),
            self.program_key,
            slot
        );

        let this = self.clone();
        Ok(tokio::spawn(async move {
            // Either stream ending leaves the watcher blind, so both end the task
            let stream = loop {
                tokio::select! {
                    update = account_updates.recv() => match update {
                        Some(update) => {
                            if let Err(e) = this.handle_update(&update) {
                                this.report(&e);
                            }
                        }
                        None => break "account",
                    },
                    slot = slot_updates.recv() => match slot {
                        Some(slot) => {
                            this.handle_slot(slot);
                        }
                        None => break "slot",
                    },
                }
            };
            this.report(&ClientError::SubscriptionClosed { stream });
            log::info!("Subscriptions for program {} ended", this.program_key);
        }))
    }

    /// Stop receiving price updates.
    ///
    /// Drops every registered observer; dispatches already running finish,
    /// none start afterwards. The subscriptions themselves stay open.
    pub fn stop(&self) {
        self.observers.clear();
        log::info!("Price observers cleared");
    }

    /// Process one account change notification
    pub fn handle_update(&self, update: &AccountUpdate) -> ClientResult<()> {
        self.handle_account(&update.key, &update.data, update.slot, false)
    }

    fn handle_account(&self, key: &Pubkey, data: &[u8], slot: u64, product_only: bool) -> ClientResult<()> {
        let Some(base) = decode_header(data)? else {
            return Ok(());
        };

        match base.account_type()? {
            AccountType::Product => {
                let product = decode_product(data)?;
                self.state.lock().index.observe_product(*key, product, slot);
                Ok(())
            }
            AccountType::Price if !product_only => self.handle_price(key, data, slot),
            AccountType::Price
            | AccountType::Mapping
            | AccountType::Test
            | AccountType::Permission => Ok(()),
            AccountType::Unknown => Err(DecodeError::UnknownAccountType { tag: base.tag }.into()),
        }
    }

    fn handle_price(&self, key: &Pubkey, data: &[u8], slot: u64) -> ClientResult<()> {
        let (product, price) = {
            let mut state = self.state.lock();
            let product = state
                .index
                .resolve_product_for(key)
                .cloned()
                .ok_or(ClientError::UnknownProduct { price_key: *key })?;

            if !self.wants(key) {
                return Ok(());
            }

            let account = decode_price(data, Some(slot))?;
            state
                .staleness
                .track(*key, account.status, account.aggregate.publish_slot, data);
            (
                product,
                PriceUpdate {
                    key: *key,
                    slot,
                    account,
                },
            )
        };

        self.observers.dispatch(&product, &price);
        Ok(())
    }

    /// Re-dispatch every tracked price that went stale by `slot`.
    ///
    /// Returns the number of prices re-dispatched. Failures are reported to
    /// the error observers.
    pub fn handle_slot(&self, slot: u64) -> usize {
        let mut ready = Vec::new();
        let mut failures = Vec::new();
        {
            let mut state = self.state.lock();
            for tracked in state.staleness.pop_due(slot) {
                let Some(product) = state.index.resolve_product_for(&tracked.key).cloned() else {
                    failures.push(ClientError::UnknownProduct {
                        price_key: tracked.key,
                    });
                    continue;
                };
                match decode_price(&tracked.data, Some(slot)) {
                    Ok(account) => {
                        log::warn!(
                            "Price {} went stale at slot {} (published at {})",
                            tracked.key,
                            slot,
                            tracked.publish_slot
                        );
                        ready.push((
                            product,
                            PriceUpdate {
                                key: tracked.key,
                                slot,
                                account,
                            },
                        ));
                    }
                    Err(e) => failures.push(e.into()),
                }
            }
        }

        for e in &failures {
            self.report(e);
        }
        for (product, price) in &ready {
            self.observers.dispatch(product, price);
        }
        ready.len()
    }

    /// Number of products learned so far
    pub fn product_count(&self) -> usize {
        self.state.lock().index.len()
    }

    /// Number of Trading prices awaiting a staleness check
    pub fn tracked_count(&self) -> usize {
        self.state.lock().staleness.len()
    }

    fn wants(&self, key: &Pubkey) -> bool {
        self.feeds.as_ref().map_or(true, |feeds| feeds.contains(key))
    }

    fn report(&self, error: &ClientError) {
        log::error!("Error processing price update: {}", error);
        self.observers.report(error);
    }
}
