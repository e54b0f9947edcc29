//! Account sources: where raw account bytes come from
//!
//! The clients never talk to the network directly. They ask an
//! [`AccountSource`] for program accounts, the current slot and live change
//! notifications. [`crate::rpc::RpcAccountSource`] serves these from a
//! Solana cluster; [`InMemorySource`] serves them from memory, for replaying
//! captured accounts and for tests.

use std::future::Future;

use anyhow::Result;
use parking_lot::Mutex;
use pyth_layout::Pubkey;
use tokio::sync::mpsc;

/// New contents of the account at `key`, observed at `slot`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountUpdate {
    pub key: Pubkey,
    pub data: Vec<u8>,
    pub slot: u64,
}

pub trait AccountSource: Send + Sync {
    /// Every account owned by `program`
    fn program_accounts(
        &self,
        program: &Pubkey,
    ) -> impl Future<Output = Result<Vec<(Pubkey, Vec<u8>)>>> + Send;

    fn current_slot(&self) -> impl Future<Output = Result<u64>> + Send;

    /// Accounts by key, in request order; `None` where no account exists
    fn accounts(&self, keys: &[Pubkey]) -> impl Future<Output = Result<Vec<Option<Vec<u8>>>>> + Send;

    /// Change notifications for accounts owned by `program`
    fn subscribe_program(
        &self,
        program: &Pubkey,
    ) -> impl Future<Output = Result<mpsc::UnboundedReceiver<AccountUpdate>>> + Send;

    /// Slot advance notifications
    fn subscribe_slots(&self) -> impl Future<Output = Result<mpsc::UnboundedReceiver<u64>>> + Send;
}

#[derive(Default)]
struct MemoryState {
    accounts: Vec<(Pubkey, Vec<u8>)>,
    slot: u64,
    account_subscribers: Vec<mpsc::UnboundedSender<AccountUpdate>>,
    slot_subscribers: Vec<mpsc::UnboundedSender<u64>>,
}

/// Account source backed by an in-memory account set.
///
/// Accounts are returned in insertion order. The source does not track
/// program ownership: every stored account belongs to whichever program is
/// asked about.
#[derive(Default)]
pub struct InMemorySource {
    state: Mutex<MemoryState>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<(Pubkey, Vec<u8>)>, slot: u64) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                accounts,
                slot,
                ..Default::default()
            }),
        }
    }

    /// Insert or replace an account without notifying subscribers
    pub fn insert(&self, key: Pubkey, data: Vec<u8>) {
        let mut state = self.state.lock();
        match state.accounts.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = data,
            None => state.accounts.push((key, data)),
        }
    }

    /// Write an account and notify program subscribers
    pub fn write(&self, key: Pubkey, data: Vec<u8>, slot: u64) {
        self.insert(key, data.clone());
        let update = AccountUpdate { key, data, slot };
        let mut state = self.state.lock();
        state
            .account_subscribers
            .retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Advance the slot and notify slot subscribers
    pub fn set_slot(&self, slot: u64) {
        let mut state = self.state.lock();
        state.slot = slot;
        state.slot_subscribers.retain(|tx| tx.send(slot).is_ok());
    }

    /// Drop every subscriber, ending their streams
    pub fn close_subscriptions(&self) {
        self.close_account_subscriptions();
        self.close_slot_subscriptions();
    }

    pub fn close_account_subscriptions(&self) {
        self.state.lock().account_subscribers.clear();
    }

    pub fn close_slot_subscriptions(&self) {
        self.state.lock().slot_subscribers.clear();
    }
}

impl AccountSource for InMemorySource {
    async fn program_accounts(&self, _program: &Pubkey) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        Ok(self.state.lock().accounts.clone())
    }

    async fn current_slot(&self) -> Result<u64> {
        Ok(self.state.lock().slot)
    }

    async fn accounts(&self, keys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>> {
        let state = self.state.lock();
        Ok(keys
            .iter()
            .map(|key| {
                state
                    .accounts
                    .iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, data)| data.clone())
            })
            .collect())
    }

    async fn subscribe_program(&self, _program: &Pubkey) -> Result<mpsc::UnboundedReceiver<AccountUpdate>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().account_subscribers.push(tx);
        Ok(rx)
    }

    async fn subscribe_slots(&self) -> Result<mpsc::UnboundedReceiver<u64>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().slot_subscribers.push(tx);
        Ok(rx)
    }
}
