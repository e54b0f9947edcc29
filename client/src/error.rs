//! Client errors

use pyth_layout::{DecodeError, Pubkey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Failure inside the account source (RPC, websocket, ...)
    #[error("Transport error: {0:#}")]
    Transport(#[from] anyhow::Error),

    /// A live price update arrived for a product that was never enumerated
    #[error(
        "Got a price update for an unknown product (price account {price_key}). \
         This is a bug in the client, please report it"
    )]
    UnknownProduct { price_key: Pubkey },

    /// A live update stream ended; the watcher receives nothing further
    #[error("The {stream} subscription ended")]
    SubscriptionClosed { stream: &'static str },

    #[error("Account {key} does not exist")]
    AccountNotFound { key: Pubkey },

    #[error("Account {key} is not a price account")]
    NotAPriceAccount { key: Pubkey },
}

pub type ClientResult<T> = Result<T, ClientError>;
