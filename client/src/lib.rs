//! Pyth Oracle Client
//!
//! Reads oracle prices from the accounts of the Pyth program, either as a
//! one-shot snapshot ([`PythHttpClient`]) or as a live stream pushed to
//! observers ([`PythConnection`]).
//!
//! Both clients correlate each price account with the product that points
//! at it and apply the staleness rule: an aggregate published more than
//! [`pyth_layout::MAX_SLOT_DIFFERENCE`] slots ago is reported as Unknown.

pub mod cluster;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod http_client;
pub mod index;
pub mod rpc;
pub mod source;
pub mod staleness;

pub use cluster::Cluster;
pub use config::{Config, Mode};
pub use connection::PythConnection;
pub use dispatch::{ObserverRegistry, PriceUpdate};
pub use error::{ClientError, ClientResult};
pub use http_client::{PythHttpClient, PythSnapshot};
pub use index::{CorrelationIndex, ProductUpdate};
pub use rpc::RpcAccountSource;
pub use source::{AccountSource, AccountUpdate, InMemorySource};
pub use staleness::{StalenessQueue, TrackedPrice};
