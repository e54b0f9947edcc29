//! Pyth Oracle Account Layout
//!
//! Decoders for the accounts owned by the Pyth oracle program. All integers
//! are little-endian; every account starts with the same 16-byte header.
//!
//! ## Account Structure
//!
//! ```text
//! Header (16 bytes):
//!   magic: u32      - 0xA1B2C3D4
//!   version: u32    - format version (2)
//!   type: u32       - Mapping=1, Product=2, Price=3, Test=4, Permission=5
//!   size: u32       - used size in bytes
//!
//! Mapping:     count @16, next mapping @24, product keys @56..
//! Product:     price account @16, length-prefixed key/value pairs @48..size
//! Price:       scalars @16..112, keys @112/@144, aggregate @208,
//!              components @240 (96 bytes each)
//! Permission:  master @16, data curation @48, security @80
//! ```
//!
//! Keys that are all zero decode as `None`.

pub mod account;
pub mod base;
pub mod error;
pub mod mapping;
pub mod permission;
pub mod price;
pub mod product;
pub mod reader;
pub mod staleness;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use account::{decode_account, Account};
pub use base::{decode_base, decode_header, AccountType, Base, MAGIC, VERSION};
pub use error::{DecodeError, DecodeResult};
pub use mapping::{decode_mapping, MappingAccount};
pub use permission::{decode_permission, PermissionAccount};
pub use price::{decode_price, Ema, PriceAccount, PriceComponent, PriceInfo, PriceStatus, PriceType};
pub use product::{decode_product, ProductAccount, ProductAttributes};
pub use staleness::MAX_SLOT_DIFFERENCE;

pub use solana_program::pubkey::Pubkey;
