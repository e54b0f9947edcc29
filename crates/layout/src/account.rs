//! Dispatch on the account type tag

use crate::base::{decode_header, AccountType, Base};
use crate::error::{DecodeError, DecodeResult};
use crate::mapping::{decode_mapping, MappingAccount};
use crate::permission::{decode_permission, PermissionAccount};
use crate::price::{decode_price, PriceAccount};
use crate::product::{decode_product, ProductAccount};

/// Any decoded oracle account
#[derive(Debug, Clone, PartialEq)]
pub enum Account {
    Mapping(MappingAccount),
    Product(ProductAccount),
    Price(PriceAccount),
    Permission(PermissionAccount),
    /// Test accounts carry nothing beyond the header
    Test(Base),
}

impl Account {
    pub fn header(&self) -> &Base {
        match self {
            Account::Mapping(a) => &a.header,
            Account::Product(a) => &a.header,
            Account::Price(a) => &a.header,
            Account::Permission(a) => &a.header,
            Account::Test(base) => base,
        }
    }
}

/// Decode any buffer owned by the oracle program.
///
/// - `Ok(None)`: not an oracle account (short buffer or wrong magic)
/// - `Err(OutOfBounds)`: an oracle account cut short
/// - `Err(UnknownAccountType)`: the tag is `Unknown` or newer than this decoder
pub fn decode_account(data: &[u8], current_slot: Option<u64>) -> DecodeResult<Option<Account>> {
    let Some(base) = decode_header(data)? else {
        return Ok(None);
    };

    let account = match base.account_type()? {
        AccountType::Mapping => Account::Mapping(decode_mapping(data)?),
        AccountType::Product => Account::Product(decode_product(data)?),
        AccountType::Price => Account::Price(decode_price(data, current_slot)?),
        AccountType::Permission => Account::Permission(decode_permission(data)?),
        AccountType::Test => Account::Test(base),
        AccountType::Unknown => return Err(DecodeError::UnknownAccountType { tag: base.tag }),
    };

    Ok(Some(account))
}
