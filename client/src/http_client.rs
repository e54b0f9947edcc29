//! Bulk client: one snapshot of every oracle price per request

use std::collections::{HashMap, HashSet};

use pyth_layout::{
    decode_header, decode_permission, decode_price, decode_product, AccountType, DecodeError,
    PermissionAccount, PriceAccount, Pubkey,
};

use crate::dispatch::PriceUpdate;
use crate::error::{ClientError, ClientResult};
use crate::index::{CorrelationIndex, ProductUpdate};
use crate::source::AccountSource;

/// Every product and correlated price read from one fetch
#[derive(Debug, Clone, Default)]
pub struct PythSnapshot {
    /// Slot the staleness rule was applied against
    pub slot: u64,
    /// Distinct asset types, in first-seen order
    pub asset_types: Vec<String>,
    /// Distinct symbols, in first-seen order
    pub symbols: Vec<String>,
    /// Every product account, in fetch order
    pub products: Vec<ProductUpdate>,
    pub product_from_symbol: HashMap<String, ProductUpdate>,
    pub product_price: HashMap<String, PriceUpdate>,
    /// Every price account with a known product
    pub prices: Vec<PriceUpdate>,
    pub permission: Option<PermissionAccount>,
}

impl PythSnapshot {
    pub fn products_with_asset_type(&self, asset_type: &str) -> Vec<&ProductUpdate> {
        self.products
            .iter()
            .filter(|p| p.account.attributes.asset_type() == Some(asset_type))
            .collect()
    }

    pub fn product_for_symbol(&self, symbol: &str) -> Option<&ProductUpdate> {
        self.product_from_symbol.get(symbol)
    }

    pub fn price_for_symbol(&self, symbol: &str) -> Option<&PriceUpdate> {
        self.product_price.get(symbol)
    }
}

/// Reads oracle prices with one program-wide fetch per call.
///
/// Price accounts may precede their product in the fetched set, so prices
/// are queued during the first pass and correlated once every product has
/// been registered.
pub struct PythHttpClient<S> {
    source: S,
    program_key: Pubkey,
    index: CorrelationIndex,
}

impl<S: AccountSource> PythHttpClient<S> {
    pub fn new(source: S, program_key: Pubkey) -> Self {
        Self {
            source,
            program_key,
            index: CorrelationIndex::new(),
        }
    }

    pub fn program_key(&self) -> &Pubkey {
        &self.program_key
    }

    /// Index built by the last successful [`Self::get_data`]
    pub fn index(&self) -> &CorrelationIndex {
        &self.index
    }

    /// Fetch and decode every account of the program.
    ///
    /// All or nothing: a decode error fails the call and leaves the index
    /// from the previous call in place.
    pub async fn get_data(&mut self) -> ClientResult<PythSnapshot> {
        let (accounts, slot) = tokio::try_join!(
            self.source.program_accounts(&self.program_key),
            self.source.current_slot(),
        )?;
        log::debug!("Fetched {} accounts at slot {}", accounts.len(), slot);

        let mut index = CorrelationIndex::new();
        let mut snapshot = PythSnapshot {
            slot,
            ..Default::default()
        };
        let mut price_queue = Vec::new();

        for (key, data) in &accounts {
            // The program owns accounts that don't contain oracle data
            let Some(base) = decode_header(data)? else {
                continue;
            };

            match base.account_type()? {
                AccountType::Product => {
                    let product = ProductUpdate {
                        key: *key,
                        slot,
                        account: decode_product(data)?,
                    };
                    index.observe_product(*key, product.account.clone(), slot);
                    snapshot.products.push(product);
                }
                AccountType::Price => price_queue.push((*key, data)),
                AccountType::Permission => snapshot.permission = Some(decode_permission(data)?),
                // Every product is reachable without walking the mapping list
                AccountType::Mapping | AccountType::Test => {}
                AccountType::Unknown => {
                    return Err(DecodeError::UnknownAccountType { tag: base.tag }.into())
                }
            }
        }

        let mut seen_asset_types = HashSet::new();
        let mut seen_symbols = HashSet::new();
        for product in &snapshot.products {
            let attrs = &product.account.attributes;
            if let Some(asset_type) = attrs.asset_type() {
                if seen_asset_types.insert(asset_type) {
                    snapshot.asset_types.push(asset_type.to_string());
                }
            }
            if let Some(symbol) = attrs.symbol() {
                if seen_symbols.insert(symbol) {
                    snapshot.symbols.push(symbol.to_string());
                }
                snapshot
                    .product_from_symbol
                    .insert(symbol.to_string(), product.clone());
            }
        }

        for (key, data) in price_queue {
            let Some(product) = index.resolve_product_for(&key) else {
                log::debug!("Dropping price account {} with no known product", key);
                continue;
            };

            let price = PriceUpdate {
                key,
                slot,
                account: decode_price(data, Some(slot))?,
            };
            if let Some(symbol) = product.account.attributes.symbol() {
                snapshot
                    .product_price
                    .insert(symbol.to_string(), price.clone());
            }
            snapshot.prices.push(price);
        }

        log::debug!(
            "Snapshot at slot {}: {} products, {} prices",
            slot,
            snapshot.products.len(),
            snapshot.prices.len()
        );
        self.index = index;

        Ok(snapshot)
    }

    /// Fetch specific price accounts.
    ///
    /// The result has one entry per requested key, in request order. A key
    /// with no account, or whose account is not a price account, fails the
    /// whole call with an error naming that key.
    pub async fn get_asset_prices_from_accounts(&self, keys: &[Pubkey]) -> ClientResult<Vec<PriceAccount>> {
        let (accounts, slot) = tokio::try_join!(self.source.accounts(keys), self.source.current_slot())?;

        if accounts.len() != keys.len() {
            return Err(anyhow::anyhow!(
                "Requested {} accounts, received {}",
                keys.len(),
                accounts.len()
            )
            .into());
        }

        keys.iter()
            .zip(accounts)
            .map(|(key, data)| -> ClientResult<PriceAccount> {
                let data = data.ok_or(ClientError::AccountNotFound { key: *key })?;
                match decode_header(&data)?.map(|base| base.account_type()) {
                    Some(Ok(AccountType::Price)) => Ok(decode_price(&data, Some(slot))?),
                    _ => Err(ClientError::NotAPriceAccount { key: *key }),
                }
            })
            .collect()
    }
}
