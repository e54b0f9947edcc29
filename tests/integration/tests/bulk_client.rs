//! Bulk snapshot scenarios

use pyth_client::{ClientError, InMemorySource, PythHttpClient};
use pyth_integration_tests::{default_feeds, oracle_accounts, permission_key, program_key, Feed};
use pyth_layout::test_utils::{header_bytes, key};
use pyth_layout::{DecodeError, PriceStatus};

fn client(accounts: Vec<(pyth_layout::Pubkey, Vec<u8>)>, slot: u64) -> PythHttpClient<InMemorySource> {
    PythHttpClient::new(InMemorySource::with_accounts(accounts, slot), program_key())
}

#[tokio::test]
async fn test_snapshot_independent_of_account_order() {
    for prices_first in [false, true] {
        let mut client = client(oracle_accounts(&default_feeds(), prices_first), 1_010);
        let snapshot = client.get_data().await.unwrap();

        assert_eq!(snapshot.slot, 1_010);
        assert_eq!(
            snapshot.symbols,
            vec!["Crypto.BTC/USD", "Crypto.ETH/USD", "FX.EUR/USD"]
        );
        assert_eq!(snapshot.asset_types, vec!["Crypto", "FX"]);
        assert_eq!(snapshot.prices.len(), 3);
        assert_eq!(snapshot.products_with_asset_type("Crypto").len(), 2);

        let btc = snapshot.price_for_symbol("Crypto.BTC/USD").unwrap();
        assert_eq!(btc.account.status, PriceStatus::Trading);
        assert!((btc.account.price.unwrap() - 65_123.456_78).abs() < 1e-6);
        assert!((btc.account.confidence.unwrap() - 25.0).abs() < 1e-9);
        assert_eq!(btc.account.price_components.len(), 2);

        let eth = snapshot.product_for_symbol("Crypto.ETH/USD").unwrap();
        assert_eq!(eth.account.attributes.quote_currency(), Some("USD"));

        let eur = snapshot.price_for_symbol("FX.EUR/USD").unwrap();
        assert_eq!(eur.account.status, PriceStatus::Halted);
        assert!(eur.account.price.is_none());

        let permission = snapshot.permission.as_ref().unwrap();
        assert_eq!(permission.master_authority, key(210));
    }
}

#[tokio::test]
async fn test_stale_prices_reported_unknown() {
    let mut client = client(oracle_accounts(&default_feeds(), false), 1_026);
    let snapshot = client.get_data().await.unwrap();

    for symbol in ["Crypto.BTC/USD", "Crypto.ETH/USD"] {
        let price = snapshot.price_for_symbol(symbol).unwrap();
        assert_eq!(price.account.status, PriceStatus::Unknown);
        assert_eq!(price.account.aggregate.status, PriceStatus::Trading);
        assert!(price.account.price.is_none());
    }
    // Only Trading prices can go stale
    assert_eq!(
        snapshot.price_for_symbol("FX.EUR/USD").unwrap().account.status,
        PriceStatus::Halted
    );
}

#[tokio::test]
async fn test_unknown_account_type_fails_whole_fetch() {
    let mut accounts = oracle_accounts(&default_feeds(), false);
    let mut client = client(accounts.clone(), 1_010);
    client.get_data().await.unwrap();
    assert_eq!(client.index().len(), 3);

    accounts.insert(1, (key(77), header_bytes(99, 16)));
    let mut failing = PythHttpClient::new(InMemorySource::with_accounts(accounts, 1_010), program_key());
    let err = failing.get_data().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Decode(DecodeError::UnknownAccountType { tag: 99 })
    ));
    assert!(failing.index().is_empty());
}

#[tokio::test]
async fn test_orphan_price_is_dropped() {
    let feeds = default_feeds();
    let mut accounts = oracle_accounts(&feeds, false);
    let orphan = Feed::new(9, "Crypto.DOGE/USD", "Crypto");
    accounts.push((orphan.price_key, orphan.price_bytes()));

    let mut client = client(accounts, 1_010);
    let snapshot = client.get_data().await.unwrap();
    assert_eq!(snapshot.prices.len(), feeds.len());
    assert!(snapshot.prices.iter().all(|p| p.key != orphan.price_key));
}

#[tokio::test]
async fn test_prices_by_account_key() {
    let feeds = default_feeds();
    let client = client(oracle_accounts(&feeds, true), 1_010);

    let prices = client
        .get_asset_prices_from_accounts(&[feeds[2].price_key, feeds[0].price_key])
        .await
        .unwrap();
    assert_eq!(prices.len(), 2);
    assert_eq!(prices[0].product_account_key, feeds[2].product_key);
    assert_eq!(prices[1].product_account_key, feeds[0].product_key);

    let err = client
        .get_asset_prices_from_accounts(&[feeds[0].price_key, permission_key()])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotAPriceAccount { key: k } if k == permission_key()));
}
