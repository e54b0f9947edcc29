//! Live subscription scenarios

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pyth_client::{ClientError, InMemorySource, PythConnection};
use pyth_integration_tests::{default_feeds, oracle_accounts, program_key, Feed};
use pyth_layout::PriceStatus;
use tokio::sync::mpsc;

type Event = (String, u64, PriceStatus, Option<f64>);

async fn next(rx: &mut mpsc::UnboundedReceiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a price update")
        .expect("observer channel closed")
}

fn started(
    source: &Arc<InMemorySource>,
) -> (PythConnection<InMemorySource>, mpsc::UnboundedReceiver<Event>) {
    let connection = PythConnection::new(source.clone(), program_key());
    let (tx, rx) = mpsc::unbounded_channel();
    connection.on_price_change_verbose(move |product, price| {
        let symbol = product.account.attributes.symbol().unwrap_or_default().to_string();
        let _ = tx.send((symbol, price.slot, price.account.status, price.account.price));
    });
    (connection, rx)
}

#[tokio::test]
async fn test_stream_then_go_stale() {
    let feeds = default_feeds();
    let source = Arc::new(InMemorySource::with_accounts(oracle_accounts(&feeds, true), 1_000));
    let (connection, mut rx) = started(&source);

    let handle = connection.start().await.unwrap();
    assert_eq!(connection.product_count(), 3);
    // Enumeration only learns products
    assert_eq!(connection.tracked_count(), 0);

    let eth = feeds[1].clone().published(PriceStatus::Trading, 2_000);
    source.write(eth.price_key, eth.price_bytes(), 2_001);
    let (symbol, slot, status, price) = next(&mut rx).await;
    assert_eq!((symbol.as_str(), slot, status), ("Crypto.ETH/USD", 2_001, PriceStatus::Trading));
    assert!((price.unwrap() - 8.68725).abs() < 1e-9);

    source.set_slot(2_020);
    source.set_slot(2_026);
    let (symbol, slot, status, price) = next(&mut rx).await;
    assert_eq!((symbol.as_str(), slot, status), ("Crypto.ETH/USD", 2_026, PriceStatus::Unknown));
    assert!(price.is_none());

    source.close_subscriptions();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_new_product_learned_from_stream() {
    let source = Arc::new(InMemorySource::with_accounts(
        oracle_accounts(&default_feeds(), false),
        1_000,
    ));
    let (connection, mut rx) = started(&source);
    let errors = Arc::new(Mutex::new(Vec::new()));
    let sink = errors.clone();
    connection.on_error(move |e| {
        sink.lock().push(matches!(e, ClientError::UnknownProduct { .. }));
    });
    let _handle = connection.start().await.unwrap();

    let sol = Feed::new(4, "Crypto.SOL/USD", "Crypto").published(PriceStatus::Trading, 1_100);
    // Price ahead of its product is an error, then the product arrives
    source.write(sol.price_key, sol.price_bytes(), 1_100);
    source.write(sol.product_key, sol.product_bytes(), 1_100);
    source.write(sol.price_key, sol.price_bytes(), 1_101);

    let (symbol, slot, status, _) = next(&mut rx).await;
    assert_eq!((symbol.as_str(), slot, status), ("Crypto.SOL/USD", 1_101, PriceStatus::Trading));
    assert_eq!(*errors.lock(), vec![true]);
    assert_eq!(connection.product_count(), 4);
}

#[tokio::test]
async fn test_stop_silences_observers() {
    let feeds = default_feeds();
    let source = Arc::new(InMemorySource::with_accounts(oracle_accounts(&feeds, false), 1_000));
    let (connection, mut rx) = started(&source);
    let _handle = connection.start().await.unwrap();

    source.write(feeds[0].price_key, feeds[0].price_bytes(), 1_001);
    assert_eq!(next(&mut rx).await.0, "Crypto.BTC/USD");

    connection.stop();
    source.write(feeds[1].price_key, feeds[1].price_bytes(), 1_002);
    source.close_subscriptions();

    // The observer and its sender were dropped by stop()
    assert!(tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .is_none());
}
