//! Pyth Price Watcher
//!
//! Logs every oracle price of a cluster, either by polling full snapshots
//! or by streaming live account updates.

use anyhow::Result;
use pyth_client::{
    Cluster, Config, Mode, PriceUpdate, ProductUpdate, PythConnection, PythHttpClient,
    RpcAccountSource,
};
use pyth_layout::{PriceAccount, PriceStatus, ProductAttributes};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Pyth price watcher");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default devnet config", e);
        Config::default_for(Cluster::Devnet)
    });

    log::info!("Connected to RPC: {}", config.rpc_url);
    log::info!("Watching oracle program: {}", config.program_key);

    let source = RpcAccountSource::new(
        config.rpc_url.clone(),
        config.ws_url.clone(),
        config.commitment()?,
    );

    match config.mode {
        Mode::Poll => poll(source, &config).await,
        Mode::Stream => stream(source, &config).await,
    }
}

/// Fetch and log a full snapshot every poll interval
async fn poll(source: RpcAccountSource, config: &Config) -> Result<()> {
    let mut client = PythHttpClient::new(source, config.program_key);
    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs));

    loop {
        interval.tick().await;

        let snapshot = match client.get_data().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Error fetching prices: {}", e);
                continue;
            }
        };

        log::info!(
            "Slot {}: {} products, {} prices",
            snapshot.slot,
            snapshot.products.len(),
            snapshot.prices.len()
        );
        for symbol in &snapshot.symbols {
            if !config.feeds.is_empty()
                && !snapshot
                    .price_for_symbol(symbol)
                    .is_some_and(|price| config.feeds.contains(&price.key))
            {
                continue;
            }
            if let (Some(product), Some(price)) = (
                snapshot.product_for_symbol(symbol),
                snapshot.price_for_symbol(symbol),
            ) {
                log_price(product, price, config.verbose);
            }
        }
    }
}

/// Stream live updates until interrupted
async fn stream(source: RpcAccountSource, config: &Config) -> Result<()> {
    let connection = PythConnection::new(Arc::new(source), config.program_key)
        .with_feeds(config.feeds.iter().copied());

    let verbose = config.verbose;
    connection.on_price_change_verbose(move |product, price| log_price(product, price, verbose));
    connection.on_error(|e| log::debug!("Observer saw error: {}", e));

    let handle = connection.start().await?;
    log::info!("Watcher started. Streaming price updates...");

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            log::info!("Interrupted, shutting down");
            connection.stop();
        }
        result = handle => {
            result?;
            log::warn!("Update stream closed");
        }
    }

    Ok(())
}

fn log_price(product: &ProductUpdate, price: &PriceUpdate, verbose: bool) {
    let attributes = &product.account.attributes;
    log::info!("{}", describe(attributes, &price.account));

    if verbose {
        log::info!(
            "  product {} (slot {}) price {} (slot {})",
            product.key,
            product.slot,
            price.key,
            price.slot
        );
        match serde_json::to_string(attributes) {
            Ok(json) => log::info!("  attributes {}", json),
            Err(e) => log::debug!("Failed to serialize attributes: {}", e),
        }
    }
}

fn describe(attributes: &ProductAttributes, price: &PriceAccount) -> String {
    let symbol = attributes.symbol().unwrap_or("<unnamed>");
    match (price.price, price.confidence) {
        (Some(value), Some(confidence)) if price.status == PriceStatus::Trading => {
            format!("{}: ${} \u{b1}${}", symbol, value, confidence)
        }
        _ => format!(
            "{}: price currently unavailable. status is {:?}",
            symbol, price.status
        ),
    }
}
