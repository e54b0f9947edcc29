//! Account source backed by a Solana RPC node

use std::str::FromStr;

use anyhow::{Context, Result};
use futures::StreamExt;
use pyth_layout::Pubkey;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::{pubsub_client::PubsubClient, rpc_client::RpcClient},
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
};
use solana_sdk::{account::Account, commitment_config::CommitmentConfig};
use tokio::sync::{mpsc, oneshot};

use crate::source::{AccountSource, AccountUpdate};

/// Reads accounts over JSON-RPC and subscribes over the websocket endpoint.
///
/// Each subscription owns its own websocket connection, driven by a spawned
/// task that forwards notifications until the receiver is dropped. The
/// subscribe call returns once the node has accepted the subscription.
pub struct RpcAccountSource {
    rpc: RpcClient,
    ws_url: String,
    commitment: CommitmentConfig,
}

impl RpcAccountSource {
    pub fn new(rpc_url: String, ws_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(rpc_url, commitment),
            ws_url,
            commitment,
        }
    }

    fn program_config(&self) -> RpcProgramAccountsConfig {
        RpcProgramAccountsConfig {
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

impl AccountSource for RpcAccountSource {
    async fn program_accounts(&self, program: &Pubkey) -> Result<Vec<(Pubkey, Vec<u8>)>> {
        let accounts = self
            .rpc
            .get_program_accounts_with_config(program, self.program_config())
            .await
            .context(format!("Failed to fetch accounts of program {}", program))?;

        Ok(accounts
            .into_iter()
            .map(|(key, account)| (key, account.data))
            .collect())
    }

    async fn current_slot(&self) -> Result<u64> {
        self.rpc
            .get_slot_with_commitment(self.commitment)
            .await
            .context("Failed to fetch current slot")
    }

    async fn accounts(&self, keys: &[Pubkey]) -> Result<Vec<Option<Vec<u8>>>> {
        let accounts = self
            .rpc
            .get_multiple_accounts(keys)
            .await
            .context("Failed to fetch accounts")?;

        Ok(accounts
            .into_iter()
            .map(|account| account.map(|a| a.data))
            .collect())
    }

    async fn subscribe_program(&self, program: &Pubkey) -> Result<mpsc::UnboundedReceiver<AccountUpdate>> {
        let client = PubsubClient::new(&self.ws_url)
            .await
            .context(format!("Failed to connect to {}", self.ws_url))?;
        let program = *program;
        let config = self.program_config();
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        tokio::spawn(async move {
            let (mut stream, unsubscribe) = match client.program_subscribe(&program, Some(config)).await {
                Ok(subscription) => {
                    let _ = ready_tx.send(Ok(()));
                    subscription
                }
                Err(e) => {
                    let e = anyhow::Error::from(e)
                        .context(format!("Program subscription for {} failed", program));
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            log::info!("Subscribed to accounts of program {}", program);

            while let Some(response) = stream.next().await {
                let Ok(key) = Pubkey::from_str(&response.value.pubkey) else {
                    log::warn!("Skipping update with malformed key {}", response.value.pubkey);
                    continue;
                };
                let Some(account) = response.value.account.decode::<Account>() else {
                    log::warn!("Skipping undecodable update for {}", key);
                    continue;
                };
                let update = AccountUpdate {
                    key,
                    data: account.data,
                    slot: response.context.slot,
                };
                if tx.send(update).is_err() {
                    break;
                }
            }
            log::warn!("Program subscription for {} ended", program);

            drop(stream);
            unsubscribe().await;
        });

        ready_rx
            .await
            .context("Program subscription task ended before subscribing")??;
        Ok(rx)
    }

    async fn subscribe_slots(&self) -> Result<mpsc::UnboundedReceiver<u64>> {
        let client = PubsubClient::new(&self.ws_url)
            .await
            .context(format!("Failed to connect to {}", self.ws_url))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel::<Result<()>>();

        tokio::spawn(async move {
            let (mut stream, unsubscribe) = match client.slot_subscribe().await {
                Ok(subscription) => {
                    let _ = ready_tx.send(Ok(()));
                    subscription
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(anyhow::Error::from(e).context("Slot subscription failed")));
                    return;
                }
            };

            while let Some(info) = stream.next().await {
                if tx.send(info.slot).is_err() {
                    break;
                }
            }
            log::warn!("Slot subscription ended");

            drop(stream);
            unsubscribe().await;
        });

        ready_rx
            .await
            .context("Slot subscription task ended before subscribing")??;
        Ok(rx)
    }
}
