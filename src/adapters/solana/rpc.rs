use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::ports::balances::{BalanceError, BalanceSourcePort};

/// `getMultipleAccounts` accepts at most 100 keys per call
pub const MAX_ACCOUNTS_PER_REQUEST: usize = 100;

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
}

impl From<SolanaClientError> for BalanceError {
    fn from(err: SolanaClientError) -> Self {
        BalanceError::Rpc(err.to_string())
    }
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
}

impl SolanaClient {
    /// Create a new Solana RPC client
    pub fn new(rpc_url: String) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()));
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Lamport balances via chunked `getMultipleAccounts`; missing accounts read as 0
    pub async fn get_lamports(&self, pubkeys: &[Pubkey]) -> Result<HashMap<Pubkey, u64>, SolanaClientError> {
        let mut balances = HashMap::with_capacity(pubkeys.len());

        for chunk in pubkeys.chunks(MAX_ACCOUNTS_PER_REQUEST) {
            let keys = chunk.to_vec();
            let client = Arc::clone(&self.client);
            let accounts = tokio::task::spawn_blocking(move || {
                client
                    .get_multiple_accounts(&keys)
                    .map_err(|e| SolanaClientError::RpcError(e.to_string()))
            })
            .await
            .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))??;

            for (key, account) in chunk.iter().zip(accounts) {
                balances.insert(*key, account.map(|a| a.lamports).unwrap_or(0));
            }
        }

        Ok(balances)
    }
}

#[async_trait]
impl BalanceSourcePort for SolanaClient {
    async fn get_balances(&self, addresses: &[Pubkey]) -> Result<HashMap<Pubkey, u64>, BalanceError> {
        let balances = self.get_lamports(addresses).await?;
        tracing::debug!(wallets = balances.len(), "Fetched balances from RPC");
        Ok(balances)
    }
}
