use std::collections::HashMap;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("Balance source unavailable: {0}")]
    Unavailable(String),
}

/// Source of wallet balances for preflight
#[async_trait]
pub trait BalanceSourcePort: Send + Sync {
    /// Balances in lamports; addresses the source does not know may be omitted
    async fn get_balances(&self, addresses: &[Pubkey]) -> Result<HashMap<Pubkey, u64>, BalanceError>;
}
