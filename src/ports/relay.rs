use async_trait::async_trait;
use solana_sdk::transaction::VersionedTransaction;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RelayError {
    #[error("Bundle rejected by relay: {0}")]
    Rejected(String),
    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),
    #[error("Relay request failed: {0}")]
    Transport(String),
}

/// Relay accepting signed transaction bundles
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BundleRelayPort: Send + Sync {
    /// Submit one bundle; returns the relay's bundle id
    async fn send_bundle(&self, transactions: &[VersionedTransaction]) -> Result<String, RelayError>;
}
