use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletStoreError {
    #[error("Failed to read wallet store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse wallet store: {0}")]
    Parse(String),
    #[error("Wallet store unavailable: {0}")]
    Unavailable(String),
}

/// One wallet as the store records it
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    pub public_key: String,
    /// Base58-encoded 64-byte secret key
    pub private_key: String,
    /// Last balance the store saw, in SOL
    #[serde(default)]
    pub sol_balance: Option<f64>,
}

impl WalletRecord {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            sol_balance: None,
        }
    }

    pub fn with_balance(mut self, sol: f64) -> Self {
        self.sol_balance = Some(sol);
        self
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("sol_balance", &self.sol_balance)
            .finish()
    }
}

/// Creator (if any) and backing wallets in store order
#[derive(Debug, Clone, Default)]
pub struct WalletSet {
    pub creator: Option<WalletRecord>,
    pub backing: Vec<WalletRecord>,
}

impl WalletSet {
    /// Creator first, then backing
    pub fn records(&self) -> impl Iterator<Item = &WalletRecord> {
        self.creator.iter().chain(self.backing.iter())
    }
}

/// Read side of the external wallet store
#[async_trait]
pub trait WalletStorePort: Send + Sync {
    async fn load_signers(&self) -> Result<WalletSet, WalletStoreError>;
}
