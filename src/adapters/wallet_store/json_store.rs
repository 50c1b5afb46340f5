//! JSON wallet store
//!
//! Reads the wallet manager's JSON export: an array of
//! `{public_key, private_key, sol_balance, wallet_group}` records.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::wallet_store::{WalletRecord, WalletSet, WalletStoreError, WalletStorePort};

/// Group names marking the creator wallet
pub const CREATOR_GROUPS: &[&str] = &["Dev", "creator"];

/// Group names marking backing wallets
pub const BACKING_GROUPS: &[&str] = &["底仓", "backing"];

#[derive(Debug, Deserialize)]
struct StoredWallet {
    #[serde(alias = "publicKey")]
    public_key: String,
    #[serde(alias = "privateKey")]
    private_key: String,
    #[serde(default, alias = "solBalance")]
    sol_balance: Option<f64>,
    #[serde(default, alias = "walletGroup", alias = "group")]
    wallet_group: Option<String>,
}

/// Read-only wallet store backed by a JSON file
#[derive(Debug, Clone)]
pub struct JsonWalletStore {
    path: PathBuf,
}

impl JsonWalletStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Split records into creator and backing; first creator wins, other groups are ignored
    pub fn parse(contents: &str) -> Result<WalletSet, WalletStoreError> {
        let wallets: Vec<StoredWallet> =
            serde_json::from_str(contents).map_err(|e| WalletStoreError::Parse(e.to_string()))?;

        let mut set = WalletSet::default();
        let mut ignored = 0usize;

        for wallet in wallets {
            let group = wallet.wallet_group.as_deref().unwrap_or_default();
            let record = WalletRecord {
                public_key: wallet.public_key,
                private_key: wallet.private_key,
                sol_balance: wallet.sol_balance,
            };

            if is_group(group, CREATOR_GROUPS) {
                if set.creator.is_none() {
                    set.creator = Some(record);
                } else {
                    tracing::warn!(address = %record.public_key, "Ignoring extra creator wallet");
                }
            } else if is_group(group, BACKING_GROUPS) {
                set.backing.push(record);
            } else {
                ignored += 1;
            }
        }

        if ignored > 0 {
            tracing::debug!(ignored, "Skipped wallets outside the creator and backing groups");
        }
        Ok(set)
    }
}

fn is_group(group: &str, names: &[&str]) -> bool {
    names.iter().any(|n| n.eq_ignore_ascii_case(group))
}

#[async_trait]
impl WalletStorePort for JsonWalletStore {
    async fn load_signers(&self) -> Result<WalletSet, WalletStoreError> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        Self::parse(&contents)
    }
}
