//! Balances as last recorded by the wallet store
//!
//! Avoids RPC round-trips when the store's balances are fresh enough.
//! Wallets without a recorded balance read as empty.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use crate::domain::amount::sol_to_lamports;
use crate::ports::balances::{BalanceError, BalanceSourcePort};
use crate::ports::wallet_store::{WalletSet, WalletStorePort};

pub struct CachedBalances {
    store: Arc<dyn WalletStorePort>,
}

impl CachedBalances {
    pub fn new(store: Arc<dyn WalletStorePort>) -> Self {
        Self { store }
    }

    /// Recorded balances in lamports, keyed by address
    pub fn from_wallet_set(set: &WalletSet) -> HashMap<Pubkey, u64> {
        set.records()
            .filter_map(|record| {
                let key = Pubkey::from_str(&record.public_key).ok()?;
                let sol = Decimal::from_f64(record.sol_balance?)?;
                let lamports = sol_to_lamports(sol).ok()?;
                Some((key, lamports))
            })
            .collect()
    }
}

#[async_trait]
impl BalanceSourcePort for CachedBalances {
    async fn get_balances(&self, addresses: &[Pubkey]) -> Result<HashMap<Pubkey, u64>, BalanceError> {
        let set = self
            .store
            .load_signers()
            .await
            .map_err(|e| BalanceError::Unavailable(e.to_string()))?;
        let recorded = Self::from_wallet_set(&set);

        Ok(addresses
            .iter()
            .filter_map(|a| recorded.get(a).map(|l| (*a, *l)))
            .collect())
    }
}
