//! In-memory port implementations
//!
//! Record every call and answer from configured state, so orchestration can
//! be driven end-to-end without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::{Message, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;

use super::balances::{BalanceError, BalanceSourcePort};
use super::compiler::{CompilerError, TransactionCompilerPort};
use super::relay::{BundleRelayPort, RelayError};
use super::wallet_store::{WalletSet, WalletStoreError, WalletStorePort};
use crate::domain::intent::TradeIntent;

/// Program id stamped on mock-compiled instructions
pub const MOCK_PROGRAM_ID: Pubkey = Pubkey::new_from_array([7u8; 32]);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Wallet store
// ============================================================================

/// Wallet store serving a replaceable wallet set
#[derive(Debug, Default)]
pub struct MockWalletStore {
    set: Arc<Mutex<WalletSet>>,
    loads: AtomicUsize,
    fail_with: Mutex<Option<String>>,
}

impl MockWalletStore {
    pub fn new(set: WalletSet) -> Self {
        Self {
            set: Arc::new(Mutex::new(set)),
            ..Default::default()
        }
    }

    /// Builder method making every load fail
    pub fn failing(self, message: &str) -> Self {
        *lock(&self.fail_with) = Some(message.to_string());
        self
    }

    /// Swap the stored wallets, as an edit between runs would
    pub fn replace(&self, set: WalletSet) {
        *lock(&self.set) = set;
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletStorePort for MockWalletStore {
    async fn load_signers(&self) -> Result<WalletSet, WalletStoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.fail_with).clone() {
            return Err(WalletStoreError::Unavailable(message));
        }
        Ok(lock(&self.set).clone())
    }
}

// ============================================================================
// Balance source
// ============================================================================

#[derive(Debug, Default)]
pub struct MockBalanceSource {
    balances: Mutex<HashMap<Pubkey, u64>>,
    calls: Mutex<Vec<Vec<Pubkey>>>,
}

impl MockBalanceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set a wallet's balance in lamports
    pub fn with_balance(self, wallet: Pubkey, lamports: u64) -> Self {
        lock(&self.balances).insert(wallet, lamports);
        self
    }

    /// Same balance for every listed wallet
    pub fn with_uniform<'a>(self, wallets: impl IntoIterator<Item = &'a Pubkey>, lamports: u64) -> Self {
        {
            let mut balances = lock(&self.balances);
            for wallet in wallets {
                balances.insert(*wallet, lamports);
            }
        }
        self
    }

    pub fn get_calls(&self) -> Vec<Vec<Pubkey>> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl BalanceSourcePort for MockBalanceSource {
    async fn get_balances(&self, addresses: &[Pubkey]) -> Result<HashMap<Pubkey, u64>, BalanceError> {
        lock(&self.calls).push(addresses.to_vec());
        let balances = lock(&self.balances);
        Ok(addresses
            .iter()
            .filter_map(|a| balances.get(a).map(|b| (*a, *b)))
            .collect())
    }
}

// ============================================================================
// Instruction compiler
// ============================================================================

/// Compiler producing one unsigned transaction per intent
///
/// The intent's wallet pays and signs; create intents also list the mint as
/// a required signer.
#[derive(Debug, Default)]
pub struct MockCompiler {
    calls: Mutex<Vec<Vec<TradeIntent>>>,
    failures: Mutex<HashMap<usize, CompilerError>>,
    short_response_on: Mutex<Option<usize>>,
}

impl MockCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to reject the nth call (0-based)
    pub fn failing_on(self, call: usize, status: u16, message: &str) -> Self {
        lock(&self.failures).insert(
            call,
            CompilerError::Rejected {
                status,
                message: message.to_string(),
            },
        );
        self
    }

    /// Builder method to drop the last transaction from the nth response
    pub fn short_on(self, call: usize) -> Self {
        *lock(&self.short_response_on) = Some(call);
        self
    }

    pub fn get_calls(&self) -> Vec<Vec<TradeIntent>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Unsigned transaction for one intent
    pub fn skeleton(intent: &TradeIntent) -> VersionedTransaction {
        let accounts = vec![
            AccountMeta::new(intent.signer, true),
            AccountMeta::new(intent.mint, intent.is_create()),
        ];
        let instruction = Instruction::new_with_bytes(
            MOCK_PROGRAM_ID,
            intent.action.as_str().as_bytes(),
            accounts,
        );
        let message = Message::new(&[instruction], Some(&intent.signer));
        let required = message.header.num_required_signatures as usize;

        VersionedTransaction {
            signatures: vec![Signature::default(); required],
            message: VersionedMessage::Legacy(message),
        }
    }
}

#[async_trait]
impl TransactionCompilerPort for MockCompiler {
    async fn compile(&self, intents: &[TradeIntent]) -> Result<Vec<String>, CompilerError> {
        let call = {
            let mut calls = lock(&self.calls);
            calls.push(intents.to_vec());
            calls.len() - 1
        };

        if let Some(err) = lock(&self.failures).get(&call).cloned() {
            return Err(err);
        }

        let mut blobs = intents
            .iter()
            .map(|intent| {
                bincode::serialize(&Self::skeleton(intent))
                    .map(|bytes| bs58::encode(bytes).into_string())
                    .map_err(|e| CompilerError::MalformedResponse(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if *lock(&self.short_response_on) == Some(call) {
            blobs.pop();
        }
        Ok(blobs)
    }
}

// ============================================================================
// Bundle relay
// ============================================================================

#[derive(Debug, Default)]
pub struct MockRelay {
    bundles: Mutex<Vec<Vec<VersionedTransaction>>>,
    reject_on: Mutex<Option<(usize, String)>>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to reject the nth bundle (0-based)
    pub fn rejecting(self, bundle: usize, message: &str) -> Self {
        *lock(&self.reject_on) = Some((bundle, message.to_string()));
        self
    }

    /// Bundles received so far, rejected ones included
    pub fn get_bundles(&self) -> Vec<Vec<VersionedTransaction>> {
        lock(&self.bundles).clone()
    }

    pub fn bundle_count(&self) -> usize {
        lock(&self.bundles).len()
    }
}

#[async_trait]
impl BundleRelayPort for MockRelay {
    async fn send_bundle(&self, transactions: &[VersionedTransaction]) -> Result<String, RelayError> {
        let index = {
            let mut bundles = lock(&self.bundles);
            bundles.push(transactions.to_vec());
            bundles.len() - 1
        };

        if let Some((reject, message)) = lock(&self.reject_on).clone() {
            if reject == index {
                return Err(RelayError::Rejected(message));
            }
        }
        Ok(format!("mock-bundle-{}", index))
    }
}
