//! Keypair Pool
//!
//! Holds the creator signer and the ordered backing signers for one run.
//! Built fresh from the wallet store on every run so edits between runs
//! are picked up. Read-only once loaded.

use std::collections::HashSet;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer as _};
use thiserror::Error;

use super::signer::{Signer, SignerRole};
use crate::ports::wallet_store::{WalletRecord, WalletSet, WalletStoreError, WalletStorePort};

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("No creator wallet found in wallet store")]
    MissingCreator,

    #[error("No backing wallets found in wallet store")]
    MissingBackingWallets,

    #[error("Invalid private key for wallet {address}: {reason}")]
    InvalidKey { address: String, reason: String },

    #[error("Private key derives {derived}, but wallet store lists {recorded}")]
    AddressMismatch { recorded: String, derived: String },

    #[error("Wallet {0} appears more than once")]
    DuplicateSigner(String),

    #[error("Wallet store error: {0}")]
    Store(#[from] WalletStoreError),
}

/// Creator plus ordered backing signers
#[derive(Debug)]
pub struct KeypairPool {
    creator: Signer,
    backing: Vec<Signer>,
}

impl KeypairPool {
    /// Read the wallet store and decode every signer
    pub async fn load(store: &dyn WalletStorePort) -> Result<Self, PoolError> {
        let set = store.load_signers().await?;
        let pool = Self::from_wallet_set(set)?;

        tracing::info!(
            backing = pool.backing.len(),
            "Loaded {} wallets (1 creator + {} backing)",
            pool.len(),
            pool.backing.len()
        );
        Ok(pool)
    }

    /// Decode a wallet set, preserving backing order
    pub fn from_wallet_set(set: WalletSet) -> Result<Self, PoolError> {
        let creator_record = set.creator.ok_or(PoolError::MissingCreator)?;
        if set.backing.is_empty() {
            return Err(PoolError::MissingBackingWallets);
        }

        let creator = decode_signer(&creator_record, SignerRole::Creator)?;
        let backing = set
            .backing
            .iter()
            .map(|record| decode_signer(record, SignerRole::Backing))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(creator, backing)
    }

    /// Assemble a pool from already-decoded signers
    pub fn new(creator: Signer, backing: Vec<Signer>) -> Result<Self, PoolError> {
        if backing.is_empty() {
            return Err(PoolError::MissingBackingWallets);
        }

        let mut seen = HashSet::with_capacity(backing.len() + 1);
        for signer in std::iter::once(&creator).chain(backing.iter()) {
            if !seen.insert(signer.pubkey()) {
                return Err(PoolError::DuplicateSigner(signer.address()));
            }
        }

        let creator = creator.with_role(SignerRole::Creator);
        let backing = backing
            .into_iter()
            .map(|s| s.with_role(SignerRole::Backing))
            .collect();

        Ok(Self { creator, backing })
    }

    pub fn creator(&self) -> &Signer {
        &self.creator
    }

    pub fn backing(&self) -> &[Signer] {
        &self.backing
    }

    /// Total signer count (creator included)
    pub fn len(&self) -> usize {
        self.backing.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Creator first, then backing in load order
    pub fn all(&self) -> impl Iterator<Item = &Signer> {
        std::iter::once(&self.creator).chain(self.backing.iter())
    }

    pub fn find(&self, pubkey: &Pubkey) -> Option<&Signer> {
        self.all().find(|s| s.pubkey() == *pubkey)
    }
}

fn decode_signer(record: &WalletRecord, role: SignerRole) -> Result<Signer, PoolError> {
    let bytes = bs58::decode(record.private_key.trim())
        .into_vec()
        .map_err(|e| PoolError::InvalidKey {
            address: record.public_key.clone(),
            reason: e.to_string(),
        })?;

    let keypair = Keypair::try_from(bytes.as_slice()).map_err(|e| PoolError::InvalidKey {
        address: record.public_key.clone(),
        reason: e.to_string(),
    })?;

    let derived = keypair.pubkey().to_string();
    if !record.public_key.is_empty() && record.public_key != derived {
        return Err(PoolError::AddressMismatch {
            recorded: record.public_key.clone(),
            derived,
        });
    }

    Ok(Signer::new(keypair, role))
}
