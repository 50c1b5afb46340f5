//! Bundle Submitter
//!
//! Sends groups strictly in order: compile, sign locally, relay as one
//! bundle, then wait the inter-group delay before the next group. A failed
//! group stops the run; groups already accepted by the relay are kept.

use std::sync::Arc;
use std::time::Duration;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::transaction::VersionedTransaction;

use super::error::{GroupReceipt, LaunchError, SubmissionFailure};
use crate::domain::bundle_builder::SubmissionGroup;
use crate::domain::intent::TradeIntent;
use crate::domain::keypair_pool::KeypairPool;
use crate::domain::mint::MintIdentity;
use crate::ports::compiler::TransactionCompilerPort;
use crate::ports::relay::BundleRelayPort;

pub const DEFAULT_INTER_GROUP_DELAY: Duration = Duration::from_millis(100);

pub struct BundleSubmitter {
    compiler: Arc<dyn TransactionCompilerPort>,
    relay: Arc<dyn BundleRelayPort>,
    inter_group_delay: Duration,
}

impl BundleSubmitter {
    pub fn new(compiler: Arc<dyn TransactionCompilerPort>, relay: Arc<dyn BundleRelayPort>) -> Self {
        Self {
            compiler,
            relay,
            inter_group_delay: DEFAULT_INTER_GROUP_DELAY,
        }
    }

    pub fn with_inter_group_delay(mut self, delay: Duration) -> Self {
        self.inter_group_delay = delay;
        self
    }

    pub fn inter_group_delay(&self) -> Duration {
        self.inter_group_delay
    }

    /// Submit every group in order
    ///
    /// `mint` co-signs transactions that require it (the create).
    pub async fn submit(
        &self,
        groups: &[SubmissionGroup],
        pool: &KeypairPool,
        mint: Option<&MintIdentity>,
    ) -> Result<Vec<GroupReceipt>, SubmissionFailure> {
        let mut completed = Vec::with_capacity(groups.len());

        for (position, group) in groups.iter().enumerate() {
            if position > 0 && !self.inter_group_delay.is_zero() {
                tokio::time::sleep(self.inter_group_delay).await;
            }

            match self.submit_group(group, pool, mint).await {
                Ok(receipt) => {
                    tracing::info!(
                        group = receipt.group,
                        bundle_id = %receipt.bundle_id,
                        transactions = receipt.signatures.len(),
                        outcome = "success",
                        "Bundle accepted"
                    );
                    for link in receipt.explorer_links() {
                        tracing::info!(group = receipt.group, "{}", link);
                    }
                    completed.push(receipt);
                }
                Err(error) => {
                    tracing::error!(
                        group = group.index,
                        submitted = completed.len(),
                        remaining = groups.len() - position,
                        error = %error,
                        "Group submission failed"
                    );
                    return Err(SubmissionFailure {
                        completed,
                        group: group.index,
                        error,
                    });
                }
            }
        }

        Ok(completed)
    }

    async fn submit_group(
        &self,
        group: &SubmissionGroup,
        pool: &KeypairPool,
        mint: Option<&MintIdentity>,
    ) -> Result<GroupReceipt, LaunchError> {
        let index = group.index;

        let blobs = self
            .compiler
            .compile(&group.intents)
            .await
            .map_err(|e| LaunchError::CompileFailed {
                group: index,
                status: e.status(),
                message: e.to_string(),
            })?;

        if blobs.len() != group.intents.len() {
            return Err(LaunchError::CompileFailed {
                group: index,
                status: None,
                message: format!(
                    "expected {} transactions, got {}",
                    group.intents.len(),
                    blobs.len()
                ),
            });
        }

        let signed = blobs
            .iter()
            .zip(&group.intents)
            .map(|(blob, intent)| {
                let unsigned = decode_transaction(blob).map_err(|message| LaunchError::CompileFailed {
                    group: index,
                    status: None,
                    message,
                })?;
                sign_transaction(unsigned, intent, pool, mint)
                    .map_err(|message| LaunchError::Signing { group: index, message })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(group = index, transactions = signed.len(), "Group signed");

        let bundle_id = self
            .relay
            .send_bundle(&signed)
            .await
            .map_err(|e| LaunchError::RelayRejected {
                group: index,
                message: e.to_string(),
            })?;

        Ok(GroupReceipt {
            group: index,
            bundle_id,
            signatures: signed.iter().filter_map(|tx| tx.signatures.first().copied()).collect(),
            signers: group.intents.iter().map(|i| i.signer).collect(),
        })
    }
}

/// Base58 bincode blob to transaction
pub fn decode_transaction(blob: &str) -> Result<VersionedTransaction, String> {
    let bytes = bs58::decode(blob)
        .into_vec()
        .map_err(|e| format!("invalid base58 transaction: {}", e))?;
    bincode::deserialize(&bytes).map_err(|e| format!("invalid transaction bytes: {}", e))
}

/// Sign with every key the message requires
///
/// The intent's own wallet must be among them; the mint is the only other
/// key allowed.
pub fn sign_transaction(
    unsigned: VersionedTransaction,
    intent: &TradeIntent,
    pool: &KeypairPool,
    mint: Option<&MintIdentity>,
) -> Result<VersionedTransaction, String> {
    let required_count = unsigned.message.header().num_required_signatures as usize;
    let required: &[Pubkey] = unsigned
        .message
        .static_account_keys()
        .get(..required_count)
        .ok_or_else(|| "message lists fewer keys than required signatures".to_string())?;

    if !required.contains(&intent.signer) {
        return Err(format!("transaction does not require a signature from {}", intent.signer));
    }

    let keypairs = required
        .iter()
        .map(|key| {
            let keypair = if *key == intent.signer {
                pool.find(key).map(|s| s.keypair())
            } else {
                mint.filter(|m| m.pubkey() == *key).map(|m| m.keypair())
            };
            keypair.ok_or_else(|| format!("no signer available for {}", key))
        })
        .collect::<Result<Vec<&Keypair>, _>>()?;

    VersionedTransaction::try_new(unsigned.message, &keypairs).map_err(|e| e.to_string())
}
