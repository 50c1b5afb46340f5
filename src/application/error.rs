//! Launch and exit errors
//!
//! Everything before submission fails without touching the network, so the
//! whole run can be retried. Submission failures keep the receipts of groups
//! the relay already accepted; those are never rolled back.

use std::fmt;

use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use thiserror::Error;

use super::vanity::VanityError;
use crate::domain::amount::AmountError;
use crate::domain::balance_preflight::{BalanceCheckResult, PreflightError};
use crate::domain::bundle_builder::BuildError;
use crate::domain::group_planner::PlanError;
use crate::domain::keypair_pool::PoolError;
use crate::ports::balances::BalanceError;

pub const EXPLORER_TX_URL: &str = "https://solscan.io/tx";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("No creator wallet found in wallet store")]
    MissingCreator,

    #[error("No backing wallets found in wallet store")]
    MissingBackingWallets,

    #[error("Insufficient funds in {} wallet(s): {}", .shortfalls.len(), format_shortfalls(.shortfalls))]
    InsufficientFunds { shortfalls: Vec<BalanceCheckResult> },

    #[error("Group {group}: compile failed{}: {message}", format_status(.status))]
    CompileFailed {
        group: usize,
        status: Option<u16>,
        message: String,
    },

    #[error("Group {group}: relay rejected bundle: {message}")]
    RelayRejected { group: usize, message: String },

    #[error("Vanity search canceled")]
    SearchCanceled,

    #[error("Vanity search already running")]
    SearchAlreadyRunning,

    #[error("Vanity search failed: {0}")]
    Vanity(String),

    #[error("Group {group}: signing failed: {message}")]
    Signing { group: usize, message: String },

    #[error("Wallet store error: {0}")]
    WalletStore(String),

    #[error("Balance lookup failed: {0}")]
    BalanceSource(#[from] BalanceError),

    #[error("Planning failed: {0}")]
    Plan(#[from] PlanError),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error("Preflight failed: {0}")]
    Preflight(#[from] PreflightError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl LaunchError {
    /// True when the error was raised before anything reached the network
    pub fn is_pre_submission(&self) -> bool {
        !matches!(
            self,
            LaunchError::CompileFailed { .. }
                | LaunchError::RelayRejected { .. }
                | LaunchError::Signing { .. }
        )
    }
}

impl From<PoolError> for LaunchError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::MissingCreator => LaunchError::MissingCreator,
            PoolError::MissingBackingWallets => LaunchError::MissingBackingWallets,
            other => LaunchError::WalletStore(other.to_string()),
        }
    }
}

impl From<VanityError> for LaunchError {
    fn from(err: VanityError) -> Self {
        match err {
            VanityError::SearchCanceled => LaunchError::SearchCanceled,
            VanityError::SearchAlreadyRunning => LaunchError::SearchAlreadyRunning,
            other => LaunchError::Vanity(other.to_string()),
        }
    }
}

fn format_shortfalls(shortfalls: &[BalanceCheckResult]) -> String {
    shortfalls
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// One relay-accepted bundle
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReceipt {
    pub group: usize,
    pub bundle_id: String,
    /// First signature of each transaction, in bundle order
    pub signatures: Vec<Signature>,
    pub signers: Vec<Pubkey>,
}

impl GroupReceipt {
    pub fn explorer_links(&self) -> Vec<String> {
        self.signatures
            .iter()
            .map(|sig| format!("{}/{}", EXPLORER_TX_URL, sig))
            .collect()
    }
}

/// A group failed mid-submission; earlier groups stay on the relay
#[derive(Debug)]
pub struct SubmissionFailure {
    pub completed: Vec<GroupReceipt>,
    pub group: usize,
    pub error: LaunchError,
}

impl SubmissionFailure {
    /// Some groups were already accepted
    pub fn is_partial(&self) -> bool {
        !self.completed.is_empty()
    }
}

impl fmt::Display for SubmissionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} group(s) already submitted)",
            self.error,
            self.completed.len()
        )
    }
}

impl std::error::Error for SubmissionFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Failed orchestration run
#[derive(Debug)]
pub struct RunFailure {
    pub error: LaunchError,
    /// Groups accepted before the failure
    pub completed: Vec<GroupReceipt>,
}

impl RunFailure {
    pub fn is_partial(&self) -> bool {
        !self.completed.is_empty()
    }
}

impl From<LaunchError> for RunFailure {
    fn from(error: LaunchError) -> Self {
        Self {
            error,
            completed: Vec::new(),
        }
    }
}

impl From<SubmissionFailure> for RunFailure {
    fn from(failure: SubmissionFailure) -> Self {
        Self {
            error: failure.error,
            completed: failure.completed,
        }
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_partial() {
            write!(
                f,
                "{} (partial: {} group(s) already submitted, not rolled back)",
                self.error,
                self.completed.len()
            )
        } else {
            write!(f, "{}", self.error)
        }
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_lists_every_wallet() {
        let shortfalls = vec![
            BalanceCheckResult {
                address: Pubkey::new_unique(),
                current_lamports: 5_000_000,
                required_lamports: 510_000_000,
                sufficient: false,
            },
            BalanceCheckResult {
                address: Pubkey::new_unique(),
                current_lamports: 0,
                required_lamports: 10_000_000,
                sufficient: false,
            },
        ];
        let msg = LaunchError::InsufficientFunds { shortfalls: shortfalls.clone() }.to_string();

        assert!(msg.contains("2 wallet(s)"));
        assert!(msg.contains(&shortfalls[0].address.to_string()));
        assert!(msg.contains("needs 0.51 SOL"));
        assert!(msg.contains(&shortfalls[1].address.to_string()));
    }

    #[test]
    fn test_compile_failed_display() {
        let err = LaunchError::CompileFailed {
            group: 1,
            status: Some(400),
            message: "Bad Request".into(),
        };
        assert_eq!(err.to_string(), "Group 1: compile failed (HTTP 400): Bad Request");
        assert!(!err.is_pre_submission());
        assert!(LaunchError::MissingCreator.is_pre_submission());
    }

    #[test]
    fn test_pool_error_mapping() {
        assert!(matches!(LaunchError::from(PoolError::MissingCreator), LaunchError::MissingCreator));
        assert!(matches!(
            LaunchError::from(PoolError::DuplicateSigner("x".into())),
            LaunchError::WalletStore(_)
        ));
    }

    #[test]
    fn test_run_failure_partial() {
        let receipt = GroupReceipt {
            group: 0,
            bundle_id: "b".into(),
            signatures: vec![Signature::default()],
            signers: vec![Pubkey::new_unique()],
        };
        let failure: RunFailure = SubmissionFailure {
            completed: vec![receipt],
            group: 1,
            error: LaunchError::RelayRejected { group: 1, message: "dropped".into() },
        }
        .into();

        assert!(failure.is_partial());
        assert!(failure.to_string().contains("partial"));
        assert!(!RunFailure::from(LaunchError::MissingCreator).is_partial());
    }

    #[test]
    fn test_explorer_links() {
        let receipt = GroupReceipt {
            group: 0,
            bundle_id: "b".into(),
            signatures: vec![Signature::default()],
            signers: vec![],
        };
        assert!(receipt.explorer_links()[0].starts_with("https://solscan.io/tx/"));
    }
}
