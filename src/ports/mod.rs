//! Ports Layer - Trait definitions for external collaborators
//!
//! Following hexagonal architecture, these traits abstract:
//! - The wallet store the signer pool is loaded from
//! - Balance lookups used by preflight
//! - The remote compiler turning trade intents into transactions
//! - The bundle relay

pub mod balances;
pub mod compiler;
pub mod mocks;
pub mod relay;
pub mod wallet_store;

pub use balances::{BalanceError, BalanceSourcePort};
pub use compiler::{CompilerError, TransactionCompilerPort};
pub use relay::{BundleRelayPort, RelayError};
pub use wallet_store::{WalletRecord, WalletSet, WalletStoreError, WalletStorePort};
