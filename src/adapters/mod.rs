//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jito: bundle relay (Block Engine `sendBundle`)
//! - PumpPortal: remote transaction compiler
//! - Solana: RPC balance source and keypair files
//! - Wallet store: JSON wallet export and cached balances
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod jito;
pub mod pump_portal;
pub mod solana;
pub mod wallet_store;

pub use cli::CliApp;
pub use jito::JitoBundleClient;
pub use pump_portal::PumpPortalClient;
pub use solana::SolanaClient;
pub use wallet_store::{CachedBalances, JsonWalletStore};
