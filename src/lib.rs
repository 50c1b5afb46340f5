//! Launch Bundler - bundled token launch and exit for Solana
//!
//! Coordinates a creator wallet and many backing wallets to launch a token
//! and buy in through Jito bundles, sell out the same way, and search for a
//! vanity mint address.
//!
//! # Modules
//!
//! - `domain`: Core launch logic (KeypairPool, GroupPlanner, BalancePreflight, BundleBuilder)
//! - `ports`: Trait abstractions (WalletStorePort, BalanceSourcePort, TransactionCompilerPort, BundleRelayPort)
//! - `adapters`: External implementations (Jito, PumpPortal, Solana, wallet store, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Vanity search, bundle submission and the launch/exit orchestrators

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
