//! Wallet store adapters

mod cached;
mod json_store;

pub use cached::CachedBalances;
pub use json_store::{JsonWalletStore, BACKING_GROUPS, CREATOR_GROUPS};
