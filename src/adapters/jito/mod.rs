//! Jito Bundle Adapter
//!
//! Submits signed transaction groups as bundles to the Jito Block Engine.

mod client;
mod config;
mod error;
mod types;

pub use client::JitoBundleClient;
pub use config::{endpoints, JitoConfig, TransactionEncoding, MAX_BUNDLE_TRANSACTIONS};
pub use error::JitoError;
pub use types::{BundleRequest, JsonRpcError, JsonRpcResponse};
