//! PumpPortal Adapter
//!
//! Transaction compiler backed by the PumpPortal trade-local API.

mod client;
mod types;

pub use client::{PumpPortalClient, PumpPortalConfig, DEFAULT_TRADE_LOCAL_URL};
pub use types::{TradeLocalRequest, WireAmount};
