//! Trade Intents
//!
//! Per-wallet, per-phase trade descriptions handed to the instruction compiler.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;

use super::amount::TradeAmount;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Create,
    Buy,
    Sell,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::Create => "create",
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trading venue the compiler routes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Venue {
    /// Bonding curve
    #[default]
    Pump,
    PumpAmm,
    Raydium,
    Auto,
}

impl Venue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Venue::Pump => "pump",
            Venue::PumpAmm => "pump-amm",
            Venue::Raydium => "raydium",
            Venue::Auto => "auto",
        }
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pump" => Ok(Venue::Pump),
            "pump-amm" | "pumpswap" => Ok(Venue::PumpAmm),
            "raydium" => Ok(Venue::Raydium),
            "auto" => Ok(Venue::Auto),
            other => Err(format!("unknown venue '{}'", other)),
        }
    }
}

/// Slippage and priority fee applied to an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTier {
    /// Slippage tolerance in basis points (100 = 1%)
    pub slippage_bps: u16,
    /// Priority fee in SOL
    pub priority_fee_sol: Decimal,
}

impl FeeTier {
    pub fn new(slippage_bps: u16, priority_fee_sol: Decimal) -> Self {
        Self {
            slippage_bps,
            priority_fee_sol,
        }
    }

    /// Slippage as a whole percentage
    pub fn slippage_pct(&self) -> Decimal {
        Decimal::from(self.slippage_bps) / Decimal::from(100u16)
    }
}

/// Token fields carried by the create instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub name: String,
    pub symbol: String,
    pub uri: String,
}

/// One wallet's trade in one phase
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub signer: Pubkey,
    pub action: TradeAction,
    pub mint: Pubkey,
    pub amount: TradeAmount,
    pub fee: FeeTier,
    pub venue: Venue,
    /// Present only on create intents
    pub token: Option<TokenPayload>,
}

impl TradeIntent {
    pub fn is_create(&self) -> bool {
        self.action == TradeAction::Create
    }
}
