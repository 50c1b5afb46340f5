//! PumpPortal trade-local wire types

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::domain::amount::TradeAmount;
use crate::domain::intent::{TokenPayload, TradeIntent};

/// `amount` field: a SOL number or a `"50%"` holdings string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WireAmount {
    Sol(f64),
    Percent(String),
}

/// One entry of the trade-local request array
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeLocalRequest {
    pub public_key: String,
    pub action: String,
    pub mint: String,
    /// `"true"` when `amount` is SOL, `"false"` for holdings percentages
    pub denominated_in_sol: String,
    pub amount: WireAmount,
    /// Percent, not basis points
    pub slippage: f64,
    /// SOL
    pub priority_fee: f64,
    pub pool: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_metadata: Option<TokenPayload>,
}

impl From<&TradeIntent> for TradeLocalRequest {
    fn from(intent: &TradeIntent) -> Self {
        let (amount, in_sol) = match intent.amount {
            TradeAmount::Sol(sol) => (WireAmount::Sol(sol.to_f64().unwrap_or(0.0)), true),
            TradeAmount::PercentOfHoldings(pct) => (WireAmount::Percent(format!("{}%", pct)), false),
        };

        Self {
            public_key: intent.signer.to_string(),
            action: intent.action.as_str().to_string(),
            mint: intent.mint.to_string(),
            denominated_in_sol: in_sol.to_string(),
            amount,
            slippage: intent.fee.slippage_pct().to_f64().unwrap_or(0.0),
            priority_fee: intent.fee.priority_fee_sol.to_f64().unwrap_or(0.0),
            pool: intent.venue.as_str().to_string(),
            token_metadata: intent.token.clone(),
        }
    }
}
