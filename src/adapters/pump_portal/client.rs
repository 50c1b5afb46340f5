//! PumpPortal trade-local client
//!
//! Compiles trade intents into unsigned transactions. The endpoint takes the
//! whole group as one JSON array and answers with base58 transactions in the
//! same order.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::types::TradeLocalRequest;
use crate::domain::intent::TradeIntent;
use crate::ports::compiler::{CompilerError, TransactionCompilerPort};

pub const DEFAULT_TRADE_LOCAL_URL: &str = "https://pumpportal.fun/api/trade-local";

#[derive(Debug, Clone)]
pub struct PumpPortalConfig {
    /// trade-local endpoint URL
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for PumpPortalConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_TRADE_LOCAL_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the PumpPortal transaction compiler
#[derive(Debug, Clone)]
pub struct PumpPortalClient {
    config: PumpPortalConfig,
    http: Client,
}

impl PumpPortalClient {
    pub fn new() -> Result<Self, CompilerError> {
        Self::with_config(PumpPortalConfig::default())
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, CompilerError> {
        Self::with_config(PumpPortalConfig {
            url: url.into(),
            ..Default::default()
        })
    }

    pub fn with_config(config: PumpPortalConfig) -> Result<Self, CompilerError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompilerError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl TransactionCompilerPort for PumpPortalClient {
    async fn compile(&self, intents: &[TradeIntent]) -> Result<Vec<String>, CompilerError> {
        let body: Vec<TradeLocalRequest> = intents.iter().map(TradeLocalRequest::from).collect();

        let response = self
            .http
            .post(&self.config.url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CompilerError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text().await {
                Ok(text) if !text.trim().is_empty() => text,
                _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
            };
            return Err(CompilerError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let transactions: Vec<String> = response
            .json()
            .await
            .map_err(|e| CompilerError::MalformedResponse(e.to_string()))?;

        if transactions.len() != intents.len() {
            return Err(CompilerError::MalformedResponse(format!(
                "expected {} transactions, got {}",
                intents.len(),
                transactions.len()
            )));
        }

        tracing::debug!(count = transactions.len(), "Compiled trade intents");
        Ok(transactions)
    }
}
