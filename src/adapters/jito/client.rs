//! Jito Bundle Client
//!
//! HTTP client for the Jito Block Engine bundle API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use solana_sdk::transaction::VersionedTransaction;

use super::config::{JitoConfig, TransactionEncoding, MAX_BUNDLE_TRANSACTIONS};
use super::error::JitoError;
use super::types::{BundleRequest, JsonRpcResponse};
use crate::ports::relay::{BundleRelayPort, RelayError};

/// Jito Block Engine client for bundle submission
#[derive(Debug, Clone)]
pub struct JitoBundleClient {
    /// Client configuration
    config: JitoConfig,
    /// HTTP client
    http: Client,
}

impl JitoBundleClient {
    /// Create a new Jito client with default configuration
    pub fn new() -> Result<Self, JitoError> {
        Self::with_config(JitoConfig::default())
    }

    /// Create a new Jito client with custom configuration
    pub fn with_config(config: JitoConfig) -> Result<Self, JitoError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| JitoError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Serialize and encode signed transactions in the configured encoding
    pub fn encode_transactions(
        &self,
        transactions: &[VersionedTransaction],
    ) -> Result<Vec<String>, JitoError> {
        transactions
            .iter()
            .map(|tx| {
                let bytes = bincode::serialize(tx)
                    .map_err(|e| JitoError::InvalidTransaction(e.to_string()))?;
                Ok(match self.config.encoding {
                    TransactionEncoding::Base58 => bs58::encode(bytes).into_string(),
                    TransactionEncoding::Base64 => {
                        base64::engine::general_purpose::STANDARD.encode(bytes)
                    }
                })
            })
            .collect()
    }

    /// Send a bundle of already-encoded transactions to the block engine
    ///
    /// # Returns
    /// Bundle ID on success
    pub async fn send_bundle(&self, transactions: Vec<String>) -> Result<String, JitoError> {
        if transactions.is_empty() {
            return Err(JitoError::InvalidBundle("Bundle cannot be empty".into()));
        }

        if transactions.len() > MAX_BUNDLE_TRANSACTIONS {
            return Err(JitoError::InvalidBundle(format!(
                "Bundle cannot contain more than {} transactions",
                MAX_BUNDLE_TRANSACTIONS
            )));
        }

        let request = BundleRequest::new(transactions, self.config.encoding);

        let mut req_builder = self
            .http
            .post(self.config.bundles_url())
            .header("Content-Type", "application/json")
            .json(&request);

        // Add API token if configured
        if let Some(ref token) = self.config.api_token {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = req_builder.send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(JitoError::RateLimited);
        }

        let response_text = response.text().await?;

        let rpc_response: JsonRpcResponse<String> = match serde_json::from_str(&response_text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(JitoError::HttpStatus {
                    status: status.as_u16(),
                    body: response_text,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = rpc_response.error {
            return Err(JitoError::ApiError {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response.result.ok_or_else(|| JitoError::ApiError {
            code: -1,
            message: "No bundle ID in response".into(),
        })
    }

    /// Execute an operation with retry logic and exponential backoff
    ///
    /// Only transport failures are retried; a rejection is returned as-is.
    pub async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, JitoError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, JitoError>>,
    {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = JitoError::NetworkError("No attempts made".into());
        let mut delay_ms = self.config.retry_delay_ms;

        for attempt in 0..attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }

                    tracing::warn!(
                        attempt = attempt + 1,
                        max = attempts,
                        error = %e,
                        "Bundle relay request failed, retrying"
                    );
                    last_error = e;

                    // Don't sleep after the last attempt
                    if attempt + 1 < attempts {
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms *= 2;
                    }
                }
            }
        }

        Err(JitoError::MaxRetriesExceeded {
            attempts,
            last_error: last_error.to_string(),
        })
    }

    /// Get the configured block engine URL
    pub fn block_engine_url(&self) -> &str {
        &self.config.block_engine_url
    }

    pub fn encoding(&self) -> TransactionEncoding {
        self.config.encoding
    }
}

#[async_trait]
impl BundleRelayPort for JitoBundleClient {
    async fn send_bundle(&self, transactions: &[VersionedTransaction]) -> Result<String, RelayError> {
        let encoded = self.encode_transactions(transactions)?;
        let bundle_id = self
            .execute_with_retry(|| JitoBundleClient::send_bundle(self, encoded.clone()))
            .await?;

        tracing::debug!(bundle_id = %bundle_id, transactions = transactions.len(), "Bundle accepted");
        Ok(bundle_id)
    }
}
