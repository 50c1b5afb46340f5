//! Jito Configuration
//!
//! Configuration for the Block Engine connection and bundle submission.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Jito Block Engine endpoints
pub mod endpoints {
    /// Global mainnet endpoint
    pub const MAINNET_DEFAULT: &str = "https://mainnet.block-engine.jito.wtf";
}

/// Maximum transactions the block engine accepts in one bundle
pub const MAX_BUNDLE_TRANSACTIONS: usize = 5;

/// Wire encoding of signed transactions in `sendBundle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionEncoding {
    #[default]
    Base58,
    Base64,
}

impl FromStr for TransactionEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base58" => Ok(TransactionEncoding::Base58),
            "base64" => Ok(TransactionEncoding::Base64),
            other => Err(format!("unknown transaction encoding '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionEncoding::Base58 => f.write_str("base58"),
            TransactionEncoding::Base64 => f.write_str("base64"),
        }
    }
}

/// Jito Block Engine configuration
#[derive(Debug, Clone)]
pub struct JitoConfig {
    /// Block Engine endpoint URL
    pub block_engine_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts for transport failures
    pub max_retries: u32,
    /// Retry delay base (exponential backoff)
    pub retry_delay_ms: u64,
    /// Encoding of transactions in the request body
    pub encoding: TransactionEncoding,
    /// Optional API token for authenticated requests
    pub api_token: Option<String>,
}

impl Default for JitoConfig {
    fn default() -> Self {
        Self {
            block_engine_url: endpoints::MAINNET_DEFAULT.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay_ms: 500,
            encoding: TransactionEncoding::Base58,
            api_token: None,
        }
    }
}

impl JitoConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.block_engine_url = url.into();
        self
    }

    /// Set API token
    pub fn with_api_token(mut self, token: String) -> Self {
        self.api_token = Some(token);
        self
    }

    pub fn with_encoding(mut self, encoding: TransactionEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Full bundle endpoint
    pub fn bundles_url(&self) -> String {
        format!("{}/api/v1/bundles", self.block_engine_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = JitoConfig::default();
        assert_eq!(config.block_engine_url, endpoints::MAINNET_DEFAULT);
        assert_eq!(config.encoding, TransactionEncoding::Base58);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_bundles_url() {
        let config = JitoConfig::default().with_url("https://relay.example/");
        assert_eq!(config.bundles_url(), "https://relay.example/api/v1/bundles");
    }

    #[test]
    fn test_encoding_parse() {
        assert_eq!("BASE64".parse::<TransactionEncoding>().unwrap(), TransactionEncoding::Base64);
        assert!("hex".parse::<TransactionEncoding>().is_err());
    }
}
