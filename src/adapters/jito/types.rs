//! Jito Bundle Types
//!
//! JSON-RPC request and response types for the Block Engine bundle API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::config::TransactionEncoding;

/// Bundle submission request (JSON-RPC format)
#[derive(Debug, Clone, Serialize)]
pub struct BundleRequest {
    /// JSON-RPC version
    pub jsonrpc: String,
    /// Request ID
    pub id: u64,
    /// Method name
    pub method: String,
    /// `[[tx, ...]]` or `[[tx, ...], {"encoding": "base64"}]`
    pub params: Vec<Value>,
}

impl BundleRequest {
    /// Create a new bundle request from encoded transactions
    pub fn new(transactions: Vec<String>, encoding: TransactionEncoding) -> Self {
        let mut params = vec![json!(transactions)];
        if encoding == TransactionEncoding::Base64 {
            params.push(json!({ "encoding": "base64" }));
        }

        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: "sendBundle".to_string(),
            params,
        }
    }

    pub fn transaction_count(&self) -> usize {
        self.params
            .first()
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// JSON-RPC response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    /// Result (if success)
    pub result: Option<T>,
    /// Error (if failure)
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default)]
    pub data: Option<Value>,
}
