use async_trait::async_trait;
use thiserror::Error;

use crate::domain::intent::TradeIntent;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompilerError {
    /// Non-success HTTP response
    #[error("Compiler rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Compiler request failed: {0}")]
    Transport(String),
    #[error("Malformed compiler response: {0}")]
    MalformedResponse(String),
}

impl CompilerError {
    /// HTTP status if the compiler answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            CompilerError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Remote service turning trade intents into unsigned transactions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionCompilerPort: Send + Sync {
    /// One base58 transaction blob per intent, same order
    async fn compile(&self, intents: &[TradeIntent]) -> Result<Vec<String>, CompilerError>;
}
