use async_trait::async_trait;
use thiserror::Error;

pub use crate::adapters::jupiter::{QuoteRequest, QuoteResponse, SwapRequest, SwapResponse};

#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Transport failure or unexpected upstream status
    #[error("API request failed: {0}")]
    ApiError(String),
    /// The aggregator answered with an `{"error": ...}` body
    #[error("{0}")]
    Rejected(String),
    #[error("Slippage tolerance exceeded")]
    SlippageExceeded,
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl ExecutionError {
    /// Errors caused by the request itself rather than the upstream service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExecutionError::Rejected(_)
                | ExecutionError::SlippageExceeded
                | ExecutionError::InvalidParameters(_)
        )
    }
}

/// Swap aggregator port: quotes and unsigned swap transactions
#[async_trait]
pub trait SwapPort: Send + Sync {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError>;

    /// Build a swap transaction for the user to sign
    async fn swap_transaction(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError>;
}
