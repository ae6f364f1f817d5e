//! Price Updater
//!
//! Refreshes stored token prices from Jupiter by quoting 1 SOL against each
//! active token. Runs from the cron endpoint or the `update-prices` command.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::constants::{DEFAULT_SLIPPAGE_BPS, LAMPORTS_PER_SOL, SOL_MINT};
use crate::ports::execution::{QuoteRequest, SwapPort};
use crate::ports::repository::{RepositoryError, TokenRepository};

/// Tokens refreshed per run
pub const UPDATE_BATCH_SIZE: i64 = 100;

#[derive(Debug, Error)]
pub enum PriceUpdateError {
    #[error("Database not configured")]
    NoDatabase,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub updated: usize,
    pub total: usize,
}

/// Token price in SOL given the token amount one SOL buys
pub fn price_from_quote(out_amount: u64) -> Option<f64> {
    if out_amount == 0 {
        return None;
    }
    let tokens_per_sol = out_amount as f64 / LAMPORTS_PER_SOL as f64;
    Some(1.0 / tokens_per_sol)
}

#[derive(Clone)]
pub struct PriceUpdater {
    swap: Arc<dyn SwapPort>,
    repository: Option<Arc<dyn TokenRepository>>,
}

impl PriceUpdater {
    pub fn new(swap: Arc<dyn SwapPort>, repository: Option<Arc<dyn TokenRepository>>) -> Self {
        Self { swap, repository }
    }

    /// Refresh up to 100 non-graduated tokens, newest first. A token whose
    /// quote fails keeps its old price.
    pub async fn run(&self) -> Result<UpdateSummary, PriceUpdateError> {
        let repository = self.repository.as_ref().ok_or(PriceUpdateError::NoDatabase)?;
        let tokens = repository.active_tokens(UPDATE_BATCH_SIZE).await?;

        let mut updated = 0;
        for token in &tokens {
            let request = QuoteRequest::new(
                SOL_MINT.to_string(),
                token.mint.clone(),
                LAMPORTS_PER_SOL,
                DEFAULT_SLIPPAGE_BPS,
            );

            let quote = match self.swap.quote(&request).await {
                Ok(quote) => quote,
                Err(e) => {
                    tracing::warn!(mint = %token.mint, error = %e, "Failed to update price");
                    continue;
                }
            };

            let Some(price) = price_from_quote(quote.output_amount()) else {
                tracing::warn!(mint = %token.mint, "Quote returned no output");
                continue;
            };

            match repository.update_token_price(&token.mint, price).await {
                Ok(true) => updated += 1,
                Ok(false) => tracing::debug!(mint = %token.mint, "Token disappeared during update"),
                Err(e) => tracing::warn!(mint = %token.mint, error = %e, "Failed to store price"),
            }
        }

        let summary = UpdateSummary {
            updated,
            total: tokens.len(),
        };
        tracing::info!(updated = summary.updated, total = summary.total, "Price update finished");
        Ok(summary)
    }
}
