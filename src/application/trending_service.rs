//! Trending Feeds
//!
//! Three feeds over the same token view:
//! - boosted: DexScreener top boosts with batched pair details
//! - listed: launched tokens from the database, DexScreener boosts otherwise
//! - searched: DexScreener pair search per category

use std::sync::Arc;

use thiserror::Error;

use crate::domain::category::{cmp_desc, search_term, TrendingCategory};
use crate::domain::token::TokenView;
use crate::ports::market_data::{MarketDataError, MarketDataPort, MarketPair, SOLANA_CHAIN_ID};
use crate::ports::repository::TokenRepository;

/// Token lookups per boosted feed request
pub const MAX_BOOSTED_LOOKUPS: usize = 30;

/// Platform label for boosted listings
pub const BOOSTED_PLATFORM: &str = "DexScreener";

#[derive(Debug, Error)]
pub enum TrendingError {
    #[error("Market data unavailable: {0}")]
    MarketData(#[from] MarketDataError),
}

#[derive(Clone)]
pub struct TrendingService {
    market: Arc<dyn MarketDataPort>,
    repository: Option<Arc<dyn TokenRepository>>,
}

impl TrendingService {
    pub fn new(market: Arc<dyn MarketDataPort>, repository: Option<Arc<dyn TokenRepository>>) -> Self {
        Self { market, repository }
    }

    /// Boosted Solana tokens, ordered by category
    pub async fn boosted(
        &self,
        category: TrendingCategory,
        limit: usize,
    ) -> Result<Vec<TokenView>, TrendingError> {
        let addresses: Vec<String> = self
            .market
            .top_boosts()
            .await?
            .into_iter()
            .filter(|b| b.is_solana())
            .map(|b| b.token_address)
            .take(MAX_BOOSTED_LOOKUPS)
            .collect();

        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let pairs = match self
            .market
            .tokens_by_addresses(SOLANA_CHAIN_ID, &addresses)
            .await
        {
            Ok(pairs) => pairs,
            Err(MarketDataError::Status(status)) => {
                tracing::warn!(status, "Token details unavailable, empty boosted feed");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut tokens: Vec<TokenView> = pairs
            .iter()
            .map(|pair| {
                let mut view = pair.to_view(BOOSTED_PLATFORM);
                view.platform = BOOSTED_PLATFORM.to_string();
                view.boosts = Some(pair.active_boosts());
                view
            })
            .filter(|view| !view.mint.is_empty())
            .collect();

        category.sort(&mut tokens);
        tokens.truncate(limit);
        Ok(tokens)
    }

    /// Launched tokens when the database has any, DexScreener boosts otherwise
    pub async fn listed(
        &self,
        category: TrendingCategory,
        limit: usize,
    ) -> Result<Vec<TokenView>, TrendingError> {
        if let Some(repository) = &self.repository {
            match repository.tokens_by_category(category, limit as i64).await {
                Ok(tokens) if !tokens.is_empty() => {
                    return Ok(tokens.iter().map(TokenView::from).collect());
                }
                Ok(_) => tracing::debug!(%category, "No launched tokens, using DexScreener"),
                Err(e) => tracing::warn!(error = %e, "Database unavailable, using DexScreener"),
            }
        }

        let boosts = match category {
            TrendingCategory::New => self.market.latest_boosts().await?,
            _ => self.market.top_boosts().await?,
        };

        let addresses: Vec<String> = boosts
            .into_iter()
            .filter(|b| b.is_solana())
            .map(|b| b.token_address)
            .take(limit)
            .collect();

        let mut tokens = Vec::with_capacity(addresses.len());
        for address in &addresses {
            match self.market.pairs_for_token(address).await {
                Ok(pairs) => {
                    if let Some(pair) = pairs.iter().find(|p| p.is_solana()) {
                        tokens.push(pair_view(pair, address, BOOSTED_PLATFORM));
                    }
                }
                Err(e) => {
                    tracing::debug!(%address, error = %e, "Skipping token without pair data");
                }
            }
        }

        tokens.sort_by(|a, b| cmp_desc(a.volume_24h, b.volume_24h));
        tokens.truncate(limit);
        Ok(tokens)
    }

    /// Solana pairs from a DexScreener search, quote assets left out.
    ///
    /// `category` uses the search feed's vocabulary (hot, new, rising,
    /// graduated).
    pub async fn searched(&self, category: &str, limit: usize) -> Result<Vec<TokenView>, TrendingError> {
        let pairs = self.market.search_pairs(search_term(category)).await?;

        let mut tokens: Vec<TokenView> = pairs
            .iter()
            .filter(|p| p.is_solana() && !p.is_base_asset())
            .map(|p| {
                let fallback = p.pair_address.clone().unwrap_or_default();
                pair_view(p, &fallback, "Unknown")
            })
            .filter(|view| !view.mint.is_empty())
            .collect();

        if category.trim().eq_ignore_ascii_case("new") {
            TrendingCategory::New.sort(&mut tokens);
        } else {
            TrendingCategory::Volume.sort(&mut tokens);
        }
        tokens.truncate(limit);
        Ok(tokens)
    }
}

/// View of a pair, using `mint_fallback` when the pair has no base address
pub(crate) fn pair_view(pair: &MarketPair, mint_fallback: &str, platform: &str) -> TokenView {
    let mut view = pair.to_view(platform);
    if view.mint.is_empty() {
        view.mint = mint_fallback.to_string();
    }
    view
}
