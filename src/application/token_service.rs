//! Token Lookup
//!
//! Single-token detail, trade history and search.

use std::sync::Arc;

use thiserror::Error;

use super::trending_service::pair_view;
use crate::domain::token::TokenView;
use crate::domain::trade::Trade;
use crate::ports::market_data::{MarketDataError, MarketDataPort};
use crate::ports::repository::{RepositoryError, TokenRepository};

pub const SEARCH_LIMIT: i64 = 20;
pub const TRADES_LIMIT: i64 = 50;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token address required")]
    MissingAddress,
    #[error("Token not found")]
    NotFound,
    #[error("Market data unavailable: {0}")]
    MarketData(#[from] MarketDataError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[derive(Clone)]
pub struct TokenService {
    market: Arc<dyn MarketDataPort>,
    repository: Option<Arc<dyn TokenRepository>>,
}

impl TokenService {
    pub fn new(market: Arc<dyn MarketDataPort>, repository: Option<Arc<dyn TokenRepository>>) -> Self {
        Self { market, repository }
    }

    /// Launched token row, else the first Solana pair DexScreener knows
    pub async fn get(&self, address: &str) -> Result<TokenView, TokenError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(TokenError::MissingAddress);
        }

        if let Some(repository) = &self.repository {
            match repository.token_by_mint(address).await {
                Ok(Some(token)) => return Ok(TokenView::from(&token)),
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Database unavailable, using DexScreener"),
            }
        }

        let pairs = match self.market.pairs_for_token(address).await {
            Ok(pairs) => pairs,
            Err(MarketDataError::Status(status)) => {
                tracing::debug!(%address, status, "DexScreener has no data");
                return Err(TokenError::NotFound);
            }
            Err(e) => return Err(e.into()),
        };

        let pair = pairs
            .iter()
            .find(|p| p.is_solana())
            .ok_or(TokenError::NotFound)?;

        let mut view = pair_view(pair, address, "DexScreener");
        if pair.base_token.name.is_empty() {
            view.name = "Unknown Token".to_string();
        }
        Ok(view)
    }

    /// Latest trades of a token; empty without a database
    pub async fn trades(&self, address: &str) -> Result<Vec<Trade>, TokenError> {
        match &self.repository {
            Some(repository) => Ok(repository.recent_trades(address, TRADES_LIMIT).await?),
            None => Ok(Vec::new()),
        }
    }

    /// Launched tokens matching name, symbol or mint
    pub async fn search(&self, query: &str) -> Result<Vec<TokenView>, TokenError> {
        let query = query.trim();
        let Some(repository) = &self.repository else {
            return Ok(Vec::new());
        };
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let tokens = repository.search_tokens(query, SEARCH_LIMIT).await?;
        Ok(tokens.iter().map(TokenView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::token::NewToken;
    use crate::domain::trade::{NewTrade, TradeSide};
    use crate::ports::market_data::{MarketPair, PairInfo, PairSocial, PairToken, PairWebsite};
    use crate::ports::mocks::{InMemoryTokenRepository, MockMarketData};
    use chrono::Utc;

    fn stored(mint: &str, name: &str) -> crate::domain::token::Token {
        NewToken::new(mint.into(), name.into(), "SYM".into(), "Creator".into()).into_token(Utc::now())
    }

    #[tokio::test]
    async fn test_get_from_database() {
        let repo = InMemoryTokenRepository::new().with_token(stored("Mint1", "Rocket"));
        let service = TokenService::new(Arc::new(MockMarketData::new()), Some(Arc::new(repo)));

        let view = service.get("Mint1").await.unwrap();
        assert_eq!(view.name, "Rocket");
        assert_eq!(view.platform, "Space Lab");
    }

    #[tokio::test]
    async fn test_get_falls_back_to_dexscreener() {
        let pair = MarketPair {
            chain_id: "solana".into(),
            base_token: PairToken {
                address: String::new(),
                name: String::new(),
                symbol: "DOG".into(),
            },
            info: Some(PairInfo {
                image_url: Some("https://img".into()),
                websites: vec![PairWebsite { label: None, url: "https://dog.example".into() }],
                socials: vec![PairSocial { kind: "twitter".into(), url: "https://x.com/dog".into() }],
            }),
            ..Default::default()
        };
        let market = MockMarketData::new().with_pairs("External", vec![pair]);
        let service = TokenService::new(Arc::new(market), Some(Arc::new(InMemoryTokenRepository::new())));

        let view = service.get("External").await.unwrap();
        assert_eq!(view.mint, "External");
        assert_eq!(view.name, "Unknown Token");
        assert_eq!(view.twitter.as_deref(), Some("https://x.com/dog"));
        assert_eq!(view.website.as_deref(), Some("https://dog.example"));
        assert_eq!(view.telegram, None);
    }

    #[tokio::test]
    async fn test_get_unknown_token() {
        let service = TokenService::new(Arc::new(MockMarketData::new()), None);
        assert!(matches!(service.get("Nope").await, Err(TokenError::NotFound)));
        assert!(matches!(service.get("  ").await, Err(TokenError::MissingAddress)));
    }

    #[tokio::test]
    async fn test_trades_and_search() {
        let repo = Arc::new(InMemoryTokenRepository::new().with_token(stored("Mint1", "Rocket")));
        repo.insert_trade(NewTrade {
            token_mint: "Mint1".into(),
            trader_wallet: "W".into(),
            side: TradeSide::Buy,
            amount_in: 1.0,
            amount_out: 2.0,
            price: 0.5,
            referral_earned: 0.01,
            signature: None,
        })
        .await
        .unwrap();
        let service = TokenService::new(Arc::new(MockMarketData::new()), Some(repo));

        assert_eq!(service.trades("Mint1").await.unwrap().len(), 1);
        assert_eq!(service.search("rock").await.unwrap().len(), 1);
        assert!(service.search("").await.unwrap().is_empty());
    }
}
