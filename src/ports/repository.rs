use async_trait::async_trait;
use thiserror::Error;

use crate::domain::category::TrendingCategory;
use crate::domain::stats::PlatformStats;
use crate::domain::token::{NewToken, Token, TokenStatsUpdate};
use crate::domain::trade::{NewTrade, Trade};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Token already exists: {0}")]
    Duplicate(String),
    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Persistence for launched tokens and executed trades
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Tokens for a feed category.
    ///
    /// - hot: not graduated, by 24h volume then market cap
    /// - new: newest first
    /// - graduating: not graduated, market cap at or above 50k, by market cap
    /// - gainers: tokens with a reference price, by 24h change
    /// - volume: by 24h volume
    async fn tokens_by_category(
        &self,
        category: TrendingCategory,
        limit: i64,
    ) -> Result<Vec<Token>, RepositoryError>;

    async fn token_by_mint(&self, mint: &str) -> Result<Option<Token>, RepositoryError>;

    async fn insert_token(&self, token: NewToken) -> Result<Token, RepositoryError>;

    /// Overwrite the fields set in `update`; returns false when the mint is unknown
    async fn update_token_stats(
        &self,
        mint: &str,
        update: &TokenStatsUpdate,
    ) -> Result<bool, RepositoryError>;

    /// Store a fresh price, moving the old one into `price_24h_ago` when the
    /// token is older than a day
    async fn update_token_price(&self, mint: &str, price: f64) -> Result<bool, RepositoryError>;

    /// Non-graduated tokens, newest first
    async fn active_tokens(&self, limit: i64) -> Result<Vec<Token>, RepositoryError>;

    async fn insert_trade(&self, trade: NewTrade) -> Result<Trade, RepositoryError>;

    /// Trades for a token, newest first
    async fn recent_trades(&self, mint: &str, limit: i64) -> Result<Vec<Trade>, RepositoryError>;

    /// Case-insensitive name/symbol match or exact mint, by market cap
    async fn search_tokens(&self, query: &str, limit: i64) -> Result<Vec<Token>, RepositoryError>;

    async fn platform_stats(&self) -> Result<PlatformStats, RepositoryError>;
}
