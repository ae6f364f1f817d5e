//! Postgres Token Repository
//!
//! sqlx implementation of `TokenRepository` over the `tokens` and `trades`
//! tables created by the embedded migrations.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::rows::{TokenRow, TradeRow};
use crate::domain::category::TrendingCategory;
use crate::domain::constants::GRADUATING_MARKET_CAP;
use crate::domain::stats::PlatformStats;
use crate::domain::token::{NewToken, Token, TokenStatsUpdate};
use crate::domain::trade::{NewTrade, Trade};
use crate::ports::repository::{RepositoryError, TokenRepository};

const HOT_QUERY: &str = "SELECT * FROM tokens WHERE graduated = false \
     ORDER BY volume_24h DESC, market_cap DESC LIMIT $1";

const NEW_QUERY: &str = "SELECT * FROM tokens ORDER BY created_at DESC LIMIT $1";

const GRADUATING_QUERY: &str = "SELECT * FROM tokens WHERE graduated = false \
     AND market_cap >= $2 ORDER BY market_cap DESC LIMIT $1";

const GAINERS_QUERY: &str = "SELECT * FROM tokens WHERE price_24h_ago > 0 \
     ORDER BY ((price - price_24h_ago) / price_24h_ago) DESC LIMIT $1";

const VOLUME_QUERY: &str = "SELECT * FROM tokens ORDER BY volume_24h DESC LIMIT $1";

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

/// Pool settings
#[derive(Debug, Clone)]
pub struct PgConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PgConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgTokenRepository {
    pool: PgPool,
}

impl PgTokenRepository {
    /// Connect lazily; the first query opens the connection
    pub fn connect_lazy(config: &PgConfig) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy(&config.url)
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    pub async fn connect(config: &PgConfig) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.url)
            .await
            .map_err(db_err)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Migration(e.to_string()))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    async fn fetch_tokens(&self, sql: &str, limit: i64) -> Result<Vec<Token>, RepositoryError> {
        let rows = sqlx::query_as::<_, TokenRow>(sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Token::from).collect())
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn tokens_by_category(
        &self,
        category: TrendingCategory,
        limit: i64,
    ) -> Result<Vec<Token>, RepositoryError> {
        match category {
            TrendingCategory::Hot => self.fetch_tokens(HOT_QUERY, limit).await,
            TrendingCategory::New => self.fetch_tokens(NEW_QUERY, limit).await,
            TrendingCategory::Gainers => self.fetch_tokens(GAINERS_QUERY, limit).await,
            TrendingCategory::Volume => self.fetch_tokens(VOLUME_QUERY, limit).await,
            TrendingCategory::Graduating => {
                let rows = sqlx::query_as::<_, TokenRow>(GRADUATING_QUERY)
                    .bind(limit)
                    .bind(GRADUATING_MARKET_CAP)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(db_err)?;
                Ok(rows.into_iter().map(Token::from).collect())
            }
        }
    }

    async fn token_by_mint(&self, mint: &str) -> Result<Option<Token>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>("SELECT * FROM tokens WHERE mint = $1")
            .bind(mint)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.map(Token::from))
    }

    async fn insert_token(&self, token: NewToken) -> Result<Token, RepositoryError> {
        let mint = token.mint.clone();
        let row = sqlx::query_as::<_, TokenRow>(
            "INSERT INTO tokens (
                mint, name, symbol, description, image,
                twitter, telegram, website, bonding_curve,
                deployed_by, creator_wallet, platform, signature,
                price, market_cap, liquidity, volume_24h, holders, txns_24h,
                created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, NOW()
            ) RETURNING *",
        )
        .bind(token.mint)
        .bind(token.name)
        .bind(token.symbol)
        .bind(token.description)
        .bind(token.image)
        .bind(token.twitter)
        .bind(token.telegram)
        .bind(token.website)
        .bind(token.bonding_curve)
        .bind(token.deployed_by)
        .bind(token.creator_wallet)
        .bind(token.platform)
        .bind(token.signature)
        .bind(token.price)
        .bind(token.market_cap)
        .bind(token.liquidity)
        .bind(token.volume_24h)
        .bind(token.holders)
        .bind(token.txns_24h)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(mint.clone())
            }
            other => db_err(other),
        })?;

        Ok(row.into())
    }

    async fn update_token_stats(
        &self,
        mint: &str,
        update: &TokenStatsUpdate,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE tokens SET
                price = COALESCE($2, price),
                market_cap = COALESCE($3, market_cap),
                volume_24h = COALESCE($4, volume_24h),
                holders = COALESCE($5, holders),
                liquidity = COALESCE($6, liquidity)
            WHERE mint = $1",
        )
        .bind(mint)
        .bind(update.price)
        .bind(update.market_cap)
        .bind(update.volume_24h)
        .bind(update.holders)
        .bind(update.liquidity)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_token_price(&self, mint: &str, price: f64) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE tokens SET
                price_24h_ago = CASE
                    WHEN created_at < NOW() - INTERVAL '24 hours' THEN price
                    ELSE price_24h_ago
                END,
                price = $2
            WHERE mint = $1",
        )
        .bind(mint)
        .bind(price)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn active_tokens(&self, limit: i64) -> Result<Vec<Token>, RepositoryError> {
        self.fetch_tokens(
            "SELECT * FROM tokens WHERE graduated = false ORDER BY created_at DESC LIMIT $1",
            limit,
        )
        .await
    }

    async fn insert_trade(&self, trade: NewTrade) -> Result<Trade, RepositoryError> {
        let row = sqlx::query_as::<_, TradeRow>(
            "INSERT INTO trades (
                token_mint, trader_wallet, type,
                amount_in, amount_out, price,
                referral_earned, signature, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            RETURNING *",
        )
        .bind(trade.token_mint)
        .bind(trade.trader_wallet)
        .bind(trade.side.as_str())
        .bind(trade.amount_in)
        .bind(trade.amount_out)
        .bind(trade.price)
        .bind(trade.referral_earned)
        .bind(trade.signature)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        Trade::try_from(row).map_err(RepositoryError::Database)
    }

    async fn recent_trades(&self, mint: &str, limit: i64) -> Result<Vec<Trade>, RepositoryError> {
        let rows = sqlx::query_as::<_, TradeRow>(
            "SELECT * FROM trades WHERE token_mint = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(mint)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|row| Trade::try_from(row).map_err(RepositoryError::Database))
            .collect()
    }

    async fn search_tokens(&self, query: &str, limit: i64) -> Result<Vec<Token>, RepositoryError> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, TokenRow>(
            "SELECT * FROM tokens
            WHERE name ILIKE $1 OR symbol ILIKE $1 OR mint = $2
            ORDER BY market_cap DESC
            LIMIT $3",
        )
        .bind(pattern)
        .bind(query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(Token::from).collect())
    }

    async fn platform_stats(&self) -> Result<PlatformStats, RepositoryError> {
        let (total_volume, total_tokens, total_traders, total_earnings) = tokio::try_join!(
            sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(volume_24h), 0)::DOUBLE PRECISION FROM tokens")
                .fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tokens").fetch_one(&self.pool),
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(DISTINCT trader_wallet) FROM trades \
                 WHERE created_at > NOW() - INTERVAL '24 hours'"
            )
            .fetch_one(&self.pool),
            sqlx::query_scalar::<_, f64>(
                "SELECT COALESCE(SUM(referral_earned), 0)::DOUBLE PRECISION FROM trades"
            )
            .fetch_one(&self.pool),
        )
        .map_err(db_err)?;

        Ok(PlatformStats {
            total_volume,
            total_tokens,
            total_traders,
            total_earnings,
            volume_change: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_queries_are_limited() {
        for sql in [HOT_QUERY, NEW_QUERY, GRADUATING_QUERY, GAINERS_QUERY, VOLUME_QUERY] {
            assert!(sql.contains("LIMIT $1"), "{}", sql);
        }
        assert!(HOT_QUERY.contains("graduated = false"));
        assert!(GAINERS_QUERY.contains("price_24h_ago > 0"));
    }

    #[tokio::test]
    async fn test_lazy_pool_rejects_bad_url() {
        let config = PgConfig::new("not-a-url".to_string());
        assert!(PgTokenRepository::connect_lazy(&config).is_err());
    }
}
