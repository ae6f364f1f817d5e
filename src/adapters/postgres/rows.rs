//! Database row shapes and their conversion into domain types.

use chrono::{DateTime, Utc};

use crate::domain::token::Token;
use crate::domain::trade::{Trade, TradeSide};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TokenRow {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
    pub bonding_curve: Option<String>,
    pub deployed_by: String,
    pub creator_wallet: String,
    pub platform: String,
    pub signature: Option<String>,
    pub graduated: bool,
    pub raydium_pool: Option<String>,
    pub market_cap: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub holders: i32,
    pub txns_24h: i32,
    pub price: f64,
    pub price_24h_ago: f64,
    pub created_at: DateTime<Utc>,
    pub graduated_at: Option<DateTime<Utc>>,
}

impl From<TokenRow> for Token {
    fn from(row: TokenRow) -> Self {
        Token {
            mint: row.mint,
            name: row.name,
            symbol: row.symbol,
            description: row.description,
            image: row.image,
            twitter: row.twitter,
            telegram: row.telegram,
            website: row.website,
            bonding_curve: row.bonding_curve,
            deployed_by: row.deployed_by,
            creator_wallet: row.creator_wallet,
            platform: row.platform,
            signature: row.signature,
            graduated: row.graduated,
            raydium_pool: row.raydium_pool,
            market_cap: row.market_cap,
            liquidity: row.liquidity,
            volume_24h: row.volume_24h,
            holders: row.holders,
            txns_24h: row.txns_24h,
            price: row.price,
            price_24h_ago: row.price_24h_ago,
            created_at: row.created_at,
            graduated_at: row.graduated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TradeRow {
    pub id: i64,
    pub token_mint: String,
    pub trader_wallet: String,
    #[sqlx(rename = "type")]
    pub side: String,
    pub amount_in: f64,
    pub amount_out: f64,
    pub price: f64,
    pub referral_earned: f64,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TradeRow> for Trade {
    type Error = String;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let side: TradeSide = row.side.parse()?;
        Ok(Trade {
            id: row.id,
            token_mint: row.token_mint,
            trader_wallet: row.trader_wallet,
            side,
            amount_in: row.amount_in,
            amount_out: row.amount_out,
            price: row.price,
            referral_earned: row.referral_earned,
            signature: row.signature,
            created_at: row.created_at,
        })
    }
}
