//! Market Data Port
//!
//! Boosted-token listings and pair data in the shape DexScreener returns
//! them, plus the mapping into the client-facing `TokenView`.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::constants::graduation_progress;
use crate::domain::format::price_24h_ago;
use crate::domain::token::TokenView;

/// Chain id DexScreener uses for Solana
pub const SOLANA_CHAIN_ID: &str = "solana";

/// Market data error type
#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Market data API error: {0}")]
    Status(u16),

    #[error("Data parsing error: {0}")]
    ParseError(String),
}

/// Entry of the boosted-token listings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenBoost {
    pub url: Option<String>,
    pub chain_id: String,
    pub token_address: String,
    pub amount: Option<f64>,
    pub total_amount: Option<f64>,
    pub icon: Option<String>,
    pub description: Option<String>,
}

impl TokenBoost {
    pub fn is_solana(&self) -> bool {
        self.chain_id == SOLANA_CHAIN_ID
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
}

/// Values keyed by timeframe; only the 24h window is consumed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeframes {
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TxnCount {
    pub buys: u64,
    pub sells: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairTxns {
    pub h24: Option<TxnCount>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairLiquidity {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairWebsite {
    pub label: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairSocial {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PairInfo {
    pub image_url: Option<String>,
    pub websites: Vec<PairWebsite>,
    pub socials: Vec<PairSocial>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairBoosts {
    pub active: u64,
}

/// A DEX trading pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketPair {
    pub chain_id: String,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub pair_address: Option<String>,
    pub base_token: PairToken,
    pub quote_token: PairToken,
    pub price_native: Option<String>,
    pub price_usd: Option<String>,
    pub txns: PairTxns,
    pub volume: Timeframes,
    pub price_change: Timeframes,
    pub liquidity: PairLiquidity,
    pub fdv: Option<f64>,
    pub market_cap: Option<f64>,
    /// Creation time in epoch milliseconds
    pub pair_created_at: Option<i64>,
    pub info: Option<PairInfo>,
    pub boosts: Option<PairBoosts>,
}

impl MarketPair {
    pub fn is_solana(&self) -> bool {
        self.chain_id == SOLANA_CHAIN_ID
    }

    pub fn price_usd(&self) -> f64 {
        self.price_usd
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .unwrap_or(0.0)
    }

    pub fn price_change_24h(&self) -> f64 {
        self.price_change.h24.unwrap_or(0.0)
    }

    pub fn volume_24h(&self) -> f64 {
        self.volume.h24.unwrap_or(0.0)
    }

    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.usd.unwrap_or(0.0)
    }

    /// Market cap, falling back to fully diluted valuation
    pub fn market_cap(&self) -> f64 {
        self.market_cap.or(self.fdv).unwrap_or(0.0)
    }

    pub fn txns_24h(&self) -> u64 {
        self.txns.h24.map(|t| t.buys + t.sells).unwrap_or(0)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.pair_created_at
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn image_url(&self) -> Option<String> {
        self.info.as_ref().and_then(|i| i.image_url.clone())
    }

    /// URL of the first social link of the given type ("twitter", "telegram")
    pub fn social(&self, kind: &str) -> Option<String> {
        self.info
            .as_ref()?
            .socials
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.url.clone())
    }

    pub fn website(&self) -> Option<String> {
        self.info
            .as_ref()?
            .websites
            .first()
            .map(|w| w.url.clone())
    }

    pub fn active_boosts(&self) -> u64 {
        self.boosts.as_ref().map(|b| b.active).unwrap_or(0)
    }

    /// Symbols of quote-like assets the search feed leaves out
    pub fn is_base_asset(&self) -> bool {
        matches!(self.base_token.symbol.as_str(), "SOL" | "USDC" | "USDT")
            || self.base_token.name.to_lowercase().contains("wrapped")
    }

    /// Map the pair into a `TokenView`.
    ///
    /// `platform` is used when the pair carries no DEX id.
    pub fn to_view(&self, platform: &str) -> TokenView {
        let price = self.price_usd();
        let change = self.price_change_24h();
        let market_cap = self.market_cap();

        TokenView {
            mint: self.base_token.address.clone(),
            name: non_empty_or(&self.base_token.name, "Unknown"),
            symbol: non_empty_or(&self.base_token.symbol, "???"),
            description: None,
            image: self.image_url(),
            twitter: self.social("twitter"),
            telegram: self.social("telegram"),
            website: self.website(),
            bonding_curve: None,
            price,
            price_24h_ago: price_24h_ago(price, change),
            price_change_24h: change,
            market_cap,
            volume_24h: self.volume_24h(),
            liquidity: self.liquidity_usd(),
            holders: 0,
            txns_24h: i64::try_from(self.txns_24h()).unwrap_or(i64::MAX),
            created_at: self.created_at(),
            creator_wallet: String::new(),
            deployed_by: String::new(),
            platform: self.dex_id.clone().unwrap_or_else(|| platform.to_string()),
            graduated: false,
            raydium_pool: None,
            graduation_progress: graduation_progress(market_cap),
            boosts: None,
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Market data port trait
#[async_trait]
pub trait MarketDataPort: Send + Sync {
    /// Tokens with the most active boosts
    async fn top_boosts(&self) -> Result<Vec<TokenBoost>, MarketDataError>;

    /// Most recently boosted tokens
    async fn latest_boosts(&self) -> Result<Vec<TokenBoost>, MarketDataError>;

    /// Pair details for many token addresses on one chain
    async fn tokens_by_addresses(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> Result<Vec<MarketPair>, MarketDataError>;

    /// All pairs trading a token
    async fn pairs_for_token(&self, address: &str) -> Result<Vec<MarketPair>, MarketDataError>;

    /// Free-text pair search
    async fn search_pairs(&self, query: &str) -> Result<Vec<MarketPair>, MarketDataError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR_JSON: &str = r#"{
        "chainId": "solana",
        "dexId": "raydium",
        "pairAddress": "Pair111",
        "baseToken": {"address": "Mint111", "name": "Moon Lab", "symbol": "MLAB"},
        "quoteToken": {"address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL"},
        "priceUsd": "0.002",
        "txns": {"h24": {"buys": 120, "sells": 80}},
        "volume": {"h24": 50000.5},
        "priceChange": {"h24": 100},
        "liquidity": {"usd": 12000},
        "fdv": 2000000,
        "pairCreatedAt": 1700000000000,
        "info": {
            "imageUrl": "https://cdn.example/img.png",
            "websites": [{"label": "Website", "url": "https://moonlab.xyz"}],
            "socials": [{"type": "twitter", "url": "https://x.com/moonlab"}]
        },
        "boosts": {"active": 30}
    }"#;

    #[test]
    fn test_pair_parsing_and_accessors() {
        let pair: MarketPair = serde_json::from_str(PAIR_JSON).unwrap();
        assert!(pair.is_solana());
        assert_eq!(pair.price_usd(), 0.002);
        assert_eq!(pair.market_cap(), 2_000_000.0);
        assert_eq!(pair.txns_24h(), 200);
        assert_eq!(pair.active_boosts(), 30);
        assert_eq!(pair.social("twitter").as_deref(), Some("https://x.com/moonlab"));
        assert!(pair.social("telegram").is_none());
        assert_eq!(pair.website().as_deref(), Some("https://moonlab.xyz"));
        assert_eq!(pair.created_at().map(|d| d.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_pair_to_view() {
        let pair: MarketPair = serde_json::from_str(PAIR_JSON).unwrap();
        let view = pair.to_view("DexScreener");

        assert_eq!(view.mint, "Mint111");
        assert_eq!(view.platform, "raydium");
        assert!((view.price_24h_ago - 0.001).abs() < 1e-12);
        assert_eq!(view.holders, 0);
        assert_eq!(view.graduation_progress, 100.0);
    }

    #[test]
    fn test_sparse_pair_defaults() {
        let pair: MarketPair = serde_json::from_str(r#"{"chainId": "solana"}"#).unwrap();
        let view = pair.to_view("Unknown");

        assert_eq!(view.name, "Unknown");
        assert_eq!(view.symbol, "???");
        assert_eq!(view.platform, "Unknown");
        assert_eq!(view.price, 0.0);
        assert_eq!(view.market_cap, 0.0);
        assert!(view.created_at.is_none());
    }

    #[test]
    fn test_base_asset_filter() {
        let mut pair = MarketPair::default();
        pair.base_token.symbol = "USDC".to_string();
        assert!(pair.is_base_asset());

        pair.base_token.symbol = "WBTC".to_string();
        pair.base_token.name = "Wrapped Bitcoin".to_string();
        assert!(pair.is_base_asset());

        pair.base_token.name = "Moon".to_string();
        pair.base_token.symbol = "MOON".to_string();
        assert!(!pair.is_base_asset());
    }

    #[test]
    fn test_boost_chain_filter() {
        let boost: TokenBoost = serde_json::from_str(
            r#"{"chainId": "ethereum", "tokenAddress": "0xabc", "totalAmount": 500}"#,
        )
        .unwrap();
        assert!(!boost.is_solana());
        assert_eq!(boost.total_amount, Some(500.0));
    }
}
