//! Token Records
//!
//! Stored token rows, insert/update payloads, the client-facing token view
//! and launch metadata validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    graduation_progress, INITIAL_TOKEN_PRICE, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH,
    MAX_SYMBOL_LENGTH, PLATFORM_NAME,
};

/// A row of the `tokens` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
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

impl Token {
    /// 24h price change in percent (0 when no reference price is known)
    pub fn price_change_24h(&self) -> f64 {
        super::format::calculate_change(self.price, self.price_24h_ago)
    }
}

/// Insert payload for a newly launched token
#[derive(Debug, Clone, PartialEq)]
pub struct NewToken {
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
    pub price: f64,
    pub market_cap: f64,
    pub liquidity: f64,
    pub volume_24h: f64,
    pub holders: i32,
    pub txns_24h: i32,
}

impl NewToken {
    /// Create an insert payload with launch defaults
    pub fn new(mint: String, name: String, symbol: String, creator_wallet: String) -> Self {
        Self {
            mint,
            name,
            symbol,
            description: None,
            image: None,
            twitter: None,
            telegram: None,
            website: None,
            bonding_curve: None,
            deployed_by: creator_wallet.clone(),
            creator_wallet,
            platform: PLATFORM_NAME.to_string(),
            signature: None,
            price: INITIAL_TOKEN_PRICE,
            market_cap: 0.0,
            liquidity: 0.0,
            volume_24h: 0.0,
            holders: 1,
            txns_24h: 0,
        }
    }

    /// Copy description, image and socials from launch metadata
    pub fn with_metadata(mut self, metadata: &LaunchMetadata) -> Self {
        self.description = Some(metadata.description.clone());
        self.image = metadata.image.clone();
        self.twitter = metadata.twitter.clone();
        self.telegram = metadata.telegram.clone();
        self.website = metadata.website.clone();
        self
    }

    pub fn with_signature(mut self, signature: String) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_bonding_curve(mut self, bonding_curve: String) -> Self {
        self.bonding_curve = Some(bonding_curve);
        self
    }

    pub fn deployed_by(mut self, deployer: String) -> Self {
        self.deployed_by = deployer;
        self
    }

    /// Materialize the row as the store would return it
    pub fn into_token(self, created_at: DateTime<Utc>) -> Token {
        Token {
            mint: self.mint,
            name: self.name,
            symbol: self.symbol,
            description: self.description,
            image: self.image,
            twitter: self.twitter,
            telegram: self.telegram,
            website: self.website,
            bonding_curve: self.bonding_curve,
            deployed_by: self.deployed_by,
            creator_wallet: self.creator_wallet,
            platform: self.platform,
            signature: self.signature,
            graduated: false,
            raydium_pool: None,
            market_cap: self.market_cap,
            liquidity: self.liquidity,
            volume_24h: self.volume_24h,
            holders: self.holders,
            txns_24h: self.txns_24h,
            price: self.price,
            price_24h_ago: 0.0,
            created_at,
            graduated_at: None,
        }
    }
}

/// Partial stats update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStatsUpdate {
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub holders: Option<i32>,
    pub liquidity: Option<f64>,
}

impl TokenStatsUpdate {
    /// Apply the update to an in-memory row
    pub fn apply(&self, token: &mut Token) {
        if let Some(price) = self.price {
            token.price = price;
        }
        if let Some(market_cap) = self.market_cap {
            token.market_cap = market_cap;
        }
        if let Some(volume) = self.volume_24h {
            token.volume_24h = volume;
        }
        if let Some(holders) = self.holders {
            token.holders = holders;
        }
        if let Some(liquidity) = self.liquidity {
            token.liquidity = liquidity;
        }
    }
}

/// Token shape returned to API clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonding_curve: Option<String>,
    pub price: f64,
    pub price_24h_ago: f64,
    pub price_change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub holders: i64,
    pub txns_24h: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub creator_wallet: String,
    pub deployed_by: String,
    pub platform: String,
    pub graduated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raydium_pool: Option<String>,
    pub graduation_progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boosts: Option<u64>,
}

impl From<&Token> for TokenView {
    fn from(token: &Token) -> Self {
        Self {
            mint: token.mint.clone(),
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            description: token.description.clone(),
            image: token.image.clone(),
            twitter: token.twitter.clone(),
            telegram: token.telegram.clone(),
            website: token.website.clone(),
            bonding_curve: token.bonding_curve.clone(),
            price: token.price,
            price_24h_ago: token.price_24h_ago,
            price_change_24h: token.price_change_24h(),
            market_cap: token.market_cap,
            volume_24h: token.volume_24h,
            liquidity: token.liquidity,
            holders: i64::from(token.holders),
            txns_24h: i64::from(token.txns_24h),
            created_at: Some(token.created_at),
            creator_wallet: token.creator_wallet.clone(),
            deployed_by: token.deployed_by.clone(),
            platform: token.platform.clone(),
            graduated: token.graduated,
            raydium_pool: token.raydium_pool.clone(),
            graduation_progress: if token.graduated {
                100.0
            } else {
                graduation_progress(token.market_cap)
            },
            boosts: None,
        }
    }
}

/// Launch metadata validation errors
#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Description too long: {0} characters (max {max})", max = MAX_DESCRIPTION_LENGTH)]
    DescriptionTooLong(usize),
}

/// Metadata submitted by a creator for a new token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub user_wallet: String,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub telegram: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

impl LaunchMetadata {
    /// Check required fields and length limits
    pub fn validate(&self) -> Result<(), MetadataError> {
        if self.name.trim().is_empty()
            || self.symbol.trim().is_empty()
            || self.description.trim().is_empty()
            || self.user_wallet.trim().is_empty()
        {
            return Err(MetadataError::MissingFields);
        }

        let description_len = self.description.chars().count();
        if description_len > MAX_DESCRIPTION_LENGTH {
            return Err(MetadataError::DescriptionTooLong(description_len));
        }

        Ok(())
    }

    /// Name as recorded on-chain (at most 32 bytes)
    pub fn onchain_name(&self) -> &str {
        truncate_bytes(&self.name, MAX_NAME_LENGTH)
    }

    /// Symbol as recorded on-chain (at most 10 bytes)
    pub fn onchain_symbol(&self) -> &str {
        truncate_bytes(&self.symbol, MAX_SYMBOL_LENGTH)
    }

    /// Metadata URI (the uploaded image URL, empty when none)
    pub fn uri(&self) -> &str {
        self.image.as_deref().unwrap_or("")
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character
pub fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> LaunchMetadata {
        LaunchMetadata {
            name: "Moon Lab".to_string(),
            symbol: "MLAB".to_string(),
            description: "To the moon".to_string(),
            image: Some("https://gateway.pinata.cloud/ipfs/Qm123".to_string()),
            user_wallet: "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string(),
            twitter: None,
            telegram: None,
            website: None,
        }
    }

    #[test]
    fn test_valid_metadata() {
        assert!(metadata().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut m = metadata();
        m.description = "   ".to_string();
        assert_eq!(m.validate(), Err(MetadataError::MissingFields));

        let mut m = metadata();
        m.user_wallet.clear();
        assert_eq!(m.validate(), Err(MetadataError::MissingFields));
    }

    #[test]
    fn test_description_limit() {
        let mut m = metadata();
        m.description = "x".repeat(501);
        assert_eq!(m.validate(), Err(MetadataError::DescriptionTooLong(501)));
    }

    #[test]
    fn test_onchain_truncation() {
        let mut m = metadata();
        m.name = "A".repeat(40);
        m.symbol = "SYMBOLTOOLONG".to_string();
        assert_eq!(m.onchain_name().len(), 32);
        assert_eq!(m.onchain_symbol(), "SYMBOLTOOL");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // Each rocket is 4 bytes; 10 bytes fits two of them
        let s = "🚀🚀🚀";
        assert_eq!(truncate_bytes(s, 10), "🚀🚀");
    }

    #[test]
    fn test_uri_defaults_to_empty() {
        let mut m = metadata();
        m.image = None;
        assert_eq!(m.uri(), "");
    }

    #[test]
    fn test_new_token_defaults() {
        let token = NewToken::new(
            "Mint111".to_string(),
            "Moon".to_string(),
            "MOON".to_string(),
            "Creator111".to_string(),
        );
        assert_eq!(token.platform, "Space Lab");
        assert_eq!(token.deployed_by, "Creator111");
        assert_eq!(token.holders, 1);
        assert_eq!(token.price, INITIAL_TOKEN_PRICE);
    }

    #[test]
    fn test_stats_update_keeps_unset_fields() {
        let mut token = NewToken::new(
            "Mint111".to_string(),
            "Moon".to_string(),
            "MOON".to_string(),
            "Creator111".to_string(),
        )
        .into_token(Utc::now());

        TokenStatsUpdate {
            price: Some(0.5),
            holders: Some(42),
            ..Default::default()
        }
        .apply(&mut token);

        assert_eq!(token.price, 0.5);
        assert_eq!(token.holders, 42);
        assert_eq!(token.market_cap, 0.0);
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let token = NewToken::new(
            "Mint111".to_string(),
            "Moon".to_string(),
            "MOON".to_string(),
            "Creator111".to_string(),
        )
        .into_token(Utc::now());

        let json = serde_json::to_value(TokenView::from(&token)).unwrap();
        assert_eq!(json["creatorWallet"], "Creator111");
        assert_eq!(json["volume24h"], 0.0);
        assert!(json.get("boosts").is_none());
    }
}
