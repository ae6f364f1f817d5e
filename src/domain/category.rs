//! Trending Categories
//!
//! Feed categories and the orderings each one applies to market data.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::token::TokenView;

/// Feed category selectable by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendingCategory {
    /// Trending now
    #[default]
    Hot,
    /// Just launched
    New,
    /// About to hit Raydium
    Graduating,
    /// 24h top performers
    Gainers,
    /// Most traded
    Volume,
}

impl TrendingCategory {
    pub const ALL: [TrendingCategory; 5] = [
        TrendingCategory::Hot,
        TrendingCategory::New,
        TrendingCategory::Graduating,
        TrendingCategory::Gainers,
        TrendingCategory::Volume,
    ];

    /// Parse a query value; unknown or missing values fall back to `Hot`
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingCategory::Hot => "hot",
            TrendingCategory::New => "new",
            TrendingCategory::Graduating => "graduating",
            TrendingCategory::Gainers => "gainers",
            TrendingCategory::Volume => "volume",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrendingCategory::Hot => "🔥 Hot",
            TrendingCategory::New => "🆕 New",
            TrendingCategory::Graduating => "🎓 Graduating",
            TrendingCategory::Gainers => "📈 Top Gainers",
            TrendingCategory::Volume => "💎 High Volume",
        }
    }

    /// Sort market tokens in place by this category's ordering (descending)
    pub fn sort(&self, tokens: &mut [TokenView]) {
        match self {
            TrendingCategory::New => tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            TrendingCategory::Gainers => {
                tokens.sort_by(|a, b| cmp_desc(a.price_change_24h, b.price_change_24h))
            }
            TrendingCategory::Volume => tokens.sort_by(|a, b| cmp_desc(a.volume_24h, b.volume_24h)),
            TrendingCategory::Hot | TrendingCategory::Graduating => {
                tokens.sort_by(|a, b| b.boosts.unwrap_or(0).cmp(&a.boosts.unwrap_or(0)))
            }
        }
    }
}

impl fmt::Display for TrendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendingCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hot" => Ok(TrendingCategory::Hot),
            "new" => Ok(TrendingCategory::New),
            "graduating" => Ok(TrendingCategory::Graduating),
            "gainers" => Ok(TrendingCategory::Gainers),
            "volume" => Ok(TrendingCategory::Volume),
            other => Err(format!("Unknown category: {}", other)),
        }
    }
}

/// DexScreener search term for the search-backed feed.
///
/// This feed has its own vocabulary (`rising`, `graduated`); anything
/// unrecognised searches the "hot" term.
pub fn search_term(category: &str) -> &'static str {
    match category.trim().to_lowercase().as_str() {
        "new" => "solana new",
        "rising" => "solana pump",
        "graduated" => "solana raydium",
        _ => "solana meme",
    }
}

/// Descending float comparison with NaN sorted last
pub fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn view(mint: &str) -> TokenView {
        TokenView {
            mint: mint.to_string(),
            name: mint.to_string(),
            symbol: mint.to_string(),
            description: None,
            image: None,
            twitter: None,
            telegram: None,
            website: None,
            bonding_curve: None,
            price: 1.0,
            price_24h_ago: 1.0,
            price_change_24h: 0.0,
            market_cap: 0.0,
            volume_24h: 0.0,
            liquidity: 0.0,
            holders: 0,
            txns_24h: 0,
            created_at: None,
            creator_wallet: String::new(),
            deployed_by: String::new(),
            platform: "DexScreener".to_string(),
            graduated: false,
            raydium_pool: None,
            graduation_progress: 0.0,
            boosts: None,
        }
    }

    fn mints(tokens: &[TokenView]) -> Vec<&str> {
        tokens.iter().map(|t| t.mint.as_str()).collect()
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(TrendingCategory::parse_or_default(Some("GAINERS")), TrendingCategory::Gainers);
        assert_eq!(TrendingCategory::parse_or_default(Some("unknown")), TrendingCategory::Hot);
        assert_eq!(TrendingCategory::parse_or_default(None), TrendingCategory::Hot);
    }

    #[test]
    fn test_sort_new_puts_missing_dates_last() {
        let now = Utc::now();
        let mut a = view("a");
        a.created_at = Some(now - Duration::hours(2));
        let mut b = view("b");
        b.created_at = Some(now);
        let c = view("c");

        let mut tokens = vec![a, c, b];
        TrendingCategory::New.sort(&mut tokens);
        assert_eq!(mints(&tokens), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_gainers_and_volume() {
        let mut a = view("a");
        a.price_change_24h = 5.0;
        a.volume_24h = 10.0;
        let mut b = view("b");
        b.price_change_24h = 50.0;
        b.volume_24h = 1.0;

        let mut tokens = vec![a.clone(), b.clone()];
        TrendingCategory::Gainers.sort(&mut tokens);
        assert_eq!(mints(&tokens), vec!["b", "a"]);

        let mut tokens = vec![b, a];
        TrendingCategory::Volume.sort(&mut tokens);
        assert_eq!(mints(&tokens), vec!["a", "b"]);
    }

    #[test]
    fn test_sort_hot_by_boosts() {
        let mut a = view("a");
        a.boosts = Some(10);
        let b = view("b");
        let mut c = view("c");
        c.boosts = Some(500);

        let mut tokens = vec![a, b, c];
        TrendingCategory::Hot.sort(&mut tokens);
        assert_eq!(mints(&tokens), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_search_terms() {
        assert_eq!(search_term("hot"), "solana meme");
        assert_eq!(search_term("new"), "solana new");
        assert_eq!(search_term("rising"), "solana pump");
        assert_eq!(search_term("graduated"), "solana raydium");
        assert_eq!(search_term("whatever"), "solana meme");
    }

    #[test]
    fn test_cmp_desc_nan_last() {
        let mut values = vec![1.0, f64::NAN, 3.0];
        values.sort_by(|a, b| cmp_desc(*a, *b));
        assert_eq!(values[0], 3.0);
        assert_eq!(values[1], 1.0);
        assert!(values[2].is_nan());
    }
}
