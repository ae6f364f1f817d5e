use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a trade relative to the launched token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(format!("Unknown trade side: {}", other)),
        }
    }
}

/// A row of the `trades` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: i64,
    pub token_mint: String,
    pub trader_wallet: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub amount_in: f64,
    pub amount_out: f64,
    pub price: f64,
    pub referral_earned: f64,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an executed trade
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrade {
    pub token_mint: String,
    pub trader_wallet: String,
    pub side: TradeSide,
    pub amount_in: f64,
    pub amount_out: f64,
    pub price: f64,
    pub referral_earned: f64,
    pub signature: Option<String>,
}

impl NewTrade {
    pub fn into_trade(self, id: i64, created_at: DateTime<Utc>) -> Trade {
        Trade {
            id,
            token_mint: self.token_mint,
            trader_wallet: self.trader_wallet,
            side: self.side,
            amount_in: self.amount_in,
            amount_out: self.amount_out,
            price: self.price,
            referral_earned: self.referral_earned,
            signature: self.signature,
            created_at,
        }
    }
}

/// Referral fee earned on a trade input amount (`amount * fee_bps / 10000`)
pub fn calculate_referral_earning(amount: Decimal, fee_bps: u16) -> Decimal {
    amount * Decimal::from(fee_bps) / Decimal::from(10_000u32)
}

/// Referral earning on a base-unit amount, as a float for JSON responses
pub fn referral_earning_f64(amount: u64, fee_bps: u16) -> f64 {
    calculate_referral_earning(Decimal::from(amount), fee_bps)
        .to_f64()
        .unwrap_or(0.0)
}

/// Referral earning on a float amount (trade records carry floats)
pub fn referral_earning_from_f64(amount: f64, fee_bps: u16) -> f64 {
    Decimal::from_f64_retain(amount)
        .map(|a| calculate_referral_earning(a, fee_bps))
        .and_then(|d| d.to_f64())
        .unwrap_or(0.0)
}
