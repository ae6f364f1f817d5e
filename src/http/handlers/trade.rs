//! Trade routes
//!
//! Amounts are base units (lamports for buys) and may arrive as JSON
//! numbers or numeric strings.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{de, Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::application::{QuoteInput, QuoteSummary, RecordTradeInput, SwapInput, SwapTransaction};
use crate::http::{ApiError, AppState};

/// Accept `1000`, `1000.0` or `"1000"`; missing means zero
fn deserialize_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Integer(u64),
        Float(f64),
        Text(String),
    }

    match Option::<Amount>::deserialize(deserializer)? {
        None => Ok(0),
        Some(Amount::Integer(value)) => Ok(value),
        Some(Amount::Float(value)) if value >= 0.0 && value.fract() == 0.0 => Ok(value as u64),
        Some(Amount::Float(value)) => Err(de::Error::custom(format!("invalid amount: {}", value))),
        Some(Amount::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid amount: {}", text))),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteBody {
    pub input_mint: String,
    pub output_mint: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: u64,
    pub slippage_bps: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwapBody {
    pub token_address: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: u64,
    pub user_wallet: String,
    pub slippage_bps: Option<u16>,
}

impl From<SwapBody> for SwapInput {
    fn from(body: SwapBody) -> Self {
        SwapInput {
            token_address: body.token_address,
            amount: body.amount,
            user_wallet: body.user_wallet,
            slippage_bps: body.slippage_bps,
        }
    }
}

pub async fn quote(
    State(state): State<AppState>,
    body: Result<Json<QuoteBody>, JsonRejection>,
) -> Result<Json<QuoteSummary>, ApiError> {
    let Json(body) = body?;
    let summary = state
        .trades
        .quote(QuoteInput {
            input_mint: body.input_mint,
            output_mint: body.output_mint,
            amount: body.amount,
            slippage_bps: body.slippage_bps,
        })
        .await?;
    Ok(Json(summary))
}

pub async fn buy(
    State(state): State<AppState>,
    body: Result<Json<SwapBody>, JsonRejection>,
) -> Result<Json<SwapTransaction>, ApiError> {
    let Json(body) = body?;
    Ok(Json(state.trades.buy(body.into()).await?))
}

pub async fn sell(
    State(state): State<AppState>,
    body: Result<Json<SwapBody>, JsonRejection>,
) -> Result<Json<SwapTransaction>, ApiError> {
    let Json(body) = body?;
    Ok(Json(state.trades.sell(body.into()).await?))
}

/// Store a trade the client executed
pub async fn record(
    State(state): State<AppState>,
    body: Result<Json<RecordTradeInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let trade = state.trades.record_trade(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "trade": trade })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_formats() {
        let body: SwapBody = serde_json::from_str(r#"{"amount": 1000}"#).unwrap();
        assert_eq!(body.amount, 1000);
        let body: SwapBody = serde_json::from_str(r#"{"amount": "2500"}"#).unwrap();
        assert_eq!(body.amount, 2500);
        let body: SwapBody = serde_json::from_str(r#"{"amount": 3.0}"#).unwrap();
        assert_eq!(body.amount, 3);
        let body: SwapBody = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(body.amount, 0);
        let body: SwapBody = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(body.amount, 0);
    }

    #[test]
    fn test_invalid_amounts_rejected() {
        assert!(serde_json::from_str::<SwapBody>(r#"{"amount": 1.5}"#).is_err());
        assert!(serde_json::from_str::<SwapBody>(r#"{"amount": "lots"}"#).is_err());
        assert!(serde_json::from_str::<SwapBody>(r#"{"amount": -1}"#).is_err());
    }
}
