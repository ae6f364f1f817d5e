//! Jupiter API Client
//!
//! HTTP client for the Jupiter DEX aggregator swap API.
//! Fetches quotes and builds unsigned swap transactions for users to sign.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::quote::{QuoteRequest, QuoteResponse};
use super::swap::{SwapRequest, SwapResponse};
use crate::ports::execution::{ExecutionError, SwapPort};

/// Jupiter API client configuration
#[derive(Debug, Clone)]
pub struct JupiterConfig {
    /// Base URL for Jupiter API
    pub api_base_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Referral fee account attached to every swap
    pub referral_account: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Number of attempts per request
    pub max_retries: u32,
}

impl Default for JupiterConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            referral_account: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Jupiter DEX aggregator client
#[derive(Debug, Clone)]
pub struct JupiterClient {
    config: JupiterConfig,
    http: Client,
}

impl JupiterClient {
    /// Create a new Jupiter client with default configuration
    pub fn new() -> Result<Self, ExecutionError> {
        Self::with_config(JupiterConfig::default())
    }

    /// Create a new Jupiter client with custom configuration
    pub fn with_config(config: JupiterConfig) -> Result<Self, ExecutionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ExecutionError::ApiError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Get a quote for a token swap
    pub async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        let url = format!("{}/quote", self.config.api_base_url);

        let mut req = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(&request.query_pairs());

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("x-api-key", api_key);
        }

        let response = self
            .execute_with_retry(|| async {
                req.try_clone()
                    .ok_or_else(|| ExecutionError::ApiError("Failed to clone request".into()))?
                    .send()
                    .await
                    .map_err(|e| ExecutionError::ApiError(e.to_string()))
            })
            .await?;

        tracing::debug!(
            input_mint = %request.input_mint,
            output_mint = %request.output_mint,
            amount = request.amount,
            status = %response.status(),
            "Jupiter quote response"
        );

        Self::handle_response(response).await
    }

    /// Build a swap transaction; the configured referral account is attached
    /// when the request does not carry one
    pub async fn get_swap_transaction(
        &self,
        request: &SwapRequest,
    ) -> Result<SwapResponse, ExecutionError> {
        let url = format!("{}/swap", self.config.api_base_url);

        let mut body = request.clone();
        if body.fee_account.is_none() {
            body.fee_account = self.config.referral_account.clone();
        }

        let mut req = self.http.post(&url).json(&body);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("x-api-key", api_key);
        }

        let response = self
            .execute_with_retry(|| async {
                req.try_clone()
                    .ok_or_else(|| ExecutionError::ApiError("Failed to clone request".into()))?
                    .send()
                    .await
                    .map_err(|e| ExecutionError::ApiError(e.to_string()))
            })
            .await?;

        Self::handle_response(response).await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<reqwest::Response, ExecutionError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, ExecutionError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let backoff = retry_delay(attempt + 1, RATE_LIMIT_BASE_MS, MAX_BACKOFF_MS);
                        tracing::warn!(
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            self.config.max_retries
                        );
                        last_error = Some(ExecutionError::ApiError("Rate limit exceeded".into()));
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    if status.is_server_error() {
                        last_error = Some(ExecutionError::ApiError(format!("Server error: {}", status)));
                        tokio::time::sleep(retry_delay(attempt + 1, ERROR_BASE_MS, MAX_BACKOFF_MS)).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(attempt = attempt + 1, error = %e, "Jupiter request failed");
                    last_error = Some(e);
                    tokio::time::sleep(retry_delay(attempt + 1, ERROR_BASE_MS, MAX_BACKOFF_MS)).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ExecutionError::ApiError("Max retries exceeded".into())))
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ExecutionError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExecutionError::ApiError(format!("Failed to read response: {}", e)))?;

        interpret_response(status, &body)
    }

    /// Get the configured API base URL
    pub fn api_base_url(&self) -> &str {
        &self.config.api_base_url
    }
}

const RATE_LIMIT_BASE_MS: u64 = 2_000;
const ERROR_BASE_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 10_000;

/// Exponential delay for the 1-based `attempt`, capped at `max_ms`, plus up
/// to 10% jitter
fn retry_delay(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    let exponential = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exponential.min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

/// Map a Jupiter status and body to a typed result.
///
/// Any body carrying an `error` field is a rejection of the request, whether
/// it arrives with 400 or 200.
pub(crate) fn interpret_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<T, ExecutionError> {
    let value: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error_message = value
        .as_ref()
        .and_then(|v| v.get("error"))
        .map(|e| match e.as_str() {
            Some(s) => s.to_string(),
            None => e.to_string(),
        });

    if status.is_success() || status == StatusCode::BAD_REQUEST {
        if let Some(message) = error_message {
            if message.contains("SlippageToleranceExceeded") || message.contains("6001") {
                return Err(ExecutionError::SlippageExceeded);
            }
            return Err(ExecutionError::Rejected(message));
        }
    }

    if !status.is_success() {
        return Err(ExecutionError::ApiError(format!("API error {}: {}", status, body)));
    }

    match value {
        Some(v) => serde_json::from_value(v)
            .map_err(|e| ExecutionError::ApiError(format!("Failed to parse response: {}", e))),
        None => Err(ExecutionError::ApiError("Failed to parse response: invalid JSON".into())),
    }
}

#[async_trait]
impl SwapPort for JupiterClient {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        self.get_quote(request).await
    }

    async fn swap_transaction(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError> {
        self.get_swap_transaction(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_grows_and_caps() {
        let first = retry_delay(1, 500, 10_000);
        assert!(first >= Duration::from_millis(500) && first < Duration::from_millis(550));

        let third = retry_delay(3, 500, 10_000);
        assert!(third >= Duration::from_millis(2_000) && third < Duration::from_millis(2_200));

        let capped = retry_delay(20, 2_000, 10_000);
        assert!(capped >= Duration::from_millis(10_000) && capped < Duration::from_millis(11_000));
    }

    #[test]
    fn test_jupiter_config_default() {
        let config = JupiterConfig::default();
        assert_eq!(config.api_base_url, "https://api.jup.ag/swap/v1");
        assert!(config.api_key.is_none());
        assert!(config.referral_account.is_none());
        assert_eq!(config.max_retries, 3);
    }

    #[test]
    fn test_jupiter_client_creation() {
        let client = JupiterClient::new().unwrap();
        assert_eq!(client.api_base_url(), "https://api.jup.ag/swap/v1");
    }

    #[test]
    fn test_error_body_on_bad_request_is_rejection() {
        let result: Result<QuoteResponse, _> = interpret_response(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Could not find any route"}"#,
        );
        match result {
            Err(ExecutionError::Rejected(msg)) => assert_eq!(msg, "Could not find any route"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_error_body_on_success_is_rejection() {
        let result: Result<SwapResponse, _> =
            interpret_response(StatusCode::OK, r#"{"error": "Invalid quote"}"#);
        assert!(matches!(result, Err(ExecutionError::Rejected(_))));
    }

    #[test]
    fn test_slippage_error_detected() {
        let result: Result<SwapResponse, _> = interpret_response(
            StatusCode::BAD_REQUEST,
            r#"{"error": "SlippageToleranceExceeded"}"#,
        );
        assert!(matches!(result, Err(ExecutionError::SlippageExceeded)));
    }

    #[test]
    fn test_server_error_is_api_error() {
        let result: Result<SwapResponse, _> =
            interpret_response(StatusCode::BAD_GATEWAY, "upstream down");
        match result {
            Err(e @ ExecutionError::ApiError(_)) => assert!(!e.is_client_error()),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_plain_bad_request_is_api_error() {
        let result: Result<SwapResponse, _> = interpret_response(StatusCode::BAD_REQUEST, "nope");
        assert!(matches!(result, Err(ExecutionError::ApiError(_))));
    }

    #[test]
    fn test_success_body_parses() {
        let result: Result<SwapResponse, _> = interpret_response(
            StatusCode::OK,
            r#"{"swapTransaction": "AQID", "lastValidBlockHeight": 10}"#,
        );
        assert_eq!(result.unwrap().last_valid_block_height, 10);
    }
}
