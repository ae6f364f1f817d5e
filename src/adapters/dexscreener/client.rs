//! DexScreener API Client
//!
//! Boosted token listings, batched token lookups and pair search.
//! Responses are cached for a short TTL since feeds poll the same endpoints.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::cache::ResponseCache;
use crate::ports::market_data::{MarketDataError, MarketDataPort, MarketPair, TokenBoost};

/// Maximum addresses the batched token endpoint accepts per call
pub const MAX_ADDRESSES_PER_REQUEST: usize = 30;

#[derive(Debug, Clone)]
pub struct DexScreenerConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    /// How long responses are served from cache (zero disables caching)
    pub cache_ttl: Duration,
}

impl Default for DexScreenerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.dexscreener.com".to_string(),
            timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(60),
        }
    }
}

/// Envelope of the `/latest/dex/*` endpoints
#[derive(Debug, Default, Deserialize)]
struct PairsEnvelope {
    #[serde(default)]
    pairs: Option<Vec<MarketPair>>,
}

pub struct DexScreenerClient {
    config: DexScreenerConfig,
    http: Client,
    boosts: Mutex<ResponseCache<Vec<TokenBoost>>>,
    pairs: Mutex<ResponseCache<Vec<MarketPair>>>,
}

impl DexScreenerClient {
    pub fn new() -> Result<Self, MarketDataError> {
        Self::with_config(DexScreenerConfig::default())
    }

    pub fn with_config(config: DexScreenerConfig) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MarketDataError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            boosts: Mutex::new(ResponseCache::new(config.cache_ttl)),
            pairs: Mutex::new(ResponseCache::new(config.cache_ttl)),
            config,
            http,
        })
    }

    fn request(&self, path: &str, query: &[(&str, &str)]) -> RequestBuilder {
        let url = format!("{}{}", self.config.api_base_url, path);
        let builder = self.http.get(url).header("Accept", "application/json");
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .request(path, query)
            .send()
            .await
            .map_err(|e| MarketDataError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "DexScreener request failed");
            return Err(MarketDataError::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| MarketDataError::Http(format!("Failed to read response: {}", e)))?;

        tracing::debug!(%url, bytes = text.len(), "DexScreener response");

        serde_json::from_str(&text).map_err(|e| MarketDataError::ParseError(e.to_string()))
    }

    /// Boost listings; a non-array body counts as an empty listing
    async fn fetch_boosts(&self, path: &str) -> Result<Vec<TokenBoost>, MarketDataError> {
        if let Some(cached) = self.boosts.lock().ok().and_then(|c| c.get(path)) {
            return Ok(cached);
        }

        let value: serde_json::Value = self.get_json(path, &[]).await?;
        let boosts: Vec<TokenBoost> = match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
            _ => Vec::new(),
        };

        if let Ok(mut cache) = self.boosts.lock() {
            cache.insert(path.to_string(), boosts.clone());
        }
        Ok(boosts)
    }

    async fn fetch_pairs<F>(&self, path: String, fetch: F) -> Result<Vec<MarketPair>, MarketDataError>
    where
        F: std::future::Future<Output = Result<Vec<MarketPair>, MarketDataError>>,
    {
        if let Some(cached) = self.pairs.lock().ok().and_then(|c| c.get(&path)) {
            return Ok(cached);
        }

        let pairs = fetch.await?;

        if let Ok(mut cache) = self.pairs.lock() {
            cache.insert(path, pairs.clone());
        }
        Ok(pairs)
    }
}

#[async_trait]
impl MarketDataPort for DexScreenerClient {
    async fn top_boosts(&self) -> Result<Vec<TokenBoost>, MarketDataError> {
        self.fetch_boosts("/token-boosts/top/v1").await
    }

    async fn latest_boosts(&self) -> Result<Vec<TokenBoost>, MarketDataError> {
        self.fetch_boosts("/token-boosts/latest/v1").await
    }

    async fn tokens_by_addresses(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> Result<Vec<MarketPair>, MarketDataError> {
        let mut pairs = Vec::new();

        for chunk in addresses.chunks(MAX_ADDRESSES_PER_REQUEST) {
            let path = format!("/tokens/v1/{}/{}", chain_id, chunk.join(","));
            let batch = self
                .fetch_pairs(path.clone(), async {
                    let value: serde_json::Value = self.get_json(&path, &[]).await?;
                    Ok(match value {
                        serde_json::Value::Array(items) => items
                            .into_iter()
                            .filter_map(|item| serde_json::from_value(item).ok())
                            .collect(),
                        _ => Vec::new(),
                    })
                })
                .await?;
            pairs.extend(batch);
        }

        Ok(pairs)
    }

    async fn pairs_for_token(&self, address: &str) -> Result<Vec<MarketPair>, MarketDataError> {
        let path = format!("/latest/dex/tokens/{}", address);
        self.fetch_pairs(path.clone(), async {
            let envelope: PairsEnvelope = self.get_json(&path, &[]).await?;
            Ok(envelope.pairs.unwrap_or_default())
        })
        .await
    }

    async fn search_pairs(&self, query: &str) -> Result<Vec<MarketPair>, MarketDataError> {
        let key = format!("/latest/dex/search?q={}", query);
        self.fetch_pairs(key, async {
            let envelope: PairsEnvelope = self
                .get_json("/latest/dex/search", &[("q", query)])
                .await?;
            Ok(envelope.pairs.unwrap_or_default())
        })
        .await
    }
}
