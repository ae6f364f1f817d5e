//! Pinata Adapter
//!
//! Pins uploaded token images to IPFS through the Pinata pinning API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::ports::storage::{ImageStore, StorageError};

#[derive(Debug, Clone)]
pub struct PinataConfig {
    pub api_key: String,
    pub secret_key: String,
    pub api_base_url: String,
    /// Public gateway used to build image URLs
    pub gateway_url: String,
    pub timeout: Duration,
}

impl PinataConfig {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key,
            secret_key,
            api_base_url: "https://api.pinata.cloud".to_string(),
            gateway_url: "https://gateway.pinata.cloud".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: String,
}

/// Pinata `pinFileToIPFS` client
#[derive(Debug, Clone)]
pub struct PinataClient {
    config: PinataConfig,
    http: Client,
}

impl PinataClient {
    pub fn with_config(config: PinataConfig) -> Result<Self, StorageError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StorageError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Public URL of a pinned content hash
    pub fn gateway_url(&self, ipfs_hash: &str) -> String {
        format!("{}/ipfs/{}", self.config.gateway_url.trim_end_matches('/'), ipfs_hash)
    }
}

#[async_trait]
impl ImageStore for PinataClient {
    async fn pin(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let url = format!("{}/pinning/pinFileToIPFS", self.config.api_base_url);
        let size = bytes.len();

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::Http(format!("Invalid content type: {}", e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ParseError(e.to_string()))?;

        tracing::info!(file_name, size, ipfs_hash = %pinned.ipfs_hash, "Image pinned to IPFS");
        Ok(self.gateway_url(&pinned.ipfs_hash))
    }
}
