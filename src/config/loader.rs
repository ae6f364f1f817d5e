//! Configuration Loader
//!
//! Loads config/default.toml, layers environment variables on top (secrets
//! live in `.env`, never in the TOML file) and validates the result.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::domain::constants::{
    BONDING_CURVE_PROGRAM_ID, MAX_IMAGE_SIZE, MAX_SLIPPAGE_BPS, METADATA_PROGRAM_ID,
    PLATFORM_FEE_BPS, PLATFORM_SUFFIX,
};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Main configuration structure matching config/default.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub solana: SolanaSection,
    pub jupiter: JupiterSection,
    pub dexscreener: DexScreenerSection,
    pub database: DatabaseSection,
    pub pinata: PinataSection,
    pub vanity: VanitySection,
    pub cron: CronSection,
    pub logging: LoggingSection,
}

/// HTTP server section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Whole-request timeout; launches wait for confirmation so keep it generous
    pub request_timeout_secs: u64,
    /// Largest accepted request body (image uploads included)
    pub body_limit_bytes: usize,
    /// Allowed CORS origins, empty allows any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 90,
            body_limit_bytes: 4 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

impl ServerSection {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Solana RPC and launch programs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolanaSection {
    pub rpc_url: String,
    /// Platform wallet: keypair file path, JSON byte array, base64 or base58.
    /// Usually set through PLATFORM_WALLET_KEY.
    pub platform_wallet: Option<String>,
    pub metadata_program: String,
    pub bonding_curve_program: String,
}

impl Default for SolanaSection {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            platform_wallet: None,
            metadata_program: METADATA_PROGRAM_ID.to_string(),
            bonding_curve_program: BONDING_CURVE_PROGRAM_ID.to_string(),
        }
    }
}

/// Jupiter API configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JupiterSection {
    pub api_url: String,
    /// Optional API key for higher rate limits
    pub api_key: Option<String>,
    /// Referral token account that collects the platform fee
    pub referral_account: Option<String>,
    pub platform_fee_bps: u16,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for JupiterSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.jup.ag/swap/v1".to_string(),
            api_key: None,
            referral_account: None,
            platform_fee_bps: PLATFORM_FEE_BPS,
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DexScreenerSection {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Response cache lifetime, 0 disables caching
    pub cache_ttl_secs: u64,
}

impl Default for DexScreenerSection {
    fn default() -> Self {
        Self {
            api_url: "https://api.dexscreener.com".to_string(),
            timeout_secs: 15,
            cache_ttl_secs: 60,
        }
    }
}

/// Postgres section; without a URL the service runs database-less
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// Apply embedded migrations when the server starts
    pub run_migrations: bool,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            acquire_timeout_secs: 5,
            run_migrations: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PinataSection {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub gateway_url: String,
}

impl Default for PinataSection {
    fn default() -> Self {
        Self {
            api_key: None,
            secret_key: None,
            gateway_url: "https://gateway.pinata.cloud".to_string(),
        }
    }
}

impl PinataSection {
    /// Key pair when both halves are present
    pub fn credentials(&self) -> Option<(String, String)> {
        match (self.api_key.as_deref(), self.secret_key.as_deref()) {
            (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => {
                Some((key.to_string(), secret.to_string()))
            }
            _ => None,
        }
    }
}

/// Vanity mint addresses for launches
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VanitySection {
    pub enabled: bool,
    pub suffix: String,
    /// Worker threads, 0 uses every core
    pub threads: usize,
    pub timeout_secs: u64,
}

impl Default for VanitySection {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: PLATFORM_SUFFIX.to_string(),
            threads: 0,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CronSection {
    /// Bearer token required by the cron endpoints
    pub secret: Option<String>,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = shellexpand::tilde(&path.as_ref().to_string_lossy()).into_owned();
    let content = std::fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    /// Overlay process environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`; set variables win over the file
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        if let Some(url) = get("SOLANA_RPC_URL").or_else(|| get("NEXT_PUBLIC_RPC_URL")) {
            self.solana.rpc_url = url;
        }
        if let Some(wallet) = get("PLATFORM_WALLET_KEY") {
            self.solana.platform_wallet = Some(wallet);
        }
        if let Some(key) = get("JUPITER_API_KEY") {
            self.jupiter.api_key = Some(key);
        }
        if let Some(account) = get("JUPITER_REFERRAL_ACCOUNT") {
            self.jupiter.referral_account = Some(account);
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(key) = get("PINATA_API_KEY") {
            self.pinata.api_key = Some(key);
        }
        if let Some(secret) = get("PINATA_SECRET_KEY") {
            self.pinata.secret_key = Some(secret);
        }
        if let Some(secret) = get("CRON_SECRET") {
            self.cron.secret = Some(secret);
        }
        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.solana.rpc_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "rpc_url cannot be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("metadata_program", &self.solana.metadata_program),
            ("bonding_curve_program", &self.solana.bonding_curve_program),
        ] {
            if value.parse::<solana_sdk::pubkey::Pubkey>().is_err() {
                return Err(ConfigError::ValidationError(format!(
                    "{} is not a valid public key: {}",
                    name, value
                )));
            }
        }

        if self.jupiter.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "jupiter.api_url cannot be empty".to_string(),
            ));
        }

        if self.jupiter.platform_fee_bps > MAX_SLIPPAGE_BPS {
            return Err(ConfigError::ValidationError(format!(
                "platform_fee_bps must be <= {}, got {}",
                MAX_SLIPPAGE_BPS, self.jupiter.platform_fee_bps
            )));
        }

        if self.jupiter.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "max_retries must be > 0".to_string(),
            ));
        }

        if self.dexscreener.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "dexscreener.api_url cannot be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "max_connections must be > 0".to_string(),
            ));
        }

        if self.server.body_limit_bytes < MAX_IMAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "body_limit_bytes must be at least {} to accept image uploads",
                MAX_IMAGE_SIZE
            )));
        }

        if self.vanity.enabled {
            validate_suffix(&self.vanity.suffix)?;
        }

        Ok(())
    }
}

/// Every suffix character must have a base58 spelling in some case
fn validate_suffix(suffix: &str) -> Result<(), ConfigError> {
    if suffix.is_empty() {
        return Err(ConfigError::ValidationError(
            "vanity suffix cannot be empty".to_string(),
        ));
    }

    let invalid = suffix.chars().find(|c| {
        !BASE58_ALPHABET.contains(c.to_ascii_lowercase())
            && !BASE58_ALPHABET.contains(c.to_ascii_uppercase())
    });
    match invalid {
        Some(c) => Err(ConfigError::ValidationError(format!(
            "vanity suffix contains non-base58 character '{}'",
            c
        ))),
        None => Ok(()),
    }
}
