use base64::Engine;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Failed to load keypair from file: {0}")]
    LoadError(String),
    #[error("Invalid keypair bytes: {0}")]
    InvalidKeypair(String),
    #[error("Platform wallet not configured")]
    NotConfigured,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Encode a keypair's 64 secret key bytes as base64
pub fn encode_keypair(keypair: &Keypair) -> String {
    base64::engine::general_purpose::STANDARD.encode(keypair.to_bytes())
}

/// Decode a keypair from base64, falling back to base58
pub fn decode_keypair(encoded: &str) -> Result<Keypair, WalletError> {
    let encoded = encoded.trim();

    if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(encoded) {
        if let Ok(keypair) = Keypair::try_from(bytes.as_slice()) {
            return Ok(keypair);
        }
    }

    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| WalletError::InvalidKeypair(format!("neither base64 nor base58: {}", e)))?;

    Keypair::try_from(bytes.as_slice()).map_err(|e| WalletError::InvalidKeypair(e.to_string()))
}

/// Wallet manager holding the platform keypair
pub struct WalletManager {
    keypair: Keypair,
}

impl WalletManager {
    /// Load keypair from a file path (JSON array format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, WalletError> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::LoadError(format!("Failed to read file: {}", e)))?;

        let bytes: Vec<u8> = serde_json::from_str(&contents)
            .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;

        Self::from_bytes(&bytes)
    }

    /// Load keypair from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let keypair =
            Keypair::try_from(bytes).map_err(|e| WalletError::InvalidKeypair(e.to_string()))?;

        Ok(Self { keypair })
    }

    /// Load keypair from a base64 or base58 secret key string
    pub fn from_encoded(encoded: &str) -> Result<Self, WalletError> {
        Ok(Self {
            keypair: decode_keypair(encoded)?,
        })
    }

    /// Load from a configuration value: a path to a JSON keypair file, a JSON
    /// byte array, or an encoded secret key
    pub fn from_config_value(value: &str) -> Result<Self, WalletError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(WalletError::NotConfigured);
        }

        if value.starts_with('[') {
            let bytes: Vec<u8> = serde_json::from_str(value)
                .map_err(|e| WalletError::LoadError(format!("Invalid JSON format: {}", e)))?;
            return Self::from_bytes(&bytes);
        }

        let expanded = shellexpand::tilde(value);
        let path = Path::new(expanded.as_ref());
        if path.is_file() {
            return Self::from_file(path);
        }

        Self::from_encoded(value)
    }

    /// Create a new random keypair (for testing)
    pub fn new_random() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Get the public key as a string
    pub fn public_key(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Export keypair as bytes (use with caution)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.keypair.to_bytes().to_vec()
    }
}

impl Clone for WalletManager {
    fn clone(&self) -> Self {
        Self {
            keypair: self.keypair.insecure_clone(),
        }
    }
}

impl std::fmt::Debug for WalletManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletManager")
            .field("pubkey", &self.public_key())
            .finish()
    }
}
