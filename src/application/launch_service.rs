//! Launch Service
//!
//! Token creation flows:
//! - `prepare`: a partially signed transaction the creator co-signs
//! - `create`: a bonding-curve launch signed and sent by the platform
//! - `confirm`: records a token the creator landed themselves
//!
//! Image uploads for token metadata live here too.

use std::str::FromStr;
use std::sync::Arc;

use base64::Engine;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signer};
use thiserror::Error;

use crate::adapters::solana::WalletManager;
use crate::domain::constants::{
    ALLOWED_IMAGE_TYPES, BONDING_CURVE_PROGRAM_ID, MAX_IMAGE_SIZE, METADATA_PROGRAM_ID,
};
use crate::domain::token::{LaunchMetadata, MetadataError, NewToken};
use crate::launch::builder::mint_account_len;
use crate::launch::{serialize_transaction, LaunchError, LaunchTransactionBuilder, VanityGrinder};
use crate::ports::chain::{ChainError, ChainPort};
use crate::ports::repository::{RepositoryError, TokenRepository};
use crate::ports::storage::ImageStore;

pub const DATA_URL_WARNING: &str = "Using base64 fallback. Configure storage service for production.";

#[derive(Debug, Error)]
pub enum LaunchServiceError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),
    #[error("PLATFORM_WALLET_KEY not configured")]
    PlatformWalletMissing,
    #[error(transparent)]
    Build(#[from] LaunchError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("Database not configured")]
    NoDatabase,
    #[error("Token already exists: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Repository(RepositoryError),
    #[error("No file provided")]
    NoFile,
    #[error("File too large. Max size is 2MB")]
    FileTooLarge(usize),
    #[error("Invalid file type. Allowed: JPEG, PNG, GIF, WebP")]
    InvalidFileType(String),
}

impl From<RepositoryError> for LaunchServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(mint) => LaunchServiceError::Duplicate(mint),
            other => LaunchServiceError::Repository(other),
        }
    }
}

impl LaunchServiceError {
    /// Errors caused by the submitted request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            LaunchServiceError::Metadata(_)
                | LaunchServiceError::InvalidWallet(_)
                | LaunchServiceError::NoFile
                | LaunchServiceError::FileTooLarge(_)
                | LaunchServiceError::InvalidFileType(_)
        )
    }
}

/// Transaction for the creator to co-sign, echoing the submitted metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedLaunch {
    pub success: bool,
    pub transaction: String,
    pub mint: String,
    pub name: String,
    pub symbol: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLaunch {
    pub success: bool,
    pub mint: String,
    pub bonding_curve: String,
    pub signature: String,
    pub creator: String,
}

/// A token launched client-side, reported for listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmLaunchInput {
    pub mint: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
    pub user_wallet: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedLaunch {
    pub success: bool,
    pub mint: String,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

fn parse_wallet(wallet: &str) -> Result<Pubkey, LaunchServiceError> {
    Pubkey::from_str(wallet.trim())
        .map_err(|_| LaunchServiceError::InvalidWallet(wallet.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Clone)]
pub struct LaunchService {
    chain: Arc<dyn ChainPort>,
    repository: Option<Arc<dyn TokenRepository>>,
    images: Option<Arc<dyn ImageStore>>,
    platform: Option<Arc<WalletManager>>,
    vanity: Option<Arc<VanityGrinder>>,
    metadata_program: Pubkey,
    curve_program: Pubkey,
}

impl LaunchService {
    pub fn new(chain: Arc<dyn ChainPort>, platform: Option<Arc<WalletManager>>) -> Self {
        Self {
            chain,
            repository: None,
            images: None,
            platform,
            vanity: None,
            metadata_program: Pubkey::from_str(METADATA_PROGRAM_ID).unwrap_or_default(),
            curve_program: Pubkey::from_str(BONDING_CURVE_PROGRAM_ID).unwrap_or_default(),
        }
    }

    pub fn with_repository(mut self, repository: Option<Arc<dyn TokenRepository>>) -> Self {
        self.repository = repository;
        self
    }

    pub fn with_image_store(mut self, images: Option<Arc<dyn ImageStore>>) -> Self {
        self.images = images;
        self
    }

    /// Grind vanity mint addresses instead of random ones
    pub fn with_vanity(mut self, grinder: VanityGrinder) -> Self {
        self.vanity = Some(Arc::new(grinder));
        self
    }

    pub fn with_programs(mut self, metadata_program: Pubkey, curve_program: Pubkey) -> Self {
        self.metadata_program = metadata_program;
        self.curve_program = curve_program;
        self
    }

    fn platform(&self) -> Result<&WalletManager, LaunchServiceError> {
        self.platform
            .as_deref()
            .ok_or(LaunchServiceError::PlatformWalletMissing)
    }

    async fn mint_keypair(&self) -> Keypair {
        match &self.vanity {
            Some(grinder) => grinder.grind_or_random().await,
            None => Keypair::new(),
        }
    }

    /// Build a user launch the creator signs as mint authority
    pub async fn prepare(&self, metadata: LaunchMetadata) -> Result<PreparedLaunch, LaunchServiceError> {
        metadata.validate()?;
        let user = parse_wallet(&metadata.user_wallet)?;
        let platform = self.platform()?;

        tracing::info!(name = %metadata.name, symbol = %metadata.symbol, user = %user, "Preparing launch");

        let mint = self.mint_keypair().await;
        let rent = self.chain.minimum_rent(mint_account_len()).await?;
        let blockhash = self.chain.latest_blockhash().await?;

        let builder =
            LaunchTransactionBuilder::new(platform.keypair(), self.metadata_program, self.curve_program);
        let transaction = builder.user_launch(&mint, &user, &metadata, rent, blockhash.blockhash)?;

        tracing::info!(mint = %mint.pubkey(), "Launch transaction ready");

        Ok(PreparedLaunch {
            success: true,
            transaction: serialize_transaction(&transaction)?,
            mint: mint.pubkey().to_string(),
            name: metadata.name,
            symbol: metadata.symbol,
            description: metadata.description,
            image: metadata.image,
            twitter: metadata.twitter,
            telegram: metadata.telegram,
            website: metadata.website,
        })
    }

    /// Launch into the bonding curve and send it; a failed database write is
    /// logged and does not fail the launch
    pub async fn create(&self, metadata: LaunchMetadata) -> Result<CreatedLaunch, LaunchServiceError> {
        metadata.validate()?;
        let creator = parse_wallet(&metadata.user_wallet)?;
        let platform = self.platform()?;

        tracing::info!(name = %metadata.name, symbol = %metadata.symbol, creator = %creator, "Creating token");

        let mint = self.mint_keypair().await;
        let rent = self.chain.minimum_rent(mint_account_len()).await?;
        let blockhash = self.chain.latest_blockhash().await?;

        let builder =
            LaunchTransactionBuilder::new(platform.keypair(), self.metadata_program, self.curve_program);
        let launch = builder.curve_launch(&mint, &creator, &metadata, rent, blockhash.blockhash)?;

        let signature = self.chain.send_and_confirm(&launch.transaction).await?;
        tracing::info!(mint = %mint.pubkey(), %signature, "Token created");

        let mint_address = mint.pubkey().to_string();
        let bonding_curve = launch.bonding_curve.to_string();

        match &self.repository {
            Some(repository) => {
                let token = NewToken::new(
                    mint_address.clone(),
                    metadata.name.clone(),
                    metadata.symbol.clone(),
                    metadata.user_wallet.clone(),
                )
                .with_metadata(&metadata)
                .with_bonding_curve(bonding_curve.clone())
                .with_signature(signature.to_string())
                .deployed_by(platform.public_key());

                if let Err(e) = repository.insert_token(token).await {
                    tracing::error!(mint = %mint_address, error = %e, "Failed to save token");
                }
            }
            None => tracing::warn!(mint = %mint_address, "Database not configured, token not saved"),
        }

        Ok(CreatedLaunch {
            success: true,
            mint: mint_address,
            bonding_curve,
            signature: signature.to_string(),
            creator: metadata.user_wallet,
        })
    }

    /// Record a token the creator launched with a prepared transaction
    pub async fn confirm(&self, input: ConfirmLaunchInput) -> Result<ConfirmedLaunch, LaunchServiceError> {
        if input.mint.is_empty() || input.signature.is_empty() || input.user_wallet.is_empty() {
            return Err(MetadataError::MissingFields.into());
        }
        let repository = self.repository.as_ref().ok_or(LaunchServiceError::NoDatabase)?;

        let mut token = NewToken::new(
            input.mint.clone(),
            input.name.unwrap_or_default(),
            input.symbol.unwrap_or_default(),
            input.user_wallet,
        )
        .with_signature(input.signature.clone());
        token.description = Some(input.description.unwrap_or_default());
        token.image = non_empty(input.image);
        token.twitter = non_empty(input.twitter);
        token.telegram = non_empty(input.telegram);
        token.website = non_empty(input.website);

        repository.insert_token(token).await?;
        tracing::info!(mint = %input.mint, "Token saved to database");

        Ok(ConfirmedLaunch {
            success: true,
            mint: input.mint,
            signature: input.signature,
        })
    }

    /// Store a token image, falling back to an inline data URL
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ImageUpload, LaunchServiceError> {
        if bytes.len() > MAX_IMAGE_SIZE {
            return Err(LaunchServiceError::FileTooLarge(bytes.len()));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
            return Err(LaunchServiceError::InvalidFileType(content_type.to_string()));
        }

        if let Some(images) = &self.images {
            match images.pin(file_name, content_type, bytes.clone()).await {
                Ok(image_url) => {
                    return Ok(ImageUpload {
                        image_url,
                        warning: None,
                    })
                }
                Err(e) => tracing::warn!(error = %e, "Image pinning failed, using data URL"),
            }
        }

        tracing::warn!("Using base64 fallback - configure Pinata keys for production");
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        Ok(ImageUpload {
            image_url: format!("data:{};base64,{}", content_type, encoded),
            warning: Some(DATA_URL_WARNING.to_string()),
        })
    }
}
