use async_trait::async_trait;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::ports::chain::{BlockhashInfo, ChainError, ChainPort};

#[derive(Debug, Error)]
pub enum SolanaClientError {
    #[error("RPC request failed: {0}")]
    RpcError(String),
    #[error("Transaction failed: {0}")]
    TransactionError(String),
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
}

impl From<SolanaClientError> for ChainError {
    fn from(err: SolanaClientError) -> Self {
        match err {
            SolanaClientError::TransactionError(msg) => ChainError::Transaction(msg),
            SolanaClientError::RpcError(msg) => ChainError::Rpc(msg),
            other => ChainError::Rpc(other.to_string()),
        }
    }
}

/// Wrapper around Solana RPC client with async-compatible methods
#[derive(Clone)]
pub struct SolanaClient {
    client: Arc<RpcClient>,
    rpc_url: String,
}

impl SolanaClient {
    /// Create a new Solana RPC client at `confirmed` commitment
    pub fn new(rpc_url: String) -> Self {
        let client = Arc::new(RpcClient::new_with_commitment(
            rpc_url.clone(),
            CommitmentConfig::confirmed(),
        ));
        Self { client, rpc_url }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Run a blocking RPC call on the blocking thread pool
    async fn blocking<T, F>(&self, call: F) -> Result<T, SolanaClientError>
    where
        T: Send + 'static,
        F: FnOnce(&RpcClient) -> Result<T, SolanaClientError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| SolanaClientError::RpcError(format!("Task join error: {}", e)))?
    }

    /// Get SOL balance for a public key
    pub async fn get_balance(&self, pubkey: &str) -> Result<u64, SolanaClientError> {
        let pubkey = Pubkey::from_str(pubkey)
            .map_err(|e| SolanaClientError::InvalidPublicKey(e.to_string()))?;

        self.blocking(move |client| {
            client
                .get_balance(&pubkey)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
    }

    /// Lamports required for rent exemption of an account with `data_len` bytes
    pub async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, SolanaClientError> {
        self.blocking(move |client| {
            client
                .get_minimum_balance_for_rent_exemption(data_len)
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
    }

    /// Get recent blockhash and the last block height it is valid for
    pub async fn get_latest_blockhash(&self) -> Result<BlockhashInfo, SolanaClientError> {
        self.blocking(|client| {
            client
                .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
                .map(|(blockhash, last_valid_block_height)| BlockhashInfo {
                    blockhash,
                    last_valid_block_height,
                })
                .map_err(|e| SolanaClientError::RpcError(e.to_string()))
        })
        .await
    }

    /// Send a transaction with preflight checks and wait for confirmation
    pub async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaClientError> {
        let tx = transaction.clone();

        self.blocking(move |client| {
            client
                .send_and_confirm_transaction(&tx)
                .map_err(|e| SolanaClientError::TransactionError(e.to_string()))
        })
        .await
    }
}

#[async_trait]
impl ChainPort for SolanaClient {
    async fn minimum_rent(&self, data_len: usize) -> Result<u64, ChainError> {
        Ok(self.get_minimum_balance_for_rent_exemption(data_len).await?)
    }

    async fn latest_blockhash(&self) -> Result<BlockhashInfo, ChainError> {
        Ok(self.get_latest_blockhash().await?)
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ChainError> {
        let signature = self.send_and_confirm_transaction(transaction).await?;
        tracing::info!(%signature, "Transaction confirmed");
        Ok(signature)
    }
}
