use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    Rpc(String),
    #[error("Transaction failed: {0}")]
    Transaction(String),
}

/// Recent blockhash together with the last block height it stays valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockhashInfo {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Solana cluster access needed to build and land launch transactions
#[async_trait]
pub trait ChainPort: Send + Sync {
    /// Lamports needed for an account of `data_len` bytes to be rent exempt
    async fn minimum_rent(&self, data_len: usize) -> Result<u64, ChainError>;

    async fn latest_blockhash(&self) -> Result<BlockhashInfo, ChainError>;

    /// Submit a fully signed transaction and wait for confirmation
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ChainError>;
}
