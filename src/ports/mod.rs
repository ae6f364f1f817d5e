//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract:
//! - Token and trade persistence (Postgres)
//! - Market data feeds (DexScreener)
//! - Swap quoting and transaction building (Jupiter)
//! - Chain access (Solana RPC)
//! - Image pinning (IPFS via Pinata)

pub mod chain;
pub mod execution;
pub mod market_data;
pub mod mocks;
pub mod repository;
pub mod storage;

pub use chain::{BlockhashInfo, ChainError, ChainPort};
pub use execution::{ExecutionError, SwapPort};
pub use market_data::{MarketDataError, MarketDataPort, MarketPair, TokenBoost};
pub use repository::{RepositoryError, TokenRepository};
pub use storage::{ImageStore, StorageError};
