//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Jupiter: swap aggregator API client
//! - DexScreener: boosted tokens, pairs and search
//! - Solana: RPC client and platform wallet
//! - Pinata: IPFS image pinning
//! - Postgres: token and trade storage
//! - CLI: Command-line interface handlers

pub mod cli;
pub mod dexscreener;
pub mod jupiter;
pub mod pinata;
pub mod postgres;
pub mod solana;

pub use cli::CliApp;
pub use dexscreener::DexScreenerClient;
pub use jupiter::JupiterClient;
pub use pinata::PinataClient;
pub use postgres::PgTokenRepository;
pub use solana::{SolanaClient, WalletManager};
