//! Space Lab - Memecoin Launchpad Backend Library
//!
//! Launches SPL tokens with Metaplex metadata, trades them through Jupiter
//! and serves trending feeds from DexScreener and Postgres.
//!
//! # Modules
//!
//! - `domain`: Core types (Token, Trade, TrendingCategory, constants)
//! - `ports`: Trait abstractions (TokenRepository, MarketDataPort, SwapPort, ChainPort, ImageStore)
//! - `adapters`: External implementations (Jupiter, DexScreener, Solana, Pinata, Postgres, CLI)
//! - `launch`: Token creation transactions and vanity mint addresses
//! - `application`: Services behind the routes and commands
//! - `http`: axum router and handlers
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod launch;
pub mod ports;
