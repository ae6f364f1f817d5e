//! DexScreener Adapter
//!
//! Implementation of the MarketDataPort over the public DexScreener API.

mod cache;
mod client;

pub use cache::ResponseCache;
pub use client::{DexScreenerClient, DexScreenerConfig, MAX_ADDRESSES_PER_REQUEST};
