//! Domain Layer - Core types for the Space Lab launchpad
//!
//! Pure types and calculations with no I/O. Everything that talks to
//! Solana, Jupiter, DexScreener or the database goes through `ports`.

pub mod category;
pub mod constants;
pub mod format;
pub mod stats;
pub mod token;
pub mod trade;

pub use category::{search_term, TrendingCategory};
pub use stats::PlatformStats;
pub use token::{
    LaunchMetadata, MetadataError, NewToken, Token, TokenStatsUpdate, TokenView,
};
pub use trade::{calculate_referral_earning, NewTrade, Trade, TradeSide};
