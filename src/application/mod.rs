//! Application Layer - Use cases behind the HTTP routes and CLI commands
//!
//! Each service holds its ports as trait objects. The database is optional
//! everywhere: services degrade to DexScreener data or empty results when no
//! repository is configured.

pub mod launch_service;
pub mod price_updater;
pub mod stats_service;
pub mod token_service;
pub mod trade_service;
pub mod trending_service;

pub use launch_service::{
    ConfirmLaunchInput, ConfirmedLaunch, CreatedLaunch, ImageUpload, LaunchService,
    LaunchServiceError, PreparedLaunch,
};
pub use price_updater::{PriceUpdateError, PriceUpdater, UpdateSummary};
pub use stats_service::{StatsError, StatsService};
pub use token_service::{TokenError, TokenService};
pub use trade_service::{
    QuoteInput, QuoteSummary, RecordTradeInput, SwapInput, SwapTransaction, TradeError,
    TradeService,
};
pub use trending_service::{TrendingError, TrendingService};
