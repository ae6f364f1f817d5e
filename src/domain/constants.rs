//! Platform Constants
//!
//! Fixed parameters shared by the launch, trade and feed paths.

/// Display name stamped on every token launched through the platform
pub const PLATFORM_NAME: &str = "Space Lab";

/// Wrapped SOL mint address
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Decimals used for every launched mint
pub const TOKEN_DECIMALS: u8 = 9;

/// Lamports in one SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Base units per whole launched token (10^TOKEN_DECIMALS)
pub const TOKEN_BASE_UNITS: u64 = 1_000_000_000;

/// Trading fee collected through the Jupiter referral program (1%)
pub const PLATFORM_FEE_BPS: u16 = 100;

/// Default slippage for client-facing quotes (0.5%)
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Slippage used by the trade routes when the caller does not pick one (1%)
pub const DEFAULT_TRADE_SLIPPAGE_BPS: u16 = 100;

/// Upper bound on caller-provided slippage (10%)
pub const MAX_SLIPPAGE_BPS: u16 = 1000;

// Token creation limits
pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;
pub const MAX_IMAGE_SIZE: usize = 2 * 1024 * 1024;

/// Image content types accepted by the metadata upload route
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Launch fee charged to creators (launching is free)
pub const TOKEN_CREATION_FEE: u64 = 0;

/// Supply minted to the creator's wallet on a user launch (1 billion tokens)
pub const USER_LAUNCH_SUPPLY: u64 = 1_000_000_000 * TOKEN_BASE_UNITS;

/// Supply seeded into the bonding curve account on a curve launch
pub const CURVE_LAUNCH_SUPPLY: u64 = 793_100_000 * TOKEN_BASE_UNITS;

/// Initial listing price recorded for a freshly launched token
pub const INITIAL_TOKEN_PRICE: f64 = 0.000001;

/// Market cap (USD) above which the "graduating" feed picks a token up
pub const GRADUATING_MARKET_CAP: f64 = 50_000.0;

/// Metaplex token metadata program
pub const METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// Pump-style bonding curve program the curve launch seeds liquidity for
pub const BONDING_CURVE_PROGRAM_ID: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";

/// Suffix every vanity mint address is ground for
pub const PLATFORM_SUFFIX: &str = "lab";

/// Quick-buy presets offered to clients (in SOL)
pub const QUICK_BUY_AMOUNTS: [f64; 3] = [0.1, 0.5, 1.0];

/// Reference parameters of the external pump-style bonding curve.
///
/// The curve itself runs on-chain; these values are only used to report
/// progress toward graduation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondingCurveParams {
    pub virtual_sol_reserves: u64,
    pub virtual_token_reserves: u64,
    pub initial_real_sol_reserves: u64,
    pub initial_real_token_reserves: u64,
    pub token_total_supply: u64,
    /// Real SOL reserves at which liquidity migrates to Raydium
    pub graduation_threshold: u64,
    /// Approximate USD market cap at graduation
    pub graduation_market_cap: f64,
}

pub const BONDING_CURVE_PARAMS: BondingCurveParams = BondingCurveParams {
    virtual_sol_reserves: 30 * LAMPORTS_PER_SOL,
    virtual_token_reserves: 1_073_000_000 * TOKEN_BASE_UNITS,
    initial_real_sol_reserves: 0,
    initial_real_token_reserves: 793_100_000 * TOKEN_BASE_UNITS,
    token_total_supply: 1_000_000_000 * TOKEN_BASE_UNITS,
    graduation_threshold: 85 * LAMPORTS_PER_SOL,
    graduation_market_cap: 69_420.0,
};

/// Percentage progress (0-100) of a market cap toward graduation
pub fn graduation_progress(market_cap: f64) -> f64 {
    if !market_cap.is_finite() || market_cap <= 0.0 {
        return 0.0;
    }
    (market_cap / BONDING_CURVE_PARAMS.graduation_market_cap * 100.0).min(100.0)
}
