//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the Space Lab backend.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::dexscreener::{DexScreenerClient, DexScreenerConfig};
use crate::adapters::jupiter::{JupiterClient, JupiterConfig};
use crate::adapters::pinata::{PinataClient, PinataConfig};
use crate::adapters::postgres::{PgConfig, PgTokenRepository};
use crate::adapters::solana::{encode_keypair, SolanaClient, WalletManager};
use crate::application::{PriceUpdater, QuoteInput, QuoteSummary, TradeService};
use crate::config::{load_config, Config};
use crate::domain::constants::{DEFAULT_TRADE_SLIPPAGE_BPS, PLATFORM_SUFFIX, SOL_MINT, TOKEN_DECIMALS};
use crate::domain::format::{
    calculate_change, format_number, format_percentage, format_price, format_sol, shorten_address,
    time_ago,
};
use crate::domain::token::Token;
use crate::http::{self, AppState, Ports, ServerOptions};
use crate::launch::{VanityConfig, VanityGrinder};
use crate::ports::{ImageStore, TokenRepository};

const DEFAULT_CONFIG: &str = "config/default.toml";

/// Space Lab - memecoin launchpad backend for Solana
#[derive(Parser, Debug)]
#[command(
    name = "space-lab",
    version = env!("CARGO_PKG_VERSION"),
    author = env!("CARGO_PKG_AUTHORS"),
    about = "Memecoin launchpad backend for Solana",
    long_about = "Space Lab launches SPL tokens with Metaplex metadata, proxies Jupiter \
                  trades with a platform fee and serves DexScreener-backed trending feeds."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve(ServeCmd),

    /// Grind a keypair whose address ends with a suffix
    Vanity(VanityCmd),

    /// Get a Jupiter quote including the platform fee
    Quote(QuoteCmd),

    /// Refresh stored token prices once
    UpdatePrices(UpdatePricesCmd),

    /// Apply database migrations
    Migrate(MigrateCmd),
}

/// Run the HTTP API
#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override listen host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Override listen port
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Apply migrations before serving
    #[arg(long)]
    pub migrate: bool,
}

/// Grind a vanity keypair
#[derive(Parser, Debug)]
pub struct VanityCmd {
    /// Address suffix (case-insensitive)
    #[arg(short, long, value_name = "SUFFIX", default_value = PLATFORM_SUFFIX)]
    pub suffix: String,

    /// Worker threads (0 = all cores)
    #[arg(short, long, value_name = "N", default_value = "0")]
    pub threads: usize,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS", default_value = "30")]
    pub timeout: u64,

    /// Give up after this many keypairs
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u64>,
}

/// Get swap quote
#[derive(Parser, Debug)]
pub struct QuoteCmd {
    /// Input mint address (or SOL)
    #[arg(value_name = "INPUT")]
    pub input_mint: String,

    /// Output mint address (or SOL)
    #[arg(value_name = "OUTPUT")]
    pub output_mint: String,

    /// Amount in base units of the input token
    #[arg(value_name = "AMOUNT")]
    pub amount: u64,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Slippage tolerance in basis points
    #[arg(long, value_name = "BPS", default_value_t = DEFAULT_TRADE_SLIPPAGE_BPS)]
    pub slippage: u16,
}

/// Refresh token prices
#[derive(Parser, Debug)]
pub struct UpdatePricesCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Apply migrations
#[derive(Parser, Debug)]
pub struct MigrateCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    let (verbose, debug) = (app.verbose, app.debug);

    match app.command {
        Command::Serve(cmd) => {
            let config = load(&cmd.config)?;
            init_logging(verbose, debug, Some(&config.logging.level))?;
            serve_command(cmd, config).await
        }
        Command::Vanity(cmd) => {
            init_logging(verbose, debug, None)?;
            vanity_command(cmd).await
        }
        Command::Quote(cmd) => {
            let config = load(&cmd.config)?;
            init_logging(verbose, debug, None)?;
            quote_command(cmd, config).await
        }
        Command::UpdatePrices(cmd) => {
            let config = load(&cmd.config)?;
            init_logging(verbose, debug, Some(&config.logging.level))?;
            update_prices_command(config).await
        }
        Command::Migrate(cmd) => {
            let config = load(&cmd.config)?;
            init_logging(verbose, debug, Some(&config.logging.level))?;
            migrate_command(config).await
        }
    }
}

fn load(path: &PathBuf) -> Result<Config> {
    load_config(path).with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Initialize logging: flags pick the level, then the config level, then
/// warn. RUST_LOG overrides all of them.
fn init_logging(verbose: bool, debug: bool, config_level: Option<&str>) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        config_level.unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt().with_env_filter(filter).with_target(false).init();

    Ok(())
}

fn vanity_config(suffix: String, threads: usize, timeout_secs: u64) -> VanityConfig {
    VanityConfig {
        suffix,
        threads: if threads == 0 { num_cpus::get().max(1) } else { threads },
        timeout: Duration::from_secs(timeout_secs),
        max_attempts: None,
    }
}

fn resolve_mint(value: &str) -> String {
    if value.eq_ignore_ascii_case("sol") {
        SOL_MINT.to_string()
    } else {
        value.to_string()
    }
}

fn pg_config(config: &Config) -> Option<PgConfig> {
    config.database.url.as_ref().map(|url| PgConfig {
        url: url.clone(),
        max_connections: config.database.max_connections,
        acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
    })
}

fn jupiter_client(config: &Config) -> Result<JupiterClient> {
    JupiterClient::with_config(JupiterConfig {
        api_base_url: config.jupiter.api_url.clone(),
        api_key: config.jupiter.api_key.clone(),
        referral_account: config.jupiter.referral_account.clone(),
        timeout: Duration::from_secs(config.jupiter.timeout_secs),
        max_retries: config.jupiter.max_retries,
    })
    .context("Failed to create Jupiter client")
}

fn platform_wallet(config: &Config) -> Result<Option<Arc<WalletManager>>> {
    match config.solana.platform_wallet.as_deref() {
        Some(value) => {
            let wallet = WalletManager::from_config_value(value)
                .context("Failed to load platform wallet")?;
            tracing::info!(wallet = %wallet.public_key(), "Platform wallet loaded");
            Ok(Some(Arc::new(wallet)))
        }
        None => {
            tracing::warn!("PLATFORM_WALLET_KEY not configured - launch routes disabled");
            Ok(None)
        }
    }
}

/// Wire adapters from configuration
fn build_ports(config: &Config, repository: Option<Arc<dyn TokenRepository>>) -> Result<Ports> {
    let market = DexScreenerClient::with_config(DexScreenerConfig {
        api_base_url: config.dexscreener.api_url.clone(),
        timeout: Duration::from_secs(config.dexscreener.timeout_secs),
        cache_ttl: Duration::from_secs(config.dexscreener.cache_ttl_secs),
    })
    .context("Failed to create DexScreener client")?;

    let images: Option<Arc<dyn ImageStore>> = match config.pinata.credentials() {
        Some((api_key, secret_key)) => {
            let pinata = PinataClient::with_config(PinataConfig {
                gateway_url: config.pinata.gateway_url.clone(),
                ..PinataConfig::new(api_key, secret_key)
            })
            .context("Failed to create Pinata client")?;
            Some(Arc::new(pinata))
        }
        None => {
            tracing::warn!("Pinata not configured - images will be stored as data URLs");
            None
        }
    };

    Ok(Ports {
        market: Arc::new(market),
        swap: Arc::new(jupiter_client(config)?),
        chain: Arc::new(SolanaClient::new(config.solana.rpc_url.clone())),
        images,
        repository,
        platform_wallet: platform_wallet(config)?,
    })
}

/// Handle serve command
async fn serve_command(cmd: ServeCmd, mut config: Config) -> Result<()> {
    if let Some(host) = cmd.host {
        config.server.host = host;
    }
    if let Some(port) = cmd.port {
        config.server.port = port;
    }

    tracing::info!("Starting Space Lab API...");

    let repository: Option<Arc<dyn TokenRepository>> = match pg_config(&config) {
        Some(pg) => {
            let repository =
                PgTokenRepository::connect_lazy(&pg).context("Invalid DATABASE_URL")?;
            if cmd.migrate || config.database.run_migrations {
                repository.migrate().await.context("Failed to apply migrations")?;
                tracing::info!("Migrations applied");
            }
            Some(Arc::new(repository))
        }
        None => {
            tracing::warn!("DATABASE_URL not configured - serving DexScreener data only");
            None
        }
    };

    let ports = build_ports(&config, repository)?;
    let mut state = AppState::new(ports).with_cron_secret(config.cron.secret.clone());

    let metadata_program: Pubkey = config
        .solana
        .metadata_program
        .parse()
        .context("Invalid metadata program id")?;
    let curve_program: Pubkey = config
        .solana
        .bonding_curve_program
        .parse()
        .context("Invalid bonding curve program id")?;
    state.launches = state.launches.with_programs(metadata_program, curve_program);
    state.trades = state.trades.with_fee_bps(config.jupiter.platform_fee_bps);

    if config.vanity.enabled {
        tracing::info!(suffix = %config.vanity.suffix, "Vanity mint addresses enabled");
        state.launches = state.launches.with_vanity(VanityGrinder::new(vanity_config(
            config.vanity.suffix.clone(),
            config.vanity.threads,
            config.vanity.timeout_secs,
        )));
    }

    let options = ServerOptions {
        request_timeout: config.server.request_timeout(),
        body_limit: config.server.body_limit_bytes,
        allowed_origins: config.server.allowed_origins.clone(),
    };
    let app = http::router(state, &options);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    http::serve(listener, app).await.context("Server error")?;
    tracing::info!("Space Lab stopped");
    Ok(())
}

/// Handle vanity command
async fn vanity_command(cmd: VanityCmd) -> Result<()> {
    let mut vanity = vanity_config(cmd.suffix, cmd.threads, cmd.timeout);
    vanity.max_attempts = cmd.max_attempts;

    println!(
        "Grinding for suffix '{}' on {} threads (timeout {}s)...",
        vanity.suffix,
        vanity.threads,
        vanity.timeout.as_secs()
    );

    let grinder = VanityGrinder::new(vanity);
    let outcome = tokio::task::spawn_blocking(move || grinder.grind())
        .await
        .context("Vanity task panicked")?
        .context("Failed to start vanity workers")?;

    println!(
        "  Attempts: {} ({:.0} keys/s, {:.1}s)",
        outcome.attempts,
        outcome.rate(),
        outcome.elapsed.as_secs_f64()
    );

    match outcome.keypair {
        Some(keypair) => {
            println!("  Address: {}", keypair.pubkey());
            println!("  Secret (base64): {}", encode_keypair(&keypair));
            Ok(())
        }
        None => bail!("No matching address found"),
    }
}

/// Handle quote command
async fn quote_command(cmd: QuoteCmd, config: Config) -> Result<()> {
    let service = TradeService::new(Arc::new(jupiter_client(&config)?), None)
        .with_fee_bps(config.jupiter.platform_fee_bps);

    let summary = service
        .quote(QuoteInput {
            input_mint: resolve_mint(&cmd.input_mint),
            output_mint: resolve_mint(&cmd.output_mint),
            amount: cmd.amount,
            slippage_bps: Some(cmd.slippage),
        })
        .await
        .context("Failed to get quote")?;

    for line in quote_lines(&summary) {
        println!("{}", line);
    }
    println!(
        "  Slippage:     {} bps, platform fee {} bps",
        cmd.slippage,
        service.fee_bps()
    );

    Ok(())
}

/// Handle update-prices command
async fn update_prices_command(config: Config) -> Result<()> {
    let Some(pg) = pg_config(&config) else {
        bail!("DATABASE_URL not configured");
    };
    let repository = PgTokenRepository::connect(&pg)
        .await
        .context("Failed to connect to database")?;

    let repository: Arc<dyn TokenRepository> = Arc::new(repository);

    let updater = PriceUpdater::new(Arc::new(jupiter_client(&config)?), Some(repository.clone()));
    let summary = updater.run().await.context("Price update failed")?;

    println!("Updated {} of {} tokens", summary.updated, summary.total);

    let tokens = repository
        .active_tokens(PRICE_TABLE_ROWS)
        .await
        .context("Failed to load tokens")?;
    let now = chrono::Utc::now();
    for token in &tokens {
        println!("  {}", token_row(token, now));
    }
    Ok(())
}

/// Tokens listed after a price update
const PRICE_TABLE_ROWS: i64 = 20;

/// Raw base units shown in SOL for the SOL mint, whole tokens otherwise
fn describe_amount(raw: &str, mint: &str) -> String {
    let units = raw.parse::<u64>().unwrap_or(0);
    if mint == SOL_MINT {
        format!("{} SOL", format_sol(units))
    } else {
        let tokens = units as f64 / 10f64.powi(i32::from(TOKEN_DECIMALS));
        format!("{} tokens", format_number(tokens))
    }
}

fn quote_lines(summary: &QuoteSummary) -> Vec<String> {
    vec![
        format!(
            "Quote {} -> {}",
            shorten_address(&summary.input_mint, 4),
            shorten_address(&summary.output_mint, 4)
        ),
        format!("  In:           {}", describe_amount(&summary.in_amount, &summary.input_mint)),
        format!("  Out:          {}", describe_amount(&summary.out_amount, &summary.output_mint)),
        format!("  Price impact: {}", format_percentage(summary.price_impact_pct)),
        format!("  Route:        {}", summary.route),
    ]
}

fn token_row(token: &Token, now: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "{:<8} {}  ${}  {}  mcap ${}  {}",
        token.symbol,
        shorten_address(&token.mint, 4),
        format_price(token.price),
        format_percentage(calculate_change(token.price, token.price_24h_ago)),
        format_number(token.market_cap),
        time_ago(token.created_at, now)
    )
}

/// Handle migrate command
async fn migrate_command(config: Config) -> Result<()> {
    let Some(pg) = pg_config(&config) else {
        bail!("DATABASE_URL not configured");
    };
    let repository = PgTokenRepository::connect(&pg)
        .await
        .context("Failed to connect to database")?;
    repository.migrate().await.context("Failed to apply migrations")?;

    println!("Migrations applied");
    Ok(())
}
