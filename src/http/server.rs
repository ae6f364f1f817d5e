//! HTTP server setup
//!
//! Builds the axum router over the application services and runs it with
//! graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{cron, health, launch, stats, tokens, trade, trending};
use crate::adapters::solana::WalletManager;
use crate::application::{
    LaunchService, PriceUpdater, StatsService, TokenService, TradeService, TrendingService,
};
use crate::ports::{ChainPort, ImageStore, MarketDataPort, SwapPort, TokenRepository};

/// External systems the services run against
#[derive(Clone)]
pub struct Ports {
    pub market: Arc<dyn MarketDataPort>,
    pub swap: Arc<dyn SwapPort>,
    pub chain: Arc<dyn ChainPort>,
    pub images: Option<Arc<dyn ImageStore>>,
    pub repository: Option<Arc<dyn TokenRepository>>,
    pub platform_wallet: Option<Arc<WalletManager>>,
}

/// Application state injected into handlers
#[derive(Clone)]
pub struct AppState {
    pub trending: TrendingService,
    pub tokens: TokenService,
    pub trades: TradeService,
    pub launches: LaunchService,
    pub stats: StatsService,
    pub prices: PriceUpdater,
    pub cron_secret: Option<String>,
    pub database_configured: bool,
}

impl AppState {
    pub fn new(ports: Ports) -> Self {
        let repository = ports.repository;
        Self {
            trending: TrendingService::new(ports.market.clone(), repository.clone()),
            tokens: TokenService::new(ports.market, repository.clone()),
            trades: TradeService::new(ports.swap.clone(), repository.clone()),
            launches: LaunchService::new(ports.chain, ports.platform_wallet)
                .with_repository(repository.clone())
                .with_image_store(ports.images),
            stats: StatsService::new(repository.clone()),
            prices: PriceUpdater::new(ports.swap, repository.clone()),
            cron_secret: None,
            database_configured: repository.is_some(),
        }
    }

    pub fn with_cron_secret(mut self, secret: Option<String>) -> Self {
        self.cron_secret = secret.filter(|s| !s.is_empty());
        self
    }
}

/// Router and middleware settings
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub request_timeout: Duration,
    pub body_limit: usize,
    /// Empty allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(90),
            body_limit: 4 * 1024 * 1024,
            allowed_origins: Vec::new(),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}

/// All API routes with tracing, timeout, CORS and body limits applied
#[allow(deprecated)]
pub fn router(state: AppState, options: &ServerOptions) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/trending", get(trending::boosted))
        .route("/api/tokens/trending", get(trending::listed))
        .route("/api/pumpfun/trending", get(trending::searched))
        .route("/api/tokens/search", get(tokens::search))
        .route("/api/tokens/{address}", get(tokens::get_token))
        .route("/api/tokens/{address}/trades", get(tokens::trades))
        .route("/api/stats/platform", get(stats::platform))
        .route("/api/trade/quote", post(trade::quote))
        .route("/api/trade/buy", post(trade::buy))
        .route("/api/trade/sell", post(trade::sell))
        .route("/api/trades", post(trade::record))
        .route("/api/launch", post(launch::prepare))
        .route("/api/launch/create", post(launch::create))
        .route("/api/launch/confirm", post(launch::confirm))
        .route("/api/launch/metadata", post(launch::upload_metadata))
        .route("/api/cron/update-prices", get(cron::update_prices))
        .with_state(state)
        .layer(DefaultBodyLimit::max(options.body_limit))
        .layer(cors_layer(&options.allowed_origins))
        .layer(TimeoutLayer::new(options.request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Serve until Ctrl+C
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Builds without panicking for both the wildcard and explicit lists
        let _ = cors_layer(&[]);
        let _ = cors_layer(&["https://spacelab.fun".to_string(), "bad\norigin".to_string()]);
    }
}
