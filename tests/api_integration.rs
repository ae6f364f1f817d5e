//! API Integration Tests
//!
//! Drive the full axum router with in-memory ports:
//! 1. Feeds and token lookups with and without a database
//! 2. Trade quotes and swaps including aggregator failures
//! 3. Launch preparation, creation, confirmation and image upload
//! 4. Stats and the cron endpoint
//!
//! No network calls are made.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use space_lab::adapters::solana::WalletManager;
use space_lab::domain::token::NewToken;
use space_lab::http::{router, AppState, Ports, ServerOptions};
use space_lab::ports::market_data::{MarketPair, PairToken, Timeframes, TokenBoost};
use space_lab::ports::mocks::{
    InMemoryTokenRepository, MockChain, MockImageStore, MockMarketData, MockSwap,
};

const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";
const TOKEN: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

// ============================================================================
// Test Fixtures
// ============================================================================

struct TestApp {
    router: Router,
    repository: Option<Arc<InMemoryTokenRepository>>,
    swap: Arc<MockSwap>,
    chain: Arc<MockChain>,
    images: Arc<MockImageStore>,
}

struct Builder {
    market: MockMarketData,
    swap: MockSwap,
    repository: Option<InMemoryTokenRepository>,
    cron_secret: Option<String>,
    platform_wallet: bool,
}

impl Builder {
    fn new() -> Self {
        Self {
            market: MockMarketData::new(),
            swap: MockSwap::new(),
            repository: Some(InMemoryTokenRepository::new()),
            cron_secret: None,
            platform_wallet: true,
        }
    }

    fn market(mut self, market: MockMarketData) -> Self {
        self.market = market;
        self
    }

    fn swap(mut self, swap: MockSwap) -> Self {
        self.swap = swap;
        self
    }

    fn repository(mut self, repository: InMemoryTokenRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    fn without_database(mut self) -> Self {
        self.repository = None;
        self
    }

    fn cron_secret(mut self, secret: &str) -> Self {
        self.cron_secret = Some(secret.to_string());
        self
    }

    fn without_platform_wallet(mut self) -> Self {
        self.platform_wallet = false;
        self
    }

    fn build(self) -> TestApp {
        let repository = self.repository.map(Arc::new);
        let swap = Arc::new(self.swap);
        let chain = Arc::new(MockChain::new());
        let images = Arc::new(MockImageStore::new());

        let ports = Ports {
            market: Arc::new(self.market),
            swap: swap.clone(),
            chain: chain.clone(),
            images: Some(images.clone()),
            repository: repository
                .clone()
                .map(|r| r as Arc<dyn space_lab::ports::TokenRepository>),
            platform_wallet: self
                .platform_wallet
                .then(|| Arc::new(WalletManager::new_random())),
        };
        let state = AppState::new(ports).with_cron_secret(self.cron_secret);

        TestApp {
            router: router(state, &ServerOptions::default()),
            repository,
            swap,
            chain,
            images,
        }
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

fn boost(address: &str) -> TokenBoost {
    TokenBoost {
        chain_id: "solana".into(),
        token_address: address.into(),
        ..Default::default()
    }
}

fn pair(address: &str, symbol: &str, volume: f64) -> MarketPair {
    MarketPair {
        chain_id: "solana".into(),
        dex_id: Some("raydium".into()),
        pair_address: Some(format!("pair-{}", address)),
        base_token: PairToken {
            address: address.into(),
            name: format!("{} Token", symbol),
            symbol: symbol.into(),
        },
        price_usd: Some("0.01".into()),
        volume: Timeframes { h24: Some(volume) },
        ..Default::default()
    }
}

fn launch_body() -> Value {
    json!({
        "name": "Space Cat",
        "symbol": "SCAT",
        "description": "The first cat in orbit",
        "image": "https://gateway.test/ipfs/Qm1",
        "userWallet": WALLET,
        "twitter": "https://x.com/spacecat"
    })
}

fn multipart_request(field: &str, file_name: &str, content_type: &str, content: &[u8]) -> Request<Body> {
    let boundary = "spacelabboundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            field, file_name, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::post("/api/launch/metadata")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

// ============================================================================
// Health and feeds
// ============================================================================

#[tokio::test]
async fn test_health_reports_database() {
    let app = Builder::new().without_database().build();
    let (status, body) = app.get("/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], false);
}

#[tokio::test]
async fn test_boosted_trending_feed() {
    let market = MockMarketData::new()
        .with_top_boosts(vec![boost("A"), boost("B")])
        .with_pairs("A", vec![pair("A", "AAA", 10.0)])
        .with_pairs("B", vec![pair("B", "BBB", 99.0)]);
    let app = Builder::new().market(market).build();

    let (status, body) = app.get("/api/trending?category=volume&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let tokens = body.as_array().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0]["symbol"], "BBB");
    assert_eq!(tokens[0]["platform"], "DexScreener");
}

#[tokio::test]
async fn test_boosted_feed_upstream_failure() {
    let market = MockMarketData::new();
    market.set_failing(true);
    let app = Builder::new().market(market).build();

    let (status, body) = app.get("/api/trending").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to fetch trending tokens");
}

#[tokio::test]
async fn test_listed_feed_prefers_launched_tokens() {
    let token = NewToken::new("LabMint".into(), "Lab".into(), "LAB".into(), WALLET.into())
        .into_token(Utc::now());
    let app = Builder::new()
        .repository(InMemoryTokenRepository::new().with_token(token))
        .build();

    let (status, body) = app.get("/api/tokens/trending?category=new&limit=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["mint"], "LabMint");
    assert_eq!(body[0]["platform"], "Space Lab");
}

#[tokio::test]
async fn test_listed_feed_failure_is_internal_error() {
    let market = MockMarketData::new();
    market.set_failing(true);
    let app = Builder::new().market(market).without_database().build();

    let (status, body) = app.get("/api/tokens/trending").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_search_feed() {
    let market = MockMarketData::new().with_search_results(vec![
        pair("S", "SOL", 500.0),
        pair("M", "MEME", 50.0),
    ]);
    let app = Builder::new().market(market).build();

    let (status, body) = app.get("/api/pumpfun/trending?category=graduated").await;
    assert_eq!(status, StatusCode::OK);
    let tokens = body.as_array().unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0]["symbol"], "MEME");
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn test_token_lookup_and_not_found() {
    let market = MockMarketData::new().with_pairs(TOKEN, vec![pair(TOKEN, "BONK", 1.0)]);
    let app = Builder::new().market(market).build();

    let (status, body) = app.get(&format!("/api/tokens/{}", TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["symbol"], "BONK");

    let (status, body) = app.get("/api/tokens/Unknown111").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Token not found");
}

#[tokio::test]
async fn test_token_search_and_trades_without_database() {
    let app = Builder::new().without_database().build();

    let (status, body) = app.get("/api/tokens/search?q=cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get(&format!("/api/tokens/{}/trades", TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// ============================================================================
// Trading
// ============================================================================

#[tokio::test]
async fn test_quote_adds_platform_fee() {
    let app = Builder::new()
        .swap(MockSwap::new().with_quote(5_000_000, "0.12"))
        .build();

    let (status, body) = app
        .post(
            "/api/trade/quote",
            json!({ "inputMint": SOL_MINT, "outputMint": TOKEN, "amount": "1000000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outAmount"], "5000000");
    assert_eq!(body["priceImpactPct"], 0.12);
    assert_eq!(body["route"], "Direct");

    let request = &app.swap.quote_requests()[0];
    assert_eq!(request.platform_fee_bps, Some(100));
    assert_eq!(request.slippage_bps, 100);
}

#[tokio::test]
async fn test_quote_validation_and_failures() {
    let app = Builder::new().build();

    let (status, body) = app.post("/api/trade/quote", json!({ "inputMint": SOL_MINT })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    // No quote configured: upstream failure
    let (status, body) = app
        .post(
            "/api/trade/quote",
            json!({ "inputMint": SOL_MINT, "outputMint": TOKEN, "amount": 1000 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to get quote");

    let rejecting = Builder::new()
        .swap(MockSwap::new().with_rejection("Could not find any route"))
        .build();
    let (status, body) = rejecting
        .post(
            "/api/trade/quote",
            json!({ "inputMint": SOL_MINT, "outputMint": TOKEN, "amount": 1000 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Could not find any route");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = Builder::new().build();
    let request = Request::post("/api/trade/buy")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_buy_and_sell_transactions() {
    let app = Builder::new()
        .swap(
            MockSwap::new()
                .with_quote(42_000, "0.5")
                .with_swap_transaction("c3dhcA=="),
        )
        .build();

    let (status, body) = app
        .post(
            "/api/trade/buy",
            json!({ "tokenAddress": TOKEN, "amount": 100_000_000u64, "userWallet": WALLET }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["transaction"], "c3dhcA==");
    assert_eq!(body["expectedOutput"], "42000");
    assert_eq!(body["lastValidBlockHeight"], 1000);

    let (status, _) = app
        .post(
            "/api/trade/sell",
            json!({ "tokenAddress": TOKEN, "amount": "5000", "userWallet": WALLET }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let quotes = app.swap.quote_requests();
    assert_eq!(quotes[0].input_mint, SOL_MINT);
    assert_eq!(quotes[0].output_mint, TOKEN);
    assert_eq!(quotes[1].input_mint, TOKEN);
    assert_eq!(quotes[1].output_mint, SOL_MINT);
    assert_eq!(app.swap.swap_requests()[0].user_public_key, WALLET);
}

#[tokio::test]
async fn test_buy_rejects_bad_input() {
    let app = Builder::new().build();

    let (status, _) = app
        .post("/api/trade/buy", json!({ "tokenAddress": TOKEN, "userWallet": WALLET }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/trade/buy",
            json!({ "tokenAddress": TOKEN, "amount": 1000, "userWallet": "nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/trade/buy",
            json!({ "tokenAddress": TOKEN, "amount": 1000, "userWallet": WALLET, "slippageBps": 5000 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_trade() {
    let app = Builder::new().build();

    let (status, body) = app
        .post(
            "/api/trades",
            json!({
                "tokenMint": TOKEN,
                "traderWallet": WALLET,
                "type": "buy",
                "amountIn": 2.0,
                "amountOut": 1000.0,
                "price": 0.002
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);

    let trades = app.repository.as_ref().unwrap().trades();
    assert_eq!(trades.len(), 1);
    assert!((trades[0].referral_earned - 0.02).abs() < 1e-12);

    let (status, body) = app.get(&format!("/api/tokens/{}/trades", TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["type"], "buy");
}

// ============================================================================
// Launch
// ============================================================================

#[tokio::test]
async fn test_prepare_launch() {
    let app = Builder::new().build();

    let (status, body) = app.post("/api/launch", launch_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["symbol"], "SCAT");
    assert_eq!(body["twitter"], "https://x.com/spacecat");
    assert!(body["transaction"].as_str().unwrap().len() > 100);
    assert!(app.chain.sent_transactions().is_empty());
}

#[tokio::test]
async fn test_prepare_launch_validation() {
    let app = Builder::new().build();

    let mut body = launch_body();
    body["description"] = json!("");
    let (status, response) = app.post("/api/launch", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Missing required fields");

    let mut body = launch_body();
    body["description"] = json!("x".repeat(501));
    let (status, _) = app.post("/api/launch", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_launch_without_platform_wallet() {
    let app = Builder::new().without_platform_wallet().build();
    let (status, body) = app.post("/api/launch", launch_body()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "PLATFORM_WALLET_KEY not configured");
}

#[tokio::test]
async fn test_create_launch_sends_and_lists_token() {
    let app = Builder::new().build();

    let (status, body) = app.post("/api/launch/create", launch_body()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["creator"], WALLET);
    assert_eq!(app.chain.sent_transactions().len(), 1);

    let mint = body["mint"].as_str().unwrap().to_string();
    let (status, token) = app.get(&format!("/api/tokens/{}", mint)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(token["name"], "Space Cat");
    assert_eq!(token["bondingCurve"], body["bondingCurve"]);
}

#[tokio::test]
async fn test_confirm_launch() {
    let app = Builder::new().build();
    let confirm = json!({
        "mint": "ConfirmedMint111",
        "name": "Rocket",
        "symbol": "RKT",
        "userWallet": WALLET,
        "signature": "5igSig"
    });

    let (status, body) = app.post("/api/launch/confirm", confirm.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "mint": "ConfirmedMint111", "signature": "5igSig" }));

    let (status, _) = app.post("/api/launch/confirm", confirm).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.post("/api/launch/confirm", json!({ "mint": "X" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn test_confirm_without_database_fails() {
    let app = Builder::new().without_database().build();
    let (status, _) = app
        .post(
            "/api/launch/confirm",
            json!({ "mint": "M", "userWallet": WALLET, "signature": "S" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_image_upload() {
    let app = Builder::new().build();

    let (status, body) = app
        .send(multipart_request("file", "cat.png", "image/png", &[137, 80, 78, 71]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["imageUrl"].as_str().unwrap().starts_with("https://gateway.test/ipfs/"));
    assert_eq!(app.images.uploads().len(), 1);

    let (status, body) = app
        .send(multipart_request("file", "cat.svg", "image/svg+xml", b"<svg/>"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid file type. Allowed: JPEG, PNG, GIF, WebP");

    let (status, body) = app
        .send(multipart_request("other", "cat.png", "image/png", &[1]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_image_upload_falls_back_to_data_url() {
    let app = Builder::new().build();
    app.images.set_failing(true);

    let (status, body) = app
        .send(multipart_request("file", "cat.gif", "image/gif", &[1, 2, 3]))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imageUrl"], "data:image/gif;base64,AQID");
    assert!(body["warning"].is_string());
}

// ============================================================================
// Stats and cron
// ============================================================================

#[tokio::test]
async fn test_stats() {
    let app = Builder::new().build();
    let (status, body) = app.get("/api/stats/platform").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTokens"], 0);
    assert_eq!(body["volumeChange"], 0.0);

    let app = Builder::new().without_database().build();
    let (status, body) = app.get("/api/stats/platform").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Database unavailable for stats");
}

#[tokio::test]
async fn test_cron_requires_secret() {
    let token = NewToken::new(TOKEN.into(), "Bonk".into(), "BONK".into(), WALLET.into())
        .into_token(Utc::now());
    let app = Builder::new()
        .repository(InMemoryTokenRepository::new().with_token(token))
        .swap(MockSwap::new().with_quote(2_000_000_000, "0"))
        .cron_secret("s3cret")
        .build();

    let (status, body) = app.get("/api/cron/update-prices").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");

    let request = Request::get("/api/cron/update-prices")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "updated": 1, "total": 1 }));

    let stored = &app.repository.as_ref().unwrap().tokens()[0];
    assert!((stored.price - 0.5).abs() < 1e-12);
}
