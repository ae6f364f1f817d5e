//! In-memory port implementations for tests.
//!
//! Each mock records the calls it receives and returns responses configured
//! through builder methods.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use solana_sdk::hash::Hash;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use super::chain::{BlockhashInfo, ChainError, ChainPort};
use super::execution::{
    ExecutionError, QuoteRequest, QuoteResponse, SwapPort, SwapRequest, SwapResponse,
};
use super::market_data::{MarketDataError, MarketDataPort, MarketPair, TokenBoost};
use super::repository::{RepositoryError, TokenRepository};
use super::storage::{ImageStore, StorageError};
use crate::domain::category::{cmp_desc, TrendingCategory};
use crate::domain::constants::GRADUATING_MARKET_CAP;
use crate::domain::stats::PlatformStats;
use crate::domain::token::{NewToken, Token, TokenStatsUpdate};
use crate::domain::trade::{NewTrade, Trade};

fn take_limit<T>(items: Vec<T>, limit: i64) -> Vec<T> {
    let limit = usize::try_from(limit).unwrap_or(0);
    items.into_iter().take(limit).collect()
}

/// Token repository over a `Vec`, ordering rows the way the SQL queries do
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<Vec<Token>>,
    trades: Mutex<Vec<Trade>>,
    failing: AtomicBool,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored row
    pub fn with_token(self, token: Token) -> Self {
        self.tokens.lock().unwrap().push(token);
        self
    }

    /// Make every call fail with a database error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.trades.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepositoryError::Database("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn tokens_by_category(
        &self,
        category: TrendingCategory,
        limit: i64,
    ) -> Result<Vec<Token>, RepositoryError> {
        self.check()?;
        let mut tokens = self.tokens();

        match category {
            TrendingCategory::Hot => {
                tokens.retain(|t| !t.graduated);
                tokens.sort_by(|a, b| {
                    cmp_desc(a.volume_24h, b.volume_24h)
                        .then_with(|| cmp_desc(a.market_cap, b.market_cap))
                });
            }
            TrendingCategory::New => tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            TrendingCategory::Graduating => {
                tokens.retain(|t| !t.graduated && t.market_cap >= GRADUATING_MARKET_CAP);
                tokens.sort_by(|a, b| cmp_desc(a.market_cap, b.market_cap));
            }
            TrendingCategory::Gainers => {
                tokens.retain(|t| t.price_24h_ago > 0.0);
                tokens.sort_by(|a, b| cmp_desc(a.price_change_24h(), b.price_change_24h()));
            }
            TrendingCategory::Volume => tokens.sort_by(|a, b| cmp_desc(a.volume_24h, b.volume_24h)),
        }

        Ok(take_limit(tokens, limit))
    }

    async fn token_by_mint(&self, mint: &str) -> Result<Option<Token>, RepositoryError> {
        self.check()?;
        Ok(self.tokens().into_iter().find(|t| t.mint == mint))
    }

    async fn insert_token(&self, token: NewToken) -> Result<Token, RepositoryError> {
        self.check()?;
        let mut tokens = self.tokens.lock().unwrap();
        if tokens.iter().any(|t| t.mint == token.mint) {
            return Err(RepositoryError::Duplicate(token.mint));
        }
        let row = token.into_token(Utc::now());
        tokens.push(row.clone());
        Ok(row)
    }

    async fn update_token_stats(
        &self,
        mint: &str,
        update: &TokenStatsUpdate,
    ) -> Result<bool, RepositoryError> {
        self.check()?;
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.mint == mint) {
            Some(token) => {
                update.apply(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_token_price(&self, mint: &str, price: f64) -> Result<bool, RepositoryError> {
        self.check()?;
        let day_ago = Utc::now() - Duration::hours(24);
        let mut tokens = self.tokens.lock().unwrap();
        match tokens.iter_mut().find(|t| t.mint == mint) {
            Some(token) => {
                if token.created_at < day_ago {
                    token.price_24h_ago = token.price;
                }
                token.price = price;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn active_tokens(&self, limit: i64) -> Result<Vec<Token>, RepositoryError> {
        self.check()?;
        let mut tokens = self.tokens();
        tokens.retain(|t| !t.graduated);
        tokens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(take_limit(tokens, limit))
    }

    async fn insert_trade(&self, trade: NewTrade) -> Result<Trade, RepositoryError> {
        self.check()?;
        let mut trades = self.trades.lock().unwrap();
        let id = trades.len() as i64 + 1;
        let row = trade.into_trade(id, Utc::now());
        trades.push(row.clone());
        Ok(row)
    }

    async fn recent_trades(&self, mint: &str, limit: i64) -> Result<Vec<Trade>, RepositoryError> {
        self.check()?;
        let mut trades: Vec<Trade> = self
            .trades()
            .into_iter()
            .filter(|t| t.token_mint == mint)
            .collect();
        trades.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(take_limit(trades, limit))
    }

    async fn search_tokens(&self, query: &str, limit: i64) -> Result<Vec<Token>, RepositoryError> {
        self.check()?;
        let needle = query.to_lowercase();
        let mut tokens: Vec<Token> = self
            .tokens()
            .into_iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&needle)
                    || t.symbol.to_lowercase().contains(&needle)
                    || t.mint == query
            })
            .collect();
        tokens.sort_by(|a, b| cmp_desc(a.market_cap, b.market_cap));
        Ok(take_limit(tokens, limit))
    }

    async fn platform_stats(&self) -> Result<PlatformStats, RepositoryError> {
        self.check()?;
        let tokens = self.tokens();
        let trades = self.trades();
        let day_ago = Utc::now() - Duration::hours(24);

        let mut traders: Vec<&str> = trades
            .iter()
            .filter(|t| t.created_at > day_ago)
            .map(|t| t.trader_wallet.as_str())
            .collect();
        traders.sort_unstable();
        traders.dedup();

        Ok(PlatformStats {
            total_volume: tokens.iter().map(|t| t.volume_24h).sum(),
            total_tokens: tokens.len() as i64,
            total_traders: traders.len() as i64,
            total_earnings: trades.iter().map(|t| t.referral_earned).sum(),
            volume_change: 0.0,
        })
    }
}

/// Market data with canned boosts and pairs
#[derive(Debug, Default)]
pub struct MockMarketData {
    top_boosts: Vec<TokenBoost>,
    latest_boosts: Vec<TokenBoost>,
    pairs: HashMap<String, Vec<MarketPair>>,
    search_results: Vec<MarketPair>,
    failing: AtomicBool,
    batch_status: Option<u16>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_boosts(mut self, boosts: Vec<TokenBoost>) -> Self {
        self.top_boosts = boosts;
        self
    }

    pub fn with_latest_boosts(mut self, boosts: Vec<TokenBoost>) -> Self {
        self.latest_boosts = boosts;
        self
    }

    /// Register pairs whose base token is `address`
    pub fn with_pairs(mut self, address: &str, pairs: Vec<MarketPair>) -> Self {
        self.pairs.insert(address.to_string(), pairs);
        self
    }

    pub fn with_search_results(mut self, pairs: Vec<MarketPair>) -> Self {
        self.search_results = pairs;
        self
    }

    /// Make only the batched token lookup answer with `status`
    pub fn with_batch_status(mut self, status: u16) -> Self {
        self.batch_status = Some(status);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Recorded calls as "method:argument"
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), MarketDataError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            Err(MarketDataError::Status(503))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MarketDataPort for MockMarketData {
    async fn top_boosts(&self) -> Result<Vec<TokenBoost>, MarketDataError> {
        self.record("top_boosts".into())?;
        Ok(self.top_boosts.clone())
    }

    async fn latest_boosts(&self) -> Result<Vec<TokenBoost>, MarketDataError> {
        self.record("latest_boosts".into())?;
        Ok(self.latest_boosts.clone())
    }

    async fn tokens_by_addresses(
        &self,
        chain_id: &str,
        addresses: &[String],
    ) -> Result<Vec<MarketPair>, MarketDataError> {
        self.record(format!("tokens_by_addresses:{}:{}", chain_id, addresses.len()))?;
        if let Some(status) = self.batch_status {
            return Err(MarketDataError::Status(status));
        }
        Ok(addresses
            .iter()
            .filter_map(|a| self.pairs.get(a))
            .flat_map(|pairs| pairs.iter().cloned())
            .collect())
    }

    async fn pairs_for_token(&self, address: &str) -> Result<Vec<MarketPair>, MarketDataError> {
        self.record(format!("pairs_for_token:{}", address))?;
        self.pairs
            .get(address)
            .cloned()
            .ok_or(MarketDataError::Status(404))
    }

    async fn search_pairs(&self, query: &str) -> Result<Vec<MarketPair>, MarketDataError> {
        self.record(format!("search_pairs:{}", query))?;
        Ok(self.search_results.clone())
    }
}

/// Swap aggregator returning a fixed quote and transaction
#[derive(Debug, Default)]
pub struct MockSwap {
    quote: Mutex<Option<Result<QuoteResponse, String>>>,
    swap: Mutex<Option<SwapResponse>>,
    quote_requests: Mutex<Vec<QuoteRequest>>,
    swap_requests: Mutex<Vec<SwapRequest>>,
}

impl MockSwap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quote answering every request with `out_amount` and `price_impact_pct`
    pub fn with_quote(self, out_amount: u64, price_impact_pct: &str) -> Self {
        let quote = QuoteResponse {
            input_mint: String::new(),
            output_mint: String::new(),
            in_amount: "0".into(),
            out_amount: out_amount.to_string(),
            other_amount_threshold: out_amount.to_string(),
            swap_mode: "ExactIn".into(),
            slippage_bps: 0,
            price_impact_pct: price_impact_pct.to_string(),
            route_plan: Vec::new(),
            context_slot: None,
            time_taken: None,
            extra: HashMap::new(),
        };
        *self.quote.lock().unwrap() = Some(Ok(quote));
        self
    }

    /// Make quotes fail as an aggregator rejection
    pub fn with_rejection(self, message: &str) -> Self {
        *self.quote.lock().unwrap() = Some(Err(message.to_string()));
        self
    }

    pub fn with_swap_transaction(self, transaction: &str) -> Self {
        *self.swap.lock().unwrap() = Some(SwapResponse {
            swap_transaction: transaction.to_string(),
            last_valid_block_height: 1000,
            prioritization_fee_lamports: 5000,
        });
        self
    }

    pub fn quote_requests(&self) -> Vec<QuoteRequest> {
        self.quote_requests.lock().unwrap().clone()
    }

    pub fn swap_requests(&self) -> Vec<SwapRequest> {
        self.swap_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwapPort for MockSwap {
    async fn quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, ExecutionError> {
        self.quote_requests.lock().unwrap().push(request.clone());
        match self.quote.lock().unwrap().clone() {
            Some(Ok(mut quote)) => {
                quote.input_mint = request.input_mint.clone();
                quote.output_mint = request.output_mint.clone();
                quote.in_amount = request.amount.to_string();
                quote.slippage_bps = request.slippage_bps;
                Ok(quote)
            }
            Some(Err(message)) => Err(ExecutionError::Rejected(message)),
            None => Err(ExecutionError::ApiError("no quote configured".into())),
        }
    }

    async fn swap_transaction(&self, request: &SwapRequest) -> Result<SwapResponse, ExecutionError> {
        self.swap_requests.lock().unwrap().push(request.clone());
        self.swap
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ExecutionError::ApiError("no swap configured".into()))
    }
}

/// Chain access that accepts every transaction
#[derive(Debug, Default)]
pub struct MockChain {
    sent: Mutex<Vec<Transaction>>,
    failing: AtomicBool,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_transactions(&self) -> Vec<Transaction> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainPort for MockChain {
    async fn minimum_rent(&self, data_len: usize) -> Result<u64, ChainError> {
        // 6960 lamports per byte plus the 128 byte account overhead
        Ok((data_len as u64 + 128) * 6960)
    }

    async fn latest_blockhash(&self) -> Result<BlockhashInfo, ChainError> {
        Ok(BlockhashInfo {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 1000,
        })
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature, ChainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChainError::Transaction("simulation failed".into()));
        }
        self.sent.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures.first().copied().unwrap_or_default())
    }
}

/// Image store returning a fake gateway URL
#[derive(Debug, Default)]
pub struct MockImageStore {
    uploads: Mutex<Vec<(String, String, usize)>>,
    failing: AtomicBool,
}

impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Recorded uploads as (file name, content type, size)
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn pin(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Status {
                status: 401,
                body: "Invalid API key".into(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((file_name.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("https://gateway.test/ipfs/Qm{}", uploads.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(mint: &str, volume: f64, market_cap: f64) -> Token {
        let mut new = NewToken::new(mint.into(), mint.into(), "TKN".into(), "Creator".into());
        new.volume_24h = volume;
        new.market_cap = market_cap;
        new.into_token(Utc::now())
    }

    #[tokio::test]
    async fn test_repository_hot_ordering() {
        let repo = InMemoryTokenRepository::new()
            .with_token(token("a", 10.0, 1.0))
            .with_token(token("b", 20.0, 1.0))
            .with_token(token("c", 20.0, 5.0));

        let hot = repo.tokens_by_category(TrendingCategory::Hot, 10).await.unwrap();
        let mints: Vec<_> = hot.iter().map(|t| t.mint.as_str()).collect();
        assert_eq!(mints, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_repository_duplicate_insert() {
        let repo = InMemoryTokenRepository::new();
        let new = NewToken::new("m".into(), "n".into(), "s".into(), "w".into());
        repo.insert_token(new.clone()).await.unwrap();
        assert!(matches!(
            repo.insert_token(new).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_repository_failure_toggle() {
        let repo = InMemoryTokenRepository::new();
        repo.set_failing(true);
        assert!(repo.platform_stats().await.is_err());
    }

    #[tokio::test]
    async fn test_mock_swap_echoes_request() {
        let swap = MockSwap::new().with_quote(500, "0.1");
        let request = QuoteRequest::new("in".into(), "out".into(), 42, 100);
        let quote = swap.quote(&request).await.unwrap();
        assert_eq!(quote.input_amount(), 42);
        assert_eq!(quote.output_amount(), 500);
        assert_eq!(swap.quote_requests().len(), 1);
    }
}
