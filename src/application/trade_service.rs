//! Trade Service
//!
//! Jupiter quotes and swap transactions for buying and selling launched
//! tokens against SOL. Every quote carries the platform fee; swaps route the
//! fee to the configured referral account.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::constants::{
    DEFAULT_TRADE_SLIPPAGE_BPS, MAX_SLIPPAGE_BPS, PLATFORM_FEE_BPS, SOL_MINT,
};
use crate::domain::format::is_valid_solana_address;
use crate::domain::trade::{referral_earning_f64, referral_earning_from_f64, NewTrade, Trade, TradeSide};
use crate::ports::execution::{
    ExecutionError, QuoteRequest, QuoteResponse, SwapPort, SwapRequest,
};
use crate::ports::repository::{RepositoryError, TokenRepository};

#[derive(Debug, Error)]
pub enum TradeError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid wallet address: {0}")]
    InvalidWallet(String),
    #[error("Slippage must be at most {max} bps", max = MAX_SLIPPAGE_BPS)]
    SlippageTooHigh(u16),
    #[error("Failed to get quote: {0}")]
    Quote(#[source] ExecutionError),
    #[error("Failed to create transaction: {0}")]
    Swap(#[source] ExecutionError),
    #[error("Database not configured")]
    NoDatabase,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Quote parameters as submitted by a client
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput {
    pub input_mint: String,
    pub output_mint: String,
    pub amount: u64,
    pub slippage_bps: Option<u16>,
}

/// Quote summary returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub input_mint: String,
    pub output_mint: String,
    pub in_amount: String,
    pub out_amount: String,
    pub price_impact_pct: f64,
    pub route: String,
}

impl From<&QuoteResponse> for QuoteSummary {
    fn from(quote: &QuoteResponse) -> Self {
        Self {
            input_mint: quote.input_mint.clone(),
            output_mint: quote.output_mint.clone(),
            in_amount: quote.in_amount.clone(),
            out_amount: quote.out_amount.clone(),
            price_impact_pct: quote.price_impact(),
            route: quote.route(),
        }
    }
}

/// Buy or sell request: `amount` is lamports for a buy, token base units for a sell
#[derive(Debug, Clone, PartialEq)]
pub struct SwapInput {
    pub token_address: String,
    pub amount: u64,
    pub user_wallet: String,
    pub slippage_bps: Option<u16>,
}

/// Swap transaction for the user to sign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub success: bool,
    pub transaction: String,
    pub expected_output: String,
    pub price_impact: f64,
    pub referral_earning: f64,
    pub last_valid_block_height: u64,
}

/// Executed trade reported by a client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordTradeInput {
    #[serde(default)]
    pub token_mint: String,
    #[serde(default)]
    pub trader_wallet: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    #[serde(default)]
    pub amount_in: f64,
    #[serde(default)]
    pub amount_out: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(Clone)]
pub struct TradeService {
    swap: Arc<dyn SwapPort>,
    repository: Option<Arc<dyn TokenRepository>>,
    fee_bps: u16,
    default_slippage_bps: u16,
}

impl TradeService {
    pub fn new(swap: Arc<dyn SwapPort>, repository: Option<Arc<dyn TokenRepository>>) -> Self {
        Self {
            swap,
            repository,
            fee_bps: PLATFORM_FEE_BPS,
            default_slippage_bps: DEFAULT_TRADE_SLIPPAGE_BPS,
        }
    }

    pub fn with_fee_bps(mut self, fee_bps: u16) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    pub fn with_default_slippage(mut self, slippage_bps: u16) -> Self {
        self.default_slippage_bps = slippage_bps;
        self
    }

    pub fn fee_bps(&self) -> u16 {
        self.fee_bps
    }

    fn slippage(&self, requested: Option<u16>) -> Result<u16, TradeError> {
        let slippage = requested.unwrap_or(self.default_slippage_bps);
        if slippage > MAX_SLIPPAGE_BPS {
            return Err(TradeError::SlippageTooHigh(slippage));
        }
        Ok(slippage)
    }

    fn quote_request(
        &self,
        input_mint: String,
        output_mint: String,
        amount: u64,
        slippage_bps: Option<u16>,
    ) -> Result<QuoteRequest, TradeError> {
        Ok(
            QuoteRequest::new(input_mint, output_mint, amount, self.slippage(slippage_bps)?)
                .with_platform_fee(self.fee_bps),
        )
    }

    /// Price a swap without building a transaction
    pub async fn quote(&self, input: QuoteInput) -> Result<QuoteSummary, TradeError> {
        if input.input_mint.is_empty() || input.output_mint.is_empty() || input.amount == 0 {
            return Err(TradeError::MissingFields);
        }

        let request =
            self.quote_request(input.input_mint, input.output_mint, input.amount, input.slippage_bps)?;
        let quote = self.swap.quote(&request).await.map_err(TradeError::Quote)?;

        tracing::debug!(
            input_mint = %quote.input_mint,
            output_mint = %quote.output_mint,
            out_amount = %quote.out_amount,
            "Quote"
        );

        Ok(QuoteSummary::from(&quote))
    }

    /// SOL -> token
    pub async fn buy(&self, input: SwapInput) -> Result<SwapTransaction, TradeError> {
        let output = input.token_address.clone();
        self.swap_transaction(input, SOL_MINT.to_string(), output, TradeSide::Buy)
            .await
    }

    /// Token -> SOL
    pub async fn sell(&self, input: SwapInput) -> Result<SwapTransaction, TradeError> {
        let token = input.token_address.clone();
        self.swap_transaction(input, token, SOL_MINT.to_string(), TradeSide::Sell)
            .await
    }

    async fn swap_transaction(
        &self,
        input: SwapInput,
        input_mint: String,
        output_mint: String,
        side: TradeSide,
    ) -> Result<SwapTransaction, TradeError> {
        if input.token_address.is_empty() || input.amount == 0 || input.user_wallet.is_empty() {
            return Err(TradeError::MissingFields);
        }
        if !is_valid_solana_address(&input.user_wallet) {
            return Err(TradeError::InvalidWallet(input.user_wallet));
        }

        let request = self.quote_request(input_mint, output_mint, input.amount, input.slippage_bps)?;
        let quote = self.swap.quote(&request).await.map_err(TradeError::Quote)?;

        let quote_json = serde_json::to_value(&quote)
            .map_err(|e| TradeError::Quote(ExecutionError::ApiError(e.to_string())))?;
        let swap_request = SwapRequest::new(input.user_wallet.clone(), quote_json);
        let swap = self
            .swap
            .swap_transaction(&swap_request)
            .await
            .map_err(TradeError::Swap)?;

        tracing::info!(
            side = %side,
            token = %input.token_address,
            wallet = %input.user_wallet,
            amount = input.amount,
            expected_output = %quote.out_amount,
            "Swap transaction built"
        );

        Ok(SwapTransaction {
            success: true,
            transaction: swap.swap_transaction,
            expected_output: quote.out_amount.clone(),
            price_impact: quote.price_impact(),
            referral_earning: referral_earning_f64(input.amount, self.fee_bps),
            last_valid_block_height: swap.last_valid_block_height,
        })
    }

    /// Persist a trade the client executed, crediting the referral fee on its input
    pub async fn record_trade(&self, input: RecordTradeInput) -> Result<Trade, TradeError> {
        if input.token_mint.is_empty() || input.trader_wallet.is_empty() {
            return Err(TradeError::MissingFields);
        }
        let repository = self.repository.as_ref().ok_or(TradeError::NoDatabase)?;

        let trade = NewTrade {
            referral_earned: referral_earning_from_f64(input.amount_in, self.fee_bps),
            token_mint: input.token_mint,
            trader_wallet: input.trader_wallet,
            side: input.side,
            amount_in: input.amount_in,
            amount_out: input.amount_out,
            price: input.price,
            signature: input.signature,
        };

        Ok(repository.insert_trade(trade).await?)
    }
}
