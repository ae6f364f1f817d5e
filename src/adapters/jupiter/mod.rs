//! Jupiter Adapter
//!
//! Implementation of the SwapPort for the Jupiter DEX aggregator.

mod client;
mod quote;
mod swap;

pub use client::{JupiterClient, JupiterConfig};
pub use quote::{QuoteRequest, QuoteResponse, RoutePlanStep, SwapInfo};
pub use swap::{FeeKeyword, PrioritizationFee, SwapRequest, SwapResponse};
