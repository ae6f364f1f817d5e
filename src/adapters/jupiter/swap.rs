//! Jupiter Swap Types
//!
//! Request and response structures for the Jupiter swap API.

use serde::{Deserialize, Serialize};

/// Keyword form of the prioritization fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeKeyword {
    /// Let Jupiter pick a fee from recent network conditions
    Auto,
}

/// Prioritization fee: an explicit lamport amount or `"auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrioritizationFee {
    Lamports(u64),
    Keyword(FeeKeyword),
}

impl Default for PrioritizationFee {
    fn default() -> Self {
        PrioritizationFee::Keyword(FeeKeyword::Auto)
    }
}

/// Request parameters for building a swap transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    /// User's public key (wallet address)
    pub user_public_key: String,
    /// The full quote response from /quote endpoint
    pub quote_response: serde_json::Value,
    /// Wrap SOL into wSOL on the way in and unwrap on the way out
    pub wrap_and_unwrap_sol: bool,
    pub dynamic_compute_unit_limit: bool,
    #[serde(default)]
    pub prioritization_fee_lamports: PrioritizationFee,
    /// Referral token account receiving the platform fee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_account: Option<String>,
}

impl SwapRequest {
    /// Create a swap request with SOL wrapping, dynamic compute and auto priority fee
    pub fn new(user_public_key: String, quote_response: serde_json::Value) -> Self {
        Self {
            user_public_key,
            quote_response,
            wrap_and_unwrap_sol: true,
            dynamic_compute_unit_limit: true,
            prioritization_fee_lamports: PrioritizationFee::default(),
            fee_account: None,
        }
    }

    pub fn with_priority_fee(mut self, lamports: u64) -> Self {
        self.prioritization_fee_lamports = PrioritizationFee::Lamports(lamports);
        self
    }

    pub fn with_fee_account(mut self, fee_account: String) -> Self {
        self.fee_account = Some(fee_account);
        self
    }
}

/// Response from Jupiter swap API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    /// Base64 encoded serialized transaction ready to sign and send
    pub swap_transaction: String,
    #[serde(default)]
    pub last_valid_block_height: u64,
    #[serde(default)]
    pub prioritization_fee_lamports: u64,
}

impl SwapResponse {
    /// Get the transaction bytes from base64
    pub fn transaction_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.decode(&self.swap_transaction)
    }

    /// Check if transaction is still valid based on current block height
    pub fn is_valid_at_height(&self, current_height: u64) -> bool {
        current_height <= self.last_valid_block_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_request_defaults_serialize() {
        let req = SwapRequest::new("wallet123".to_string(), serde_json::json!({"outAmount": "5"}));

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userPublicKey"], "wallet123");
        assert_eq!(json["wrapAndUnwrapSol"], true);
        assert_eq!(json["dynamicComputeUnitLimit"], true);
        assert_eq!(json["prioritizationFeeLamports"], "auto");
        assert_eq!(json["quoteResponse"]["outAmount"], "5");
        assert!(json.get("feeAccount").is_none());
    }

    #[test]
    fn test_swap_request_builder() {
        let req = SwapRequest::new("wallet123".to_string(), serde_json::json!({}))
            .with_priority_fee(10_000)
            .with_fee_account("Referral111".to_string());

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["prioritizationFeeLamports"], 10_000);
        assert_eq!(json["feeAccount"], "Referral111");
    }

    #[test]
    fn test_prioritization_fee_parses_both_forms() {
        let auto: PrioritizationFee = serde_json::from_str(r#""auto""#).unwrap();
        assert_eq!(auto, PrioritizationFee::Keyword(FeeKeyword::Auto));

        let fixed: PrioritizationFee = serde_json::from_str("5000").unwrap();
        assert_eq!(fixed, PrioritizationFee::Lamports(5000));
    }

    #[test]
    fn test_swap_response_parsing() {
        let json = r#"{
            "swapTransaction": "AQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
            "lastValidBlockHeight": 123456789,
            "prioritizationFeeLamports": 5000
        }"#;

        let response: SwapResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.last_valid_block_height, 123456789);
        assert!(response.transaction_bytes().is_ok());
        assert!(response.is_valid_at_height(123456789));
        assert!(!response.is_valid_at_height(123456790));
    }
}
