use serde::{Deserialize, Serialize};

/// Aggregate platform numbers shown on the landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    /// Sum of 24h volume across all tokens (USD)
    pub total_volume: f64,
    pub total_tokens: i64,
    /// Distinct trader wallets over the last 24 hours
    pub total_traders: i64,
    /// Sum of referral fees recorded on trades
    pub total_earnings: f64,
    /// Volume change versus the previous period; always 0 since no history is kept
    pub volume_change: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_json_shape() {
        let stats = PlatformStats {
            total_volume: 1250.5,
            total_tokens: 3,
            total_traders: 2,
            total_earnings: 0.25,
            volume_change: 0.0,
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["totalVolume"], 1250.5);
        assert_eq!(json["totalTokens"], 3);
        assert_eq!(json["totalTraders"], 2);
        assert_eq!(json["volumeChange"], 0.0);
    }
}
