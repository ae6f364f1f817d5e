//! Display Formatting
//!
//! Number, price and address formatting shared by API responses and the CLI.

use chrono::{DateTime, Utc};

use super::constants::LAMPORTS_PER_SOL;

/// Format a number with K, M, B suffixes (two decimals)
pub fn format_number(num: f64) -> String {
    if !num.is_finite() {
        return "0".to_string();
    }

    if num >= 1_000_000_000.0 {
        format!("{:.2}B", num / 1_000_000_000.0)
    } else if num >= 1_000_000.0 {
        format!("{:.2}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.2}K", num / 1_000.0)
    } else {
        format!("{:.2}", num)
    }
}

/// Format a lamport amount as SOL with four decimals
pub fn format_sol(lamports: u64) -> String {
    format!("{:.4}", lamports as f64 / LAMPORTS_PER_SOL as f64)
}

/// Shorten an address to `chars` characters on each side
pub fn shorten_address(address: &str, chars: usize) -> String {
    if address.is_empty() {
        return String::new();
    }
    let chars_vec: Vec<char> = address.chars().collect();
    if chars_vec.len() <= chars * 2 {
        return address.to_string();
    }
    let head: String = chars_vec[..chars].iter().collect();
    let tail: String = chars_vec[chars_vec.len() - chars..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Relative age of a timestamp ("42s ago", "3h ago", "2w ago")
pub fn time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - timestamp).num_seconds().max(0);

    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3_600 {
        format!("{}m ago", seconds / 60)
    } else if seconds < 86_400 {
        format!("{}h ago", seconds / 3_600)
    } else if seconds < 604_800 {
        format!("{}d ago", seconds / 86_400)
    } else {
        format!("{}w ago", seconds / 604_800)
    }
}

/// Format a USD price with precision scaled to its magnitude
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        "0".to_string()
    } else if price < 0.000001 {
        format!("{:.2e}", price)
    } else if price < 0.01 {
        format!("{:.9}", price)
    } else if price < 1.0 {
        format!("{:.6}", price)
    } else if price < 1000.0 {
        format!("{:.4}", price)
    } else {
        format_number(price)
    }
}

/// Percentage change between two values (0 when there is no previous value)
pub fn calculate_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 || !previous.is_finite() {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// Signed percentage with two decimals ("+4.20%", "-1.00%")
pub fn format_percentage(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    if value >= 0.0 {
        format!("+{}%", formatted)
    } else {
        format!("-{}%", formatted)
    }
}

/// Price 24 hours ago derived from the current price and the 24h change.
///
/// A change of -100% or worse has no meaningful origin price and yields 0.
pub fn price_24h_ago(price: f64, change_pct: f64) -> f64 {
    if price == 0.0 || change_pct == 0.0 {
        return price;
    }
    let factor = 1.0 + change_pct / 100.0;
    if factor <= 0.0 {
        return 0.0;
    }
    price / factor
}

/// Check that a string is a base58-encoded 32-byte Solana address
pub fn is_valid_solana_address(address: &str) -> bool {
    if address.len() < 32 || address.len() > 44 {
        return false;
    }
    matches!(bs58::decode(address).into_vec(), Ok(bytes) if bytes.len() == 32)
}

/// Join swap route labels for display ("Raydium → Orca"), "Direct" when empty
pub fn format_route<'a, I>(labels: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let joined: Vec<&str> = labels.into_iter().filter(|l| !l.is_empty()).collect();
    if joined.is_empty() {
        "Direct".to_string()
    } else {
        joined.join(" → ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    #[test]
    fn test_format_number_suffixes() {
        assert_eq!(format_number(12.0), "12.00");
        assert_eq!(format_number(1_500.0), "1.50K");
        assert_eq!(format_number(2_340_000.0), "2.34M");
        assert_eq!(format_number(7_000_000_000.0), "7.00B");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_format_sol() {
        assert_eq!(format_sol(1_500_000_000), "1.5000");
        assert_eq!(format_sol(0), "0.0000");
    }

    #[test]
    fn test_shorten_address() {
        let addr = "So11111111111111111111111111111111111111112";
        assert_eq!(shorten_address(addr, 4), "So11...1112");
        assert_eq!(shorten_address("", 4), "");
        assert_eq!(shorten_address("abcdef", 4), "abcdef");
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = Utc::now();
        assert_eq!(time_ago(now - Duration::seconds(42), now), "42s ago");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
        assert_eq!(time_ago(now - Duration::days(15), now), "2w ago");
        assert_eq!(time_ago(now + Duration::seconds(30), now), "0s ago");
    }

    #[test]
    fn test_format_price_precision() {
        assert_eq!(format_price(0.0), "0");
        assert_eq!(format_price(0.0000001), "1.00e-7");
        assert_eq!(format_price(0.005), "0.005000000");
        assert_eq!(format_price(0.5), "0.500000");
        assert_eq!(format_price(12.5), "12.5000");
        assert_eq!(format_price(2500.0), "2.50K");
    }

    #[test]
    fn test_calculate_change() {
        assert_relative_eq!(calculate_change(110.0, 100.0), 10.0, epsilon = 1e-9);
        assert_eq!(calculate_change(110.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(4.2), "+4.20%");
        assert_eq!(format_percentage(-1.0), "-1.00%");
        assert_eq!(format_percentage(0.0), "+0.00%");
    }

    #[test]
    fn test_price_24h_ago() {
        assert_relative_eq!(price_24h_ago(2.0, 100.0), 1.0, epsilon = 1e-12);
        assert_eq!(price_24h_ago(2.0, 0.0), 2.0);
        assert_eq!(price_24h_ago(0.0, 50.0), 0.0);
        assert_eq!(price_24h_ago(2.0, -100.0), 0.0);
    }

    #[test]
    fn test_solana_address_validation() {
        assert!(is_valid_solana_address("So11111111111111111111111111111111111111112"));
        assert!(!is_valid_solana_address("short"));
        assert!(!is_valid_solana_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl"));
    }

    #[test]
    fn test_format_route() {
        assert_eq!(format_route(Vec::<&str>::new()), "Direct");
        assert_eq!(format_route(vec!["Raydium", "", "Orca"]), "Raydium → Orca");
    }
}
