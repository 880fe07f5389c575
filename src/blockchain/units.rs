//! Raw token amount formatting.

use alloy::primitives::U256;

/// Format a raw integer token amount with `decimals` precision.
///
/// Trailing fractional zeros and a dangling decimal point are dropped, and
/// the integer part is always present: `1_500_000` at 6 decimals is `"1.5"`,
/// `1` is `"0.000001"`, zero is `"0"`.
pub fn format_token_amount(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usdc_amounts() {
        assert_eq!(format_token_amount(U256::ZERO, 6), "0");
        assert_eq!(format_token_amount(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_token_amount(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_token_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_token_amount(U256::from(123_456_789u64), 6), "123.456789");
        assert_eq!(format_token_amount(U256::from(100_000u64), 6), "0.1");
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(format_token_amount(U256::from(42u64), 0), "42");
    }

    #[test]
    fn test_large_amount() {
        let raw = U256::from(10u64).pow(U256::from(30u64));
        assert_eq!(format_token_amount(raw, 18), "1000000000000");
    }
}
