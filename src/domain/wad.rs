//! 18-decimal fixed-point ("WAD") parsing and formatting.
//!
//! All trade arithmetic runs on scaled `U256` integers — never floats —
//! so displayed estimates cannot drift from what the contracts compute.
//! Formatting truncates; it never rounds.

use alloy::primitives::U256;

use super::error::ValidationError;

/// 10^18, the scaling factor for one whole token unit.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Fractional digits carried by on-chain amounts.
pub const WAD_DECIMALS: u32 = 18;

/// Parse a human-entered decimal string into an 18-decimal scaled integer.
///
/// Accepts `"12"`, `"12.5"`, `".5"`. Rejects sign characters, more than 18
/// fractional digits, and anything that is not plain digits and at most one
/// dot. The caller names the field for the error message.
pub fn parse_wad(input: &str, field: &'static str) -> Result<U256, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }

    let invalid = ValidationError::InvalidAmount { field };

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid);
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid);
    }
    if frac_part.len() > WAD_DECIMALS as usize {
        return Err(invalid);
    }

    let int_scaled = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10)
            .ok()
            .and_then(|v| v.checked_mul(WAD))
            .ok_or(invalid.clone())?
    };

    let frac_scaled = if frac_part.is_empty() {
        U256::ZERO
    } else {
        // "5" at 18 decimals means 5 × 10^17: right-pad to width 18.
        let scale = U256::from(10u64).pow(U256::from(WAD_DECIMALS as usize - frac_part.len()));
        U256::from_str_radix(frac_part, 10)
            .ok()
            .and_then(|v| v.checked_mul(scale))
            .ok_or(invalid.clone())?
    };

    int_scaled.checked_add(frac_scaled).ok_or(invalid)
}

/// Lenient parse for the optional fee-recipient amount.
///
/// Empty, non-numeric, or signed input all become zero — this field may
/// never fail a trade. The primary amount and addresses get no such
/// leniency.
pub fn parse_fee_amount(input: &str) -> U256 {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return U256::ZERO;
    }
    U256::from_str_radix(trimmed, 10).unwrap_or(U256::ZERO)
}

/// Format a WAD value truncated to `decimals` fractional digits.
///
/// The value is first scaled down to a `decimals`-digit integer (dropping
/// the remainder), then split into integer and fraction with the fraction
/// left-padded to full width. `format_wad(1.5 WAD, 6)` is `"1.500000"`.
pub fn format_wad(value: U256, decimals: u32) -> String {
    debug_assert!(decimals <= WAD_DECIMALS);
    let out_scale = U256::from(10u64).pow(U256::from(decimals));
    // Equivalent to value × 10^decimals / 10^18, without the intermediate
    // product that could overflow near U256::MAX.
    let scaled = value / U256::from(10u64).pow(U256::from(WAD_DECIMALS - decimals));
    let integer = scaled / out_scale;
    let fraction = scaled % out_scale;
    if decimals == 0 {
        return integer.to_string();
    }
    format!(
        "{integer}.{fraction:0>width$}",
        width = decimals as usize
    )
}

/// Lossy conversion for metrics gauges. Display paths use [`format_wad`].
pub fn wad_to_f64(value: U256) -> f64 {
    // f64 holds the magnitude even when precision is lost.
    let scaled = value / U256::from(1_000_000_000_000u64); // down to 6 decimals
    u128::try_from(scaled).unwrap_or(u128::MAX) as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wads(s: &str) -> U256 {
        parse_wad(s, "amount").unwrap()
    }

    #[test]
    fn test_parse_integer_and_fraction() {
        assert_eq!(wads("1"), WAD);
        assert_eq!(wads("100"), U256::from(100u64) * WAD);
        assert_eq!(wads("1.5"), WAD + WAD / U256::from(2u64));
        assert_eq!(wads(".5"), WAD / U256::from(2u64));
        assert_eq!(wads("0.000000000000000001"), U256::from(1u64));
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for bad in ["-1", "+1", "1.2.3", "abc", "1e18", "1,5", "."] {
            assert!(
                parse_wad(bad, "amount").is_err(),
                "expected {bad:?} to be rejected"
            );
        }
        assert_eq!(
            parse_wad("", "amount"),
            Err(ValidationError::EmptyField { field: "amount" })
        );
    }

    #[test]
    fn test_parse_rejects_more_than_18_fractional_digits() {
        assert!(parse_wad("1.0000000000000000001", "amount").is_err());
        assert!(parse_wad("0.123456789012345678", "amount").is_ok());
    }

    #[test]
    fn test_fee_amount_is_lenient() {
        assert_eq!(parse_fee_amount("123"), U256::from(123u64));
        assert_eq!(parse_fee_amount("  42  "), U256::from(42u64));
        assert_eq!(parse_fee_amount(""), U256::ZERO);
        assert_eq!(parse_fee_amount("-5"), U256::ZERO);
        assert_eq!(parse_fee_amount("1.5"), U256::ZERO);
        assert_eq!(parse_fee_amount("0x10"), U256::ZERO);
    }

    #[test]
    fn test_format_truncates_never_rounds() {
        // 0.9999999 at 6 digits drops the seventh digit.
        let v = wads("0.9999999");
        assert_eq!(format_wad(v, 6), "0.999999");
        assert_eq!(format_wad(wads("1.5"), 6), "1.500000");
        assert_eq!(format_wad(wads("2"), 4), "2.0000");
        assert_eq!(format_wad(U256::ZERO, 6), "0.000000");
    }

    #[test]
    fn test_format_pads_fraction() {
        assert_eq!(format_wad(wads("3.05"), 6), "3.050000");
        assert_eq!(format_wad(wads("3.000001"), 6), "3.000001");
    }
}
