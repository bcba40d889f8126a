//! Human amounts <-> base units
//!
//! Amounts travel between components as decimal strings (what a user typed, or
//! what the swap-back leg derives from a balance). Conversion to base units is
//! done on the decimal mantissa with U256 arithmetic, so it is exact up to the
//! token's precision and truncates beyond it.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::str::FromStr;

use crate::error::SwapError;

/// Significant digits a `Decimal` can always hold
const MAX_DECIMAL_DIGITS: usize = 28;

/// Cut fractional digits a `Decimal` cannot hold, so parsing truncates
/// where `Decimal::from_str` would round.
fn truncate_to_precision(plain: &str) -> Cow<'_, str> {
    let Some((int_part, frac)) = plain.split_once('.') else {
        return Cow::Borrowed(plain);
    };
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Cow::Borrowed(plain);
    }

    let int_digits = int_part
        .trim_start_matches(['+', '-'])
        .trim_start_matches('0')
        .len();
    let room = MAX_DECIMAL_DIGITS.saturating_sub(int_digits);

    if frac.len() <= room {
        Cow::Borrowed(plain)
    } else if room == 0 {
        Cow::Owned(int_part.to_string())
    } else {
        Cow::Owned(format!("{}.{}", int_part, &frac[..room]))
    }
}

/// Parse a user-facing amount. Must be strictly positive.
///
/// Digits beyond what a `Decimal` holds are dropped, never rounded up.
/// Scientific notation with more significant digits than that is rejected.
pub fn parse_amount(raw: &str) -> Result<Decimal, SwapError> {
    let trimmed = raw.trim();

    let value = if let Some((mantissa, _)) = trimmed.split_once(['e', 'E']) {
        let digits = mantissa
            .bytes()
            .filter(u8::is_ascii_digit)
            .skip_while(|b| *b == b'0')
            .count();
        if digits > MAX_DECIMAL_DIGITS {
            return Err(SwapError::invalid_amount(raw, "too many significant digits"));
        }
        Decimal::from_scientific(trimmed)
    } else {
        Decimal::from_str(&truncate_to_precision(trimmed))
    }
    .map_err(|_| SwapError::invalid_amount(raw, "not a decimal number"))?;

    if value <= Decimal::ZERO {
        return Err(SwapError::invalid_amount(raw, "must be positive"));
    }
    Ok(value)
}

/// Scale a decimal amount to base units, truncating toward zero.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Option<U256> {
    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();
    let decimals = decimals as u32;
    let ten = U256::from(10u8);

    if decimals >= scale {
        let factor = ten.checked_pow(U256::from(decimals - scale))?;
        mantissa.checked_mul(factor)
    } else {
        let divisor = ten.checked_pow(U256::from(scale - decimals))?;
        Some(mantissa / divisor)
    }
}

/// `parse_amount` + `to_base_units`; zero base units is rejected too.
pub fn amount_to_base_units(raw: &str, decimals: u8) -> Result<U256, SwapError> {
    let amount = parse_amount(raw)?;
    let base = to_base_units(amount, decimals)
        .ok_or_else(|| SwapError::invalid_amount(raw, "too large for token precision"))?;

    if base.is_zero() {
        return Err(SwapError::invalid_amount(
            raw,
            format!("below the smallest unit of a {}-decimal token", decimals),
        ));
    }
    Ok(base)
}

/// Exact decimal rendering of a base-unit value, trailing zeros trimmed.
pub fn format_base_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac)
    }
}

/// Render a balance so that `parse_amount` accepts it without rounding.
///
/// Low-order fractional digits past the parser's precision are dropped, so the
/// result never exceeds `value`. Returns None when nothing positive is left,
/// or when the integer part alone is wider than that precision.
pub fn format_amount(value: U256, decimals: u8) -> Option<String> {
    let exact = format_base_units(value, decimals);
    let (int_part, frac) = match exact.split_once('.') {
        Some((int_part, frac)) => (int_part, frac),
        None => (exact.as_str(), ""),
    };

    let int_digits = if int_part == "0" { 0 } else { int_part.len() };
    if int_digits > MAX_DECIMAL_DIGITS {
        return None;
    }

    let room = MAX_DECIMAL_DIGITS - int_digits;
    let frac = frac[..frac.len().min(room)].trim_end_matches('0');

    let rendered = if frac.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac)
    };

    if rendered == "0" {
        None
    } else {
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rejects_non_positive_and_garbage() {
        for raw in ["0", "0.0", "-1", "-0.5", "", "abc", "1.2.3", "1,5"] {
            let err = parse_amount(raw).unwrap_err();
            assert!(
                matches!(err, SwapError::InvalidAmount { .. }),
                "{:?} should be invalid",
                raw
            );
        }
    }

    #[test]
    fn test_parse_accepts_plain_and_scientific() {
        assert_eq!(parse_amount(" 1.5 ").unwrap(), dec!(1.5));
        assert_eq!(parse_amount("2e-3").unwrap(), dec!(0.002));
    }

    #[test]
    fn test_parse_truncates_digits_beyond_precision() {
        let raw = "1.99999999999999999999999999999";
        let parsed = parse_amount(raw).unwrap();
        assert!(parsed < dec!(2));
        assert_eq!(parsed, dec!(1.999999999999999999999999999));

        let base = amount_to_base_units(raw, 18).unwrap();
        assert_eq!(base, U256::from(1_999_999_999_999_999_999u128));
    }

    #[test]
    fn test_parse_long_integer_part_drops_fraction() {
        let parsed = parse_amount("1234567890123456789012345678.9").unwrap();
        assert_eq!(parsed, Decimal::from_str("1234567890123456789012345678").unwrap());
    }

    #[test]
    fn test_parse_rejects_overlong_scientific() {
        let err = parse_amount("1.99999999999999999999999999999e0").unwrap_err();
        assert!(matches!(err, SwapError::InvalidAmount { .. }));
    }

    #[test]
    fn test_base_units_exact_within_precision() {
        assert_eq!(
            to_base_units(dec!(1.5), 18),
            Some(U256::from(1_500_000_000_000_000_000u128))
        );
        assert_eq!(to_base_units(dec!(0.000001), 6), Some(U256::from(1u8)));
        assert_eq!(to_base_units(dec!(42), 0), Some(U256::from(42u8)));
        assert_eq!(to_base_units(dec!(0.005), 18), Some(U256::from(5_000_000_000_000_000u128)));
    }

    #[test]
    fn test_base_units_truncate_beyond_precision() {
        // Never rounds up
        assert_eq!(to_base_units(dec!(1.2345679), 6), Some(U256::from(1_234_567u32)));
        assert_eq!(to_base_units(dec!(0.9999999), 6), Some(U256::from(999_999u32)));
        assert_eq!(to_base_units(dec!(7.9), 0), Some(U256::from(7u8)));
    }

    #[test]
    fn test_base_units_overflow_is_none() {
        assert_eq!(to_base_units(dec!(1), 255), None);
    }

    #[test]
    fn test_dust_amount_rejected() {
        let err = amount_to_base_units("0.0000001", 6).unwrap_err();
        assert!(matches!(err, SwapError::InvalidAmount { .. }));
    }

    #[test]
    fn test_format_base_units() {
        assert_eq!(format_base_units(U256::from(1_500_000u32), 6), "1.5");
        assert_eq!(format_base_units(U256::from(1u8), 18), "0.000000000000000001");
        assert_eq!(format_base_units(U256::from(2_000_000u32), 6), "2");
        assert_eq!(format_base_units(U256::ZERO, 6), "0");
        assert_eq!(format_base_units(U256::from(12u8), 0), "12");
    }

    #[test]
    fn test_format_amount_roundtrips_through_parse() {
        let balance = U256::from(123_456_789_012_345_678_901u128);
        let rendered = format_amount(balance, 18).unwrap();

        assert_eq!(rendered, "123.456789012345678901");
        assert_eq!(amount_to_base_units(&rendered, 18).unwrap(), balance);
    }

    #[test]
    fn test_format_amount_truncates_excess_precision() {
        // 31 significant digits; the last three fractional digits must go
        let balance = U256::from_str("1234567890123456789012345678901").unwrap();
        let rendered = format_amount(balance, 18).unwrap();

        assert_eq!(rendered, "1234567890123.456789012345678");
        let back = amount_to_base_units(&rendered, 18).unwrap();
        assert!(back <= balance);
        assert_eq!(balance - back, U256::from(901u32));
    }

    #[test]
    fn test_format_amount_integer_wider_than_precision_is_none() {
        // 29 integer digits
        let balance = U256::from_str("12345678901234567890123456789").unwrap();
        assert_eq!(format_amount(balance, 0), None);
    }

    #[test]
    fn test_format_amount_zero_is_none() {
        assert_eq!(format_amount(U256::ZERO, 18), None);
    }
}
