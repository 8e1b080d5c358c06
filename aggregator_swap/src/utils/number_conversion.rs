use crate::error::{AggregatorResult, Error};
use error_stack::{ResultExt, report};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const WEI_DECIMALS: u8 = 18;
pub const USDC_DECIMALS: u8 = 6;

/// Scales a plain decimal string by `10^decimals`, dropping any digits past
/// the last supported decimal place.
pub fn decimal_string_to_u128(s: &str, decimals: u8) -> AggregatorResult<u128> {
    let decimals: usize = decimals.into();
    let (integer_str, decimal_str) = match s.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (s, ""),
    };

    let integer_part = if integer_str.is_empty() {
        0
    } else {
        integer_str
            .parse::<u128>()
            .change_context(Error::ParseError)
            .attach_printable_lazy(|| format!("Invalid amount: {s}"))?
    };

    let trimmed = if decimal_str.len() > decimals {
        &decimal_str[..decimals]
    } else {
        decimal_str
    };

    let decimal_part = if trimmed.is_empty() {
        0
    } else {
        let decimal_value = trimmed
            .parse::<u128>()
            .change_context(Error::ParseError)
            .attach_printable_lazy(|| format!("Invalid amount: {s}"))?;
        10u128
            .checked_pow((decimals - trimmed.len()) as u32)
            .and_then(|factor| decimal_value.checked_mul(factor))
            .ok_or_else(|| {
                report!(Error::ArithmeticError)
                    .attach_printable(format!("Amount {s} overflows u128"))
            })?
    };

    10u128
        .checked_pow(decimals as u32)
        .and_then(|factor| integer_part.checked_mul(factor))
        .and_then(|scaled| scaled.checked_add(decimal_part))
        .ok_or_else(|| {
            report!(Error::ArithmeticError).attach_printable(format!("Amount {s} overflows u128"))
        })
}

/// Converts a human readable amount into the token's smallest unit.
/// Every branch truncates toward zero.
pub fn to_base_units(amount: Decimal, decimals: u8) -> AggregatorResult<u128> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(report!(Error::ParseError)
            .attach_printable(format!("Cannot convert negative amount {amount}")));
    }

    match decimals {
        WEI_DECIMALS => decimal_string_to_u128(&amount.normalize().to_string(), WEI_DECIMALS),
        USDC_DECIMALS => scale_decimal(amount, Decimal::from(1_000_000u64)),
        other => match 10u64.checked_pow(other as u32) {
            Some(factor) => scale_decimal(amount, Decimal::from(factor)),
            // 10^20 and above overflow u64
            None => decimal_string_to_u128(&amount.normalize().to_string(), other),
        },
    }
}

fn scale_decimal(amount: Decimal, factor: Decimal) -> AggregatorResult<u128> {
    amount
        .checked_mul(factor)
        .and_then(|scaled| scaled.trunc().to_u128())
        .ok_or_else(|| {
            report!(Error::ArithmeticError)
                .attach_printable(format!("Amount {amount} cannot be scaled by {factor}"))
        })
}

/// Inverse of [`to_base_units`], used for display only
pub fn from_base_units(value: u128, decimals: u8) -> AggregatorResult<Decimal> {
    let mantissa = i128::try_from(value).change_context(Error::ArithmeticError)?;
    Decimal::try_from_i128_with_scale(mantissa, decimals as u32)
        .map(|d| d.normalize())
        .change_context(Error::ArithmeticError)
        .attach_printable_lazy(|| format!("{value} with {decimals} decimals is out of range"))
}

/// Percent → basis points, truncating fractional bps. Capped at 100 %.
pub fn slippage_to_bps(slippage_percent: Decimal) -> AggregatorResult<u32> {
    if slippage_percent.is_sign_negative() && !slippage_percent.is_zero() {
        return Err(report!(Error::ParseError).attach_printable("Slippage percentage is negative"));
    }

    let bps = (slippage_percent * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u32()
        .ok_or_else(|| {
            report!(Error::ParseError).attach_printable("Slippage percentage is too large")
        })?;

    if bps > 10_000 {
        return Err(report!(Error::ParseError)
            .attach_printable("Slippage percent cannot be more than 100%"));
    }

    Ok(bps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_decimal_string_to_u128() {
        assert_eq!(decimal_string_to_u128("123.456789", 6).unwrap(), 123456789);
        assert_eq!(decimal_string_to_u128("123.4567891", 6).unwrap(), 123456789);
        assert_eq!(decimal_string_to_u128("42", 3).unwrap(), 42_000);
        assert_eq!(decimal_string_to_u128(".5", 2).unwrap(), 50);
        assert!(decimal_string_to_u128("abc", 6).is_err());
        assert!(decimal_string_to_u128("1000000000000000000000", 18).is_err());
    }

    #[test]
    fn test_to_base_units_wei() {
        assert_eq!(to_base_units(dec("1"), 18).unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(to_base_units(dec("12.5"), 18).unwrap(), 12_500_000_000_000_000_000);
        assert_eq!(to_base_units(dec("0.000000000000000001"), 18).unwrap(), 1);
        assert_eq!(to_base_units(dec("10.000"), 18).unwrap(), 10_000_000_000_000_000_000);
    }

    #[test]
    fn test_to_base_units_six_decimals_truncates() {
        assert_eq!(to_base_units(dec("1"), 6).unwrap(), 1_000_000);
        assert_eq!(to_base_units(dec("50.25"), 6).unwrap(), 50_250_000);
        assert_eq!(to_base_units(dec("0.0000019"), 6).unwrap(), 1);
        assert_eq!(to_base_units(dec("0.0000009"), 6).unwrap(), 0);
    }

    #[test]
    fn test_to_base_units_other_decimals() {
        assert_eq!(to_base_units(dec("1.23456789"), 8).unwrap(), 123_456_789);
        assert_eq!(to_base_units(dec("1.999"), 2).unwrap(), 199);
        assert_eq!(to_base_units(dec("7"), 0).unwrap(), 7);
        assert_eq!(
            to_base_units(dec("2.5"), 24).unwrap(),
            2_500_000_000_000_000_000_000_000
        );
    }

    #[test]
    fn test_to_base_units_too_many_decimals() {
        let err = to_base_units(dec("1.5"), 40).unwrap_err();
        assert_eq!(err.current_context(), &Error::ArithmeticError);
        assert!(to_base_units(dec("1"), 40).is_err());
        assert!(decimal_string_to_u128("0.5", 39).is_err());
    }

    #[test]
    fn test_base_units_round_trip() {
        for (amount, decimals) in [
            ("1234.567891", 6),
            ("0.000001", 6),
            ("12.345678901234567891", 18),
            ("0.000000000000000001", 18),
            ("98765.4321", 8),
            ("0.00000001", 8),
        ] {
            let amount = dec(amount);
            let base = to_base_units(amount, decimals).unwrap();
            assert_eq!(from_base_units(base, decimals).unwrap(), amount);
        }
    }

    #[test]
    fn test_to_base_units_negative() {
        assert!(to_base_units(dec("-1"), 6).is_err());
        assert_eq!(to_base_units(Decimal::ZERO, 6).unwrap(), 0);
    }

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(1_500_000, 6).unwrap(), dec("1.5"));
        assert_eq!(
            from_base_units(12_500_000_000_000_000_000, 18).unwrap(),
            dec("12.5")
        );
        assert_eq!(from_base_units(0, 18).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_slippage_to_bps() {
        assert_eq!(slippage_to_bps(dec("1")).unwrap(), 100);
        assert_eq!(slippage_to_bps(dec("0.5")).unwrap(), 50);
        assert_eq!(slippage_to_bps(dec("0.015")).unwrap(), 1);
        assert_eq!(slippage_to_bps(dec("100")).unwrap(), 10_000);
        assert!(slippage_to_bps(dec("100.01")).is_err());
        assert!(slippage_to_bps(dec("-1")).is_err());
    }
}
