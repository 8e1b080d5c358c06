use crate::error::{AggregatorResult, Error};
use error_stack::report;
use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

/// Computes `floor((value * multiplier) / divisor)` in 256-bit space
pub fn mul_div(value: u128, multiplier: u128, divisor: u128) -> AggregatorResult<u128> {
    let value = U256::from(value);
    let multiplier = U256::from(multiplier);
    let divisor = U256::from(divisor);
    if divisor.is_zero() {
        return Err(report!(Error::ArithmeticError).attach_printable("Dividing by zero"));
    }
    let result = value * multiplier / divisor;

    if result.bits() > 128 {
        return Err(
            report!(Error::ArithmeticError).attach_printable("Result too large to fit in u128")
        );
    }

    Ok(result.as_u128())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_muldiv() {
        let a = 100_000_000_000_000_000_000_000_000u128;
        let b = 300_000_000_000_000_000_000_000_000u128;
        let c = 200_000_000_000_000_000_000_000_000u128;

        let res = mul_div(a, b, c);
        assert!(res.is_ok());
        let res = res.unwrap();
        assert_eq!(res, 150_000_000_000_000_000_000_000_000u128);
    }

    #[test]
    fn test_muldiv_floors() {
        assert_eq!(mul_div(21_001, 13_000, 10_000).unwrap(), 27_301);
        assert_eq!(mul_div(1, 12_000, 10_000).unwrap(), 1);
        assert_eq!(mul_div(9, 11_000, 10_000).unwrap(), 9);
    }

    #[test]
    fn test_muldiv_errors() {
        assert!(mul_div(1, 1, 0).is_err());
        assert!(mul_div(u128::MAX, 2, 1).is_err());
    }
}
