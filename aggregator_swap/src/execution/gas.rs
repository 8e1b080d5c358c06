use error_stack::ResultExt as _;

use crate::{
    error::{AggregatorResult, Error},
    utils::uint::mul_div,
};

pub const BPS_DENOMINATOR: u128 = 10_000;
/// +30 %
pub const APPROVAL_GAS_BUFFER_BPS: u128 = 13_000;
/// +20 %
pub const SWAP_GAS_BUFFER_BPS: u128 = 12_000;
/// +10 % over the network price
pub const GAS_PRICE_PREMIUM_BPS: u128 = 11_000;
/// Approval gas limit used when estimation fails, before buffering
pub const FALLBACK_APPROVAL_GAS: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasStep {
    Approval,
    Swap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPriceSource {
    /// Price fixed by the quote, never adjusted
    Quoted(u128),
    /// Price freshly read from the network
    Network(u128),
}

/// Buffers applied to gas estimates and prices. All math is integer and floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPolicy {
    pub approval_buffer_bps: u128,
    pub swap_buffer_bps: u128,
    pub price_premium_bps: u128,
    pub fallback_approval_gas: u64,
}

impl Default for GasPolicy {
    fn default() -> Self {
        Self {
            approval_buffer_bps: APPROVAL_GAS_BUFFER_BPS,
            swap_buffer_bps: SWAP_GAS_BUFFER_BPS,
            price_premium_bps: GAS_PRICE_PREMIUM_BPS,
            fallback_approval_gas: FALLBACK_APPROVAL_GAS,
        }
    }
}

impl GasPolicy {
    /// `floor(estimate * buffer)`
    pub fn buffered_limit(&self, estimate: u64, step: GasStep) -> AggregatorResult<u64> {
        let buffer_bps = match step {
            GasStep::Approval => self.approval_buffer_bps,
            GasStep::Swap => self.swap_buffer_bps,
        };
        let limit = mul_div(estimate as u128, buffer_bps, BPS_DENOMINATOR)?;
        u64::try_from(limit)
            .change_context(Error::ArithmeticError)
            .attach_printable_lazy(|| format!("Gas limit {limit} does not fit u64"))
    }

    pub fn gas_price(&self, source: GasPriceSource) -> AggregatorResult<u128> {
        match source {
            GasPriceSource::Quoted(price) => Ok(price),
            GasPriceSource::Network(price) => {
                mul_div(price, self.price_premium_bps, BPS_DENOMINATOR)
            }
        }
    }

    /// Approval limit when the estimate may be missing
    pub fn approval_limit(&self, estimate: Option<u64>) -> AggregatorResult<u64> {
        self.buffered_limit(
            estimate.unwrap_or(self.fallback_approval_gas),
            GasStep::Approval,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffered_limit_floors() {
        let policy = GasPolicy::default();
        for estimate in [0u64, 1, 7, 21_000, 21_001, 46_109, 250_000, 999_999] {
            assert_eq!(
                policy.buffered_limit(estimate, GasStep::Approval).unwrap(),
                estimate * 13 / 10
            );
            assert_eq!(
                policy.buffered_limit(estimate, GasStep::Swap).unwrap(),
                estimate * 12 / 10
            );
        }
    }

    #[test]
    fn test_buffered_limit_large_estimate() {
        let policy = GasPolicy::default();
        assert!(policy.buffered_limit(u64::MAX, GasStep::Swap).is_err());
        assert_eq!(
            policy.buffered_limit(u64::MAX / 2, GasStep::Swap).unwrap(),
            ((u64::MAX / 2) as u128 * 12 / 10) as u64
        );
    }

    #[test]
    fn test_gas_price() {
        let policy = GasPolicy::default();
        assert_eq!(
            policy
                .gas_price(GasPriceSource::Network(30_000_000_000))
                .unwrap(),
            33_000_000_000
        );
        assert_eq!(policy.gas_price(GasPriceSource::Network(19)).unwrap(), 20);
        assert_eq!(
            policy
                .gas_price(GasPriceSource::Quoted(30_000_000_001))
                .unwrap(),
            30_000_000_001
        );
    }

    #[test]
    fn test_approval_limit_fallback() {
        let policy = GasPolicy::default();
        assert_eq!(policy.approval_limit(None).unwrap(), 130_000);
        assert_eq!(policy.approval_limit(Some(50_000)).unwrap(), 65_000);
    }
}
