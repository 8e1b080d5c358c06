use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Snapshot of an ERC-20 allowance compared with what a trade needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceState {
    /// Allowance currently granted to the spender (base units)
    pub current: U256,
    /// Amount the trade will pull (base units)
    pub required: U256,
}

impl AllowanceState {
    pub fn new(current: U256, required: u128) -> Self {
        Self {
            current,
            required: U256::from(required),
        }
    }

    pub fn needs_approval(&self) -> bool {
        self.current < self.required
    }
}
