use alloy_primitives::{Address, TxHash};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::chains::ChainId;

/// What the wallet holder asked for. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapIntent {
    /// Token IN address
    pub sell_token: Address,
    /// Token OUT address
    pub buy_token: Address,
    /// Human readable amount IN, e.g. `12.5`
    pub amount: Decimal,
    /// Wallet that holds the tokens and signs every transaction
    pub wallet: Address,
    pub chain_id: ChainId,
    /// Slippage tolerance in percent
    pub slippage_percent: Decimal,
}

impl SwapIntent {
    pub const DEFAULT_SLIPPAGE_PERCENT: Decimal = Decimal::ONE;

    pub fn new(
        sell_token: Address,
        buy_token: Address,
        amount: Decimal,
        wallet: Address,
        chain_id: ChainId,
    ) -> Self {
        Self {
            sell_token,
            buy_token,
            amount,
            wallet,
            chain_id,
            slippage_percent: Self::DEFAULT_SLIPPAGE_PERCENT,
        }
    }

    pub fn with_slippage(self, slippage_percent: Decimal) -> Self {
        Self {
            slippage_percent,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    pub success: bool,
    pub tx_hash: TxHash,
    /// Human readable amount IN
    pub sell_amount: Decimal,
    /// Human readable amount OUT as quoted
    pub buy_amount: Decimal,
    pub gas_used: u64,
    pub error: Option<String>,
    pub explorer_url: Option<String>,
}
