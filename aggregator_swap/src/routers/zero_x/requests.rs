use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXGetQuoteRequest {
    pub chain_id: u32,
    pub buy_token: Address,
    pub sell_token: Address,
    pub sell_amount: String,
    pub taker: Address,
    pub slippage_bps: u32, // integer [ 0 .. 10000 ]
}
