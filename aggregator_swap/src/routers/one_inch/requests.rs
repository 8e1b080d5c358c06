use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneInchGetQuoteRequest {
    pub chain: u32,
    pub src: Address,
    pub dst: Address,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchSwapRequest {
    pub chain: u32,
    /// contract address of a token to sell
    pub src: Address,
    /// contract address of a token to buy
    pub dst: Address,
    /// amount of a token to sell, set in minimal divisible units
    pub amount: String,
    /// address of a seller, make sure that this address has approved to spend src
    /// in needed amount
    pub from: Address,
    /// The EOA address which initiates the transaction (for compliance KYC/AML)
    pub origin: Address,
    /// Slippage tolerance in percent. Min: 0; Max: 50.
    pub slippage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchApproveRequest {
    pub chain: u32,
    pub token_address: Address,
    /// Omitted amount means unlimited on the 1inch side, we send it explicitly
    pub amount: String,
}
