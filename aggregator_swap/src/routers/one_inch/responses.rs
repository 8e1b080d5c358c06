use alloy::primitives::{Address, Bytes, U256};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// `GET /quote`. Older API versions use `toAmount` / `fromAmount` /
/// `estimatedGas`, newer ones `dstAmount` / `srcAmount` / `gas`.
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchQuoteResponse {
    #[serde(alias = "toAmount")]
    #[serde_as(as = "DisplayFromStr")]
    pub dst_amount: u128,
    #[serde(alias = "fromAmount")]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub src_amount: Option<u128>,
    #[serde(alias = "estimatedGas")]
    pub gas: Option<u64>,
    /// Nested route description, each leaf carries a `name`
    pub protocols: Option<serde_json::Value>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchSwapResponse {
    #[serde(alias = "toAmount")]
    #[serde_as(as = "DisplayFromStr")]
    pub dst_amount: u128,
    pub tx: OneInchTx,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchTx {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    #[serde_as(as = "DisplayFromStr")]
    pub value: U256,
    pub gas: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub gas_price: u128,
}

/// `GET /approve/transaction`
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneInchApproveTransactionResponse {
    pub to: Address,
    pub data: Bytes,
    #[serde_as(as = "DisplayFromStr")]
    pub value: U256,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub gas_price: Option<u128>,
}
