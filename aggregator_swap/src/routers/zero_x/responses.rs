use alloy::primitives::{Address, Bytes, U256};
use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// `GET /swap/permit2/quote`
#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXQuoteResponse {
    pub buy_token: Address,
    pub sell_token: Address,
    #[serde_as(as = "DisplayFromStr")]
    pub buy_amount: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub sell_amount: u128,
    #[serde_as(as = "DisplayFromStr")]
    pub min_buy_amount: u128,
    pub allowance_target: Option<Address>,
    pub transaction: ZeroXTransaction,
    pub route: Option<ZeroXRoute>,
    pub fees: Option<ZeroXFees>,
    pub issues: Option<ZeroXIssues>,
    pub permit2: Option<ZeroXPermit2>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXTransaction {
    pub to: Address,
    pub data: Bytes,
    #[serde_as(as = "DisplayFromStr")]
    pub value: U256,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub gas: Option<u64>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub gas_price: Option<u128>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroXRoute {
    #[serde(default)]
    pub fills: Vec<ZeroXFill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroXFill {
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroXFees {
    pub zero_ex_fee: Option<ZeroXFee>,
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct ZeroXFee {
    pub token: Option<Address>,
    #[serde_as(as = "DisplayFromStr")]
    pub amount: u128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroXIssues {
    pub allowance: Option<ZeroXAllowanceIssue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroXAllowanceIssue {
    pub actual: Option<String>,
    pub spender: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZeroXPermit2 {
    pub eip712: Option<serde_json::Value>,
    pub hash: Option<String>,
}
