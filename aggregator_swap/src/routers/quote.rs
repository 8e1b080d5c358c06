use alloy::primitives::{Address, Bytes, U256};

use crate::routers::{
    ProviderKind, one_inch::responses::OneInchQuoteResponse,
    zero_x::responses::ZeroXQuoteResponse,
};

/// Untouched upstream answer, kept to rebuild the swap exactly as quoted
#[derive(Debug, Clone)]
pub enum ProviderQuote {
    ZeroX(Box<ZeroXQuoteResponse>),
    OneInch(Box<OneInchQuoteResponse>),
}

impl ProviderQuote {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderQuote::ZeroX(_) => ProviderKind::ZeroX,
            ProviderQuote::OneInch(_) => ProviderKind::OneInch,
        }
    }
}

/// Transaction handed out together with a quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedTransaction {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolFee {
    pub token: Option<Address>,
    pub amount: u128,
}

/// Provider agnostic view of a quote. Amounts are in base units.
#[derive(Debug, Clone)]
pub struct Quote {
    pub sell_token: Address,
    pub buy_token: Address,
    pub sell_amount: u128,
    pub buy_amount: u128,
    pub min_buy_amount: Option<u128>,
    pub gas_estimate: u64,
    /// Set when the provider fixes the gas price
    pub gas_price: Option<u128>,
    pub requires_approval: bool,
    /// Spender the provider asked to approve, overrides the default one
    pub approval_spender: Option<Address>,
    /// EIP-712 typed data to sign before submitting
    pub permit: Option<serde_json::Value>,
    pub transaction: Option<QuotedTransaction>,
    pub sources: Vec<String>,
    pub protocol_fee: Option<ProtocolFee>,
    pub raw: ProviderQuote,
}

impl Quote {
    pub fn provider(&self) -> ProviderKind {
        self.raw.kind()
    }
}
