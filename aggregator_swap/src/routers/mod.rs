pub mod constants;
pub mod one_inch;
pub mod quote;
pub mod selector;
pub mod zero_x;

use std::fmt;

use alloy::primitives::Address;
use error_stack::Report;
use serde::{Deserialize, Serialize};
use swap_models::{
    constants::chains::ChainId,
    error::Error as ModelsError,
    models::{SwapIntent, SwapResult, TransactionRequest},
};

use crate::{
    error::{AggregatorResult, Error},
    routers::quote::Quote,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Classic ERC-20 allowance to the aggregation router
    OneInch,
    /// Permit2 signature appended to the settler calldata
    ZeroX,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderKind::OneInch => write!(f, "1inch"),
            ProviderKind::ZeroX => write!(f, "0x"),
        }
    }
}

/// Inputs for an allowance check and for building the approval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalCheck {
    pub token: Address,
    pub owner: Address,
    /// Base units the trade will pull
    pub amount: u128,
    pub chain_id: ChainId,
    /// Spender requested by the quote, if any
    pub spender: Option<Address>,
}

impl ApprovalCheck {
    pub fn for_quote(intent: &SwapIntent, quote: &Quote) -> Self {
        Self {
            token: intent.sell_token,
            owner: intent.wallet,
            amount: quote.sell_amount,
            chain_id: intent.chain_id,
            spender: quote.approval_spender,
        }
    }
}

/// One swap aggregator protocol. Callers never learn which one answered.
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn get_quote(&self, intent: &SwapIntent) -> AggregatorResult<Quote>;

    /// Reads the on-chain allowance of the provider's spender
    async fn needs_approval(&self, check: &ApprovalCheck) -> AggregatorResult<bool>;

    /// Builds the approval transaction without submitting it
    async fn get_approval_data(&self, check: &ApprovalCheck)
    -> AggregatorResult<TransactionRequest>;

    /// Submits the swap once and waits for its receipt. A reverted swap is an
    /// unsuccessful result, not an error.
    async fn execute_swap(&self, intent: &SwapIntent, quote: &Quote)
    -> AggregatorResult<SwapResult>;
}

/// Keeps the upstream status and body of a failed aggregator call
pub(crate) fn upstream_error(provider: ProviderKind, report: Report<ModelsError>) -> Report<Error> {
    let context = match report.current_context() {
        ModelsError::HttpStatus { status, body } => Error::QuoteProviderError {
            provider: provider.to_string(),
            status: *status,
            body: body.clone(),
        },
        _ => Error::ModelsError,
    };
    report.change_context(context)
}

/// Unique source names in first-seen order
pub(crate) fn dedup_sources(sources: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for source in sources {
        if !source.is_empty() && !unique.contains(&source) {
            unique.push(source);
        }
    }
    unique
}
