use std::collections::HashMap;

use alloy::primitives::{Address, address};
use error_stack::report;
use lazy_static::lazy_static;
use swap_models::constants::chains::ChainId;

use crate::error::{AggregatorResult, Error};

/// Uniswap Permit2, same address on every EVM chain
pub const PERMIT2_ADDRESS: Address = address!("000000000022D473030F116dDEE9F6B43aC78BA3");

// https://portal.1inch.dev/documentation/contracts/aggregation-protocol/aggregation-introduction
pub const ONE_INCH_V6_ROUTER: Address = address!("111111125421cA6dc452d289314280a0f8842A65");

/// 1inch rejects slippage above 50 %
pub const ONE_INCH_MAX_SLIPPAGE_PERCENT: u32 = 50;

/// Gas assumed for a swap when the quote carries no estimate
pub const DEFAULT_SWAP_GAS: u64 = 250_000;

lazy_static! {
    static ref ONE_INCH_ROUTERS: HashMap<ChainId, Address> = HashMap::from([
        (ChainId::Ethereum, ONE_INCH_V6_ROUTER),
        (ChainId::Optimism, ONE_INCH_V6_ROUTER),
        (ChainId::Bsc, ONE_INCH_V6_ROUTER),
        (ChainId::Polygon, ONE_INCH_V6_ROUTER),
        (ChainId::Base, ONE_INCH_V6_ROUTER),
        (ChainId::ArbitrumOne, ONE_INCH_V6_ROUTER),
    ]);
}

pub fn one_inch_router(chain_id: ChainId) -> AggregatorResult<Address> {
    ONE_INCH_ROUTERS.get(&chain_id).copied().ok_or_else(|| {
        report!(Error::ConfigurationError(format!(
            "1inch router is not deployed on {chain_id}"
        )))
    })
}
