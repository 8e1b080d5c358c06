use alloy::primitives::Address;
use rust_decimal::Decimal;

use crate::error::AggregatorResult;

pub mod coingecko;
pub mod exchange_rate;
pub mod oracle;

pub use oracle::{ConfiguredPriceOracle, HttpPriceFeed};

/// USD valuation of a human readable token amount
#[async_trait::async_trait]
pub trait PriceOracle: Send + Sync {
    async fn usd_value(&self, token: Address, amount: Decimal) -> AggregatorResult<Decimal>;
}

/// Remote unit prices in USD
#[async_trait::async_trait]
pub trait PriceFeed: Send + Sync {
    /// USD price of one coin, by CoinGecko id
    async fn coin_usd_price(&self, coin_id: &str) -> AggregatorResult<Decimal>;

    /// USD value of one unit of a fiat currency, e.g. `BRL`
    async fn fiat_usd_rate(&self, currency: &str) -> AggregatorResult<Decimal>;
}
