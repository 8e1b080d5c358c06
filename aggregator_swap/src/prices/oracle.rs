use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use alloy::primitives::Address;
use dashmap::DashMap;
use error_stack::report;
use rust_decimal::Decimal;
use swap_models::network::client_rate_limit::Client;
use tracing::{debug, info, warn};

use crate::{
    config::{PriceSource, TokenRegistry},
    error::{AggregatorResult, Error},
    prices::{
        PriceFeed, PriceOracle,
        coingecko::{
            COINGECKO_API_URL,
            pricing::{coin_usd_price, coingecko_get_simple_price},
        },
        exchange_rate::{
            EXCHANGE_RATE_API_URL,
            pricing::{currency_usd_rate, exchange_rate_get_latest_usd},
        },
    },
};

pub const PRICE_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// A fiat backed token is assumed to trade 5 % below its currency
pub const FIAT_PEG_DISCOUNT: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

#[derive(Debug, Clone)]
pub struct HttpPriceFeed {
    client: Client,
    coingecko_url: String,
    exchange_rate_url: String,
}

impl HttpPriceFeed {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            coingecko_url: COINGECKO_API_URL.to_string(),
            exchange_rate_url: EXCHANGE_RATE_API_URL.to_string(),
        }
    }
}

impl Default for HttpPriceFeed {
    fn default() -> Self {
        Self::new(Client::default())
    }
}

#[async_trait::async_trait]
impl PriceFeed for HttpPriceFeed {
    async fn coin_usd_price(&self, coin_id: &str) -> AggregatorResult<Decimal> {
        let response = coingecko_get_simple_price(&self.client, &self.coingecko_url, coin_id).await?;
        coin_usd_price(&response, coin_id)
    }

    async fn fiat_usd_rate(&self, currency: &str) -> AggregatorResult<Decimal> {
        let response = exchange_rate_get_latest_usd(&self.client, &self.exchange_rate_url).await?;
        currency_usd_rate(&response, currency)
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedPrice {
    usd: Decimal,
    fetched_at: Instant,
}

/// Prices each configured token from its [`PriceSource`]. Remote unit prices
/// are cached per token for [`PRICE_CACHE_TTL`].
pub struct ConfiguredPriceOracle {
    tokens: Arc<TokenRegistry>,
    feed: Arc<dyn PriceFeed>,
    cache: DashMap<Address, CachedPrice>,
    ttl: Duration,
}

impl ConfiguredPriceOracle {
    pub fn new(tokens: Arc<TokenRegistry>, feed: Arc<dyn PriceFeed>) -> Self {
        Self {
            tokens,
            feed,
            cache: DashMap::new(),
            ttl: PRICE_CACHE_TTL,
        }
    }

    pub fn with_ttl(self, ttl: Duration) -> Self {
        Self { ttl, ..self }
    }

    fn cached(&self, token: &Address) -> Option<Decimal> {
        let entry = self.cache.get(token)?;
        (entry.fetched_at.elapsed() < self.ttl).then_some(entry.usd)
    }

    async fn unit_price(&self, token: Address) -> AggregatorResult<Decimal> {
        let config = self.tokens.get(&token)?;

        let (coin_id, fiat_currency, fallback_usd) = match &config.price_source {
            PriceSource::Pegged { usd } => return Ok(*usd),
            PriceSource::CoinGecko {
                id,
                fiat_currency,
                fallback_usd,
            } => (id, fiat_currency, fallback_usd),
        };

        if let Some(usd) = self.cached(&token) {
            debug!("Cached {} price: {usd} USD", config.symbol);
            return Ok(usd);
        }

        let usd = match self.feed.coin_usd_price(coin_id).await {
            Ok(usd) => Some(usd),
            Err(report) => {
                warn!("CoinGecko price for {coin_id} unavailable: {report:?}");
                None
            }
        };

        let usd = match (usd, fiat_currency) {
            (Some(usd), _) => Some(usd),
            (None, Some(currency)) => match self.feed.fiat_usd_rate(currency).await {
                Ok(rate) => Some(rate * FIAT_PEG_DISCOUNT),
                Err(report) => {
                    warn!("{currency} exchange rate unavailable: {report:?}");
                    None
                }
            },
            (None, None) => None,
        };

        let usd = usd.or(*fallback_usd).ok_or_else(|| {
            report!(Error::PriceOracleError(format!(
                "No price available for {}",
                config.symbol
            )))
        })?;

        info!("{} price: {usd} USD", config.symbol);
        self.cache.insert(
            token,
            CachedPrice {
                usd,
                fetched_at: Instant::now(),
            },
        );
        Ok(usd)
    }
}

#[async_trait::async_trait]
impl PriceOracle for ConfiguredPriceOracle {
    async fn usd_value(&self, token: Address, amount: Decimal) -> AggregatorResult<Decimal> {
        let unit_price = self.unit_price(token).await?;
        amount
            .checked_mul(unit_price)
            .ok_or_else(|| report!(Error::ArithmeticError))
    }
}
