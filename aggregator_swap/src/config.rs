use std::{collections::HashMap, str::FromStr, time::Duration};

use alloy::primitives::{Address, address};
use error_stack::{ResultExt as _, report};
use rust_decimal::Decimal;
use swap_models::{constants::chains::ChainId, network::RateLimitWindow};

use crate::error::{AggregatorResult, Error};

pub const BRLA_POLYGON_ADDRESS: Address = address!("e6a537a407488807f0bbeb0038b79004f19dddfb");
pub const USDC_POLYGON_ADDRESS: Address = address!("2791bca1f2de4661ed88a30c99a7a9449aa84174");

pub const DEFAULT_THRESHOLD_USD: Decimal = Decimal::ONE_HUNDRED;
pub const DEFAULT_ZERO_X_API_URL: &str = "https://api.0x.org";
pub const DEFAULT_ZERO_X_API_VERSION: &str = "v2";
pub const DEFAULT_ONE_INCH_API_URL: &str = "https://api.1inch.dev/swap/v6.0";
pub const DEFAULT_ONE_INCH_RATE_LIMIT: &str = "1s";
pub const DEFAULT_POLYGON_RPC_URL: &str = "https://polygon-rpc.com";
pub const DEFAULT_APPROVAL_RECHECK_DELAY: Duration = Duration::from_secs(2);

/// Where a token's USD price comes from
#[derive(Debug, Clone, PartialEq)]
pub enum PriceSource {
    /// Fixed USD price, e.g. a dollar stablecoin
    Pegged { usd: Decimal },
    /// CoinGecko id, then the fiat rate of `fiat_currency` if set, then `fallback_usd`
    CoinGecko {
        id: String,
        fiat_currency: Option<String>,
        fallback_usd: Option<Decimal>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenConfig {
    pub symbol: String,
    pub address: Address,
    pub decimals: u8,
    pub price_source: PriceSource,
}

/// Tokens the engine is allowed to trade, keyed by address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenRegistry {
    tokens: HashMap<Address, TokenConfig>,
}

impl TokenRegistry {
    pub fn new(tokens: impl IntoIterator<Item = TokenConfig>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(|token| (token.address, token))
                .collect(),
        }
    }

    pub fn get(&self, address: &Address) -> AggregatorResult<&TokenConfig> {
        self.tokens.get(address).ok_or_else(|| {
            report!(Error::ConfigurationError(format!(
                "Token {address} is not configured"
            )))
        })
    }

    pub fn by_symbol(&self, symbol: &str) -> AggregatorResult<&TokenConfig> {
        self.tokens
            .values()
            .find(|token| token.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| {
                report!(Error::ConfigurationError(format!(
                    "Token {symbol} is not configured"
                )))
            })
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.tokens.contains_key(address)
    }

    /// BRLA / USDC on Polygon
    pub fn polygon_defaults(brla: Address, usdc: Address) -> Self {
        Self::new([
            TokenConfig {
                symbol: "BRLA".to_string(),
                address: brla,
                decimals: 18,
                price_source: PriceSource::CoinGecko {
                    id: "brazilian-real".to_string(),
                    fiat_currency: Some("BRL".to_string()),
                    fallback_usd: Some(Decimal::new(20, 2)),
                },
            },
            TokenConfig {
                symbol: "USDC".to_string(),
                address: usdc,
                decimals: 6,
                price_source: PriceSource::Pegged { usd: Decimal::ONE },
            },
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZeroXConfig {
    pub base_url: String,
    pub api_key: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OneInchConfig {
    pub base_url: String,
    pub api_key: String,
    pub rate_limit: RateLimitWindow,
}

#[derive(Clone)]
pub struct SwapConfig {
    pub chain_id: ChainId,
    pub rpc_url: String,
    private_key: String,
    pub tokens: TokenRegistry,
    pub threshold_usd: Decimal,
    pub zero_x: ZeroXConfig,
    pub one_inch: OneInchConfig,
    pub explorer_tx_url: Option<String>,
    pub approval_recheck_delay: Duration,
    pub json_logs: bool,
}

impl std::fmt::Debug for SwapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwapConfig")
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &"<redacted>")
            .field("tokens", &self.tokens)
            .field("threshold_usd", &self.threshold_usd)
            .field("zero_x_base_url", &self.zero_x.base_url)
            .field("one_inch_base_url", &self.one_inch.base_url)
            .field("explorer_tx_url", &self.explorer_tx_url)
            .field("approval_recheck_delay", &self.approval_recheck_delay)
            .finish()
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn required_env_var(key: &str) -> AggregatorResult<String> {
    env_var(key).ok_or_else(|| {
        report!(Error::ConfigurationError(format!(
            "{key} environment variable is not set"
        )))
    })
}

fn parse_env<T: FromStr>(key: &str, default: T) -> AggregatorResult<T> {
    match env_var(key) {
        Some(value) => value.parse().map_err(|_| {
            report!(Error::ConfigurationError(format!(
                "{key} has an invalid value: {value}"
            )))
        }),
        None => Ok(default),
    }
}

impl SwapConfig {
    /// Reads `.env` (if any) and the process environment
    pub fn from_env() -> AggregatorResult<Self> {
        dotenv::dotenv().ok();

        let chain_id = match env_var("CHAIN_ID") {
            Some(chain) => ChainId::try_from(chain.as_str())
                .change_context(Error::ConfigurationError(format!("Unknown chain {chain}")))?,
            None => ChainId::Polygon,
        };

        let brla = parse_env("BRLA_TOKEN_ADDRESS", BRLA_POLYGON_ADDRESS)?;
        let usdc = parse_env("USDC_TOKEN_ADDRESS", USDC_POLYGON_ADDRESS)?;

        let rate_limit_str =
            env_var("ONE_INCH_RATE_LIMIT").unwrap_or(DEFAULT_ONE_INCH_RATE_LIMIT.to_string());
        let rate_limit = RateLimitWindow::from_string(&rate_limit_str).ok_or_else(|| {
            report!(Error::ConfigurationError(format!(
                "ONE_INCH_RATE_LIMIT has an invalid value: {rate_limit_str}"
            )))
        })?;

        let explorer_tx_url = env_var("EXPLORER_TX_URL").or_else(|| default_explorer(chain_id));

        Ok(Self {
            chain_id,
            rpc_url: env_var("RPC_URL").unwrap_or(DEFAULT_POLYGON_RPC_URL.to_string()),
            private_key: required_env_var("PRIVATE_KEY")?,
            tokens: TokenRegistry::polygon_defaults(brla, usdc),
            threshold_usd: parse_env("THRESHOLD_USD", DEFAULT_THRESHOLD_USD)?,
            zero_x: ZeroXConfig {
                base_url: env_var("ZERO_X_API_URL").unwrap_or(DEFAULT_ZERO_X_API_URL.to_string()),
                api_key: required_env_var("ZERO_X_API_KEY")?,
                version: env_var("ZERO_X_API_VERSION")
                    .unwrap_or(DEFAULT_ZERO_X_API_VERSION.to_string()),
            },
            one_inch: OneInchConfig {
                base_url: env_var("ONE_INCH_API_URL")
                    .unwrap_or(DEFAULT_ONE_INCH_API_URL.to_string()),
                api_key: required_env_var("ONE_INCH_API_KEY")?,
                rate_limit,
            },
            explorer_tx_url,
            approval_recheck_delay: Duration::from_secs(parse_env(
                "APPROVAL_RECHECK_DELAY_SECS",
                DEFAULT_APPROVAL_RECHECK_DELAY.as_secs(),
            )?),
            json_logs: parse_env("LOG_JSON", false)?,
        })
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    /// USD value assumed when the price oracle fails. It sits above the
    /// threshold so the permit based provider gets picked.
    pub fn fallback_usd_value(&self) -> Decimal {
        self.threshold_usd + Decimal::ONE
    }
}

pub fn default_explorer(chain_id: ChainId) -> Option<String> {
    let base = match chain_id {
        ChainId::Ethereum => "https://etherscan.io/tx/",
        ChainId::Optimism => "https://optimistic.etherscan.io/tx/",
        ChainId::Bsc => "https://bscscan.com/tx/",
        ChainId::Polygon => "https://polygonscan.com/tx/",
        ChainId::Base => "https://basescan.org/tx/",
        ChainId::ArbitrumOne => "https://arbiscan.io/tx/",
        ChainId::Monad | ChainId::HyperEVM => return None,
    };
    Some(base.to_string())
}
