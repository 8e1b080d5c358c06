use std::sync::Arc;

use alloy::primitives::{Address, U256};
use error_stack::{ResultExt as _, report};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use swap_models::{
    constants::chains::ChainId,
    models::{AllowanceState, SwapIntent, SwapResult, TransactionRequest},
    network::{
        client_rate_limit::Client,
        http::{handle_reqwest_response, value_to_sorted_querystring},
    },
};
use tracing::info;

use crate::{
    config::{OneInchConfig, TokenRegistry},
    error::{AggregatorResult, Error},
    execution::executor::TransactionExecutor,
    routers::{
        ApprovalCheck, ProviderKind, QuoteProvider,
        constants::{DEFAULT_SWAP_GAS, ONE_INCH_MAX_SLIPPAGE_PERCENT, one_inch_router},
        dedup_sources,
        one_inch::{
            requests::{OneInchApproveRequest, OneInchGetQuoteRequest, OneInchSwapRequest},
            responses::{
                OneInchApproveTransactionResponse, OneInchQuoteResponse, OneInchSwapResponse,
            },
        },
        quote::{ProviderQuote, Quote},
        upstream_error,
    },
    utils::number_conversion::{from_base_units, to_base_units},
};

async fn one_inch_get<T: DeserializeOwned>(
    client: &Client,
    config: &OneInchConfig,
    chain: u32,
    path: &str,
    query: Value,
) -> AggregatorResult<T> {
    let query_string = value_to_sorted_querystring(&query).change_context(Error::ParseError)?;
    let url = format!(
        "{}/{chain}/{path}?{query_string}",
        config.base_url.trim_end_matches('/')
    );

    let request = client
        .inner_client()
        .get(&url)
        .bearer_auth(&config.api_key)
        .build()
        .change_context(Error::ReqwestError)
        .attach_printable("Error building 1inch request")?;

    // The rate limited client waits for a permit here
    let response = client
        .execute(request)
        .await
        .change_context(Error::ReqwestError)
        .attach_printable("Error in 1inch request")?;

    handle_reqwest_response(response)
        .await
        .map_err(|report| upstream_error(ProviderKind::OneInch, report))
}

pub async fn one_inch_get_quote(
    client: &Client,
    config: &OneInchConfig,
    request: OneInchGetQuoteRequest,
) -> AggregatorResult<OneInchQuoteResponse> {
    let query = json!({
        "src": request.src,
        "dst": request.dst,
        "amount": request.amount,
        "includeGas": true,
        "includeProtocols": true,
    });

    one_inch_get(client, config, request.chain, "quote", query).await
}

pub async fn one_inch_swap(
    client: &Client,
    config: &OneInchConfig,
    request: OneInchSwapRequest,
) -> AggregatorResult<OneInchSwapResponse> {
    let query = json!({
        "src": request.src,
        "dst": request.dst,
        "amount": request.amount,
        "from": request.from,
        "origin": request.origin,
        "slippage": request.slippage,
    });

    one_inch_get(client, config, request.chain, "swap", query).await
}

pub async fn one_inch_approve_transaction(
    client: &Client,
    config: &OneInchConfig,
    request: OneInchApproveRequest,
) -> AggregatorResult<OneInchApproveTransactionResponse> {
    let query = json!({
        "tokenAddress": request.token_address,
        "amount": request.amount,
    });

    one_inch_get(client, config, request.chain, "approve/transaction", query).await
}

/// Leaf `name`s of the nested `protocols` route, deduplicated
fn protocol_names(protocols: &Value) -> Vec<String> {
    fn collect(value: &Value, names: &mut Vec<String>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| collect(item, names)),
            Value::Object(object) => {
                if let Some(Value::String(name)) = object.get("name") {
                    names.push(name.clone());
                }
            }
            _ => {}
        }
    }

    let mut names = Vec::new();
    collect(protocols, &mut names);
    dedup_sources(names)
}

/// Maps a `/quote` answer onto [`Quote`]. 1inch does not echo the tokens,
/// they come from the request.
pub fn normalize_one_inch_quote(
    sell_token: Address,
    buy_token: Address,
    requested_sell_amount: u128,
    response: OneInchQuoteResponse,
) -> Quote {
    let mut sources = response
        .protocols
        .as_ref()
        .map(protocol_names)
        .unwrap_or_default();
    if sources.is_empty() {
        sources.push("1inch".to_string());
    }

    Quote {
        sell_token,
        buy_token,
        sell_amount: response.src_amount.unwrap_or(requested_sell_amount),
        buy_amount: response.dst_amount,
        min_buy_amount: None,
        gas_estimate: response.gas.unwrap_or(DEFAULT_SWAP_GAS),
        // Priced at execution time from the network
        gas_price: None,
        // Decided by the on-chain allowance check
        requires_approval: true,
        approval_spender: None,
        permit: None,
        transaction: None,
        sources,
        protocol_fee: None,
        raw: ProviderQuote::OneInch(Box::new(response)),
    }
}

/// 1inch caps slippage at 50 %
pub fn one_inch_slippage(slippage_percent: Decimal) -> String {
    slippage_percent
        .min(Decimal::from(ONE_INCH_MAX_SLIPPAGE_PERCENT))
        .max(Decimal::ZERO)
        .normalize()
        .to_string()
}

/// Classic allowance flow: the wallet approves the aggregation router, the
/// swap transaction is built by the `/swap` endpoint at execution time.
pub struct OneInchProvider {
    client: Client,
    config: OneInchConfig,
    tokens: Arc<TokenRegistry>,
    executor: Arc<TransactionExecutor>,
}

impl OneInchProvider {
    pub fn new(
        client: Client,
        config: OneInchConfig,
        tokens: Arc<TokenRegistry>,
        executor: Arc<TransactionExecutor>,
    ) -> Self {
        Self {
            client,
            config,
            tokens,
            executor,
        }
    }

    pub fn spender(chain_id: ChainId) -> AggregatorResult<Address> {
        one_inch_router(chain_id)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for OneInchProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OneInch
    }

    async fn get_quote(&self, intent: &SwapIntent) -> AggregatorResult<Quote> {
        let sell_token = self.tokens.get(&intent.sell_token)?;
        self.tokens.get(&intent.buy_token)?;

        let sell_amount = to_base_units(intent.amount, sell_token.decimals)?;
        let request = OneInchGetQuoteRequest {
            chain: intent.chain_id as u32,
            src: intent.sell_token,
            dst: intent.buy_token,
            amount: sell_amount.to_string(),
        };

        let response = one_inch_get_quote(&self.client, &self.config, request).await?;
        let quote =
            normalize_one_inch_quote(intent.sell_token, intent.buy_token, sell_amount, response);

        info!(
            "1inch quote: {} -> {}, gas {}, sources {:?}",
            quote.sell_amount, quote.buy_amount, quote.gas_estimate, quote.sources
        );
        Ok(quote)
    }

    async fn needs_approval(&self, check: &ApprovalCheck) -> AggregatorResult<bool> {
        let spender = match check.spender {
            Some(spender) => spender,
            None => Self::spender(check.chain_id)?,
        };
        let current = self
            .executor
            .chain()
            .allowance(check.token, check.owner, spender)
            .await?;
        let state = AllowanceState::new(current, check.amount);
        info!(
            "1inch router allowance: {} (required {})",
            state.current, state.required
        );
        Ok(state.needs_approval())
    }

    async fn get_approval_data(
        &self,
        check: &ApprovalCheck,
    ) -> AggregatorResult<TransactionRequest> {
        let request = OneInchApproveRequest {
            chain: check.chain_id as u32,
            token_address: check.token,
            amount: U256::MAX.to_string(),
        };
        let approve_tx =
            one_inch_approve_transaction(&self.client, &self.config, request).await?;

        if approve_tx.to != check.token {
            return Err(report!(Error::ResponseError).attach_printable(format!(
                "1inch approval targets {} instead of {}",
                approve_tx.to, check.token
            )));
        }

        self.executor
            .approval_request(approve_tx.to, approve_tx.data, approve_tx.value)
            .await
    }

    async fn execute_swap(
        &self,
        intent: &SwapIntent,
        quote: &Quote,
    ) -> AggregatorResult<SwapResult> {
        if quote.provider() != ProviderKind::OneInch {
            return Err(report!(Error::ResponseError).attach_printable(format!(
                "1inch cannot execute a {} quote",
                quote.provider()
            )));
        }

        let buy_decimals = self.tokens.get(&quote.buy_token)?.decimals;
        let sender = self.executor.sender();
        let request = OneInchSwapRequest {
            chain: intent.chain_id as u32,
            src: quote.sell_token,
            dst: quote.buy_token,
            amount: quote.sell_amount.to_string(),
            from: sender,
            origin: sender,
            slippage: one_inch_slippage(intent.slippage_percent),
        };
        let swap = one_inch_swap(&self.client, &self.config, request).await?;
        let buy_amount = from_base_units(swap.dst_amount, buy_decimals)?;

        let transaction = self
            .executor
            .swap_request(swap.tx.to, swap.tx.data, swap.tx.value, swap.tx.gas, None)
            .await?;
        let receipt = self.executor.submit_and_wait(&transaction).await?;

        Ok(self.executor.swap_result(intent, buy_amount, &receipt))
    }
}
