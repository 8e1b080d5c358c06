use std::sync::Arc;

use alloy::primitives::{Address, U256};
use error_stack::{ResultExt as _, report};
use serde_json::{Value, json};
use swap_models::{
    models::{AllowanceState, SwapIntent, SwapResult, TransactionRequest},
    network::{
        client_rate_limit::Client,
        http::{handle_reqwest_response, value_to_sorted_querystring},
    },
};
use tracing::{info, warn};

use crate::{
    chain::approve_calldata,
    config::{TokenRegistry, ZeroXConfig},
    error::{AggregatorResult, Error},
    execution::{
        executor::TransactionExecutor,
        permit::{PermitSigner, encode_permit_calldata},
    },
    routers::{
        ApprovalCheck, ProviderKind, QuoteProvider,
        constants::{DEFAULT_SWAP_GAS, PERMIT2_ADDRESS},
        dedup_sources,
        quote::{ProtocolFee, ProviderQuote, Quote, QuotedTransaction},
        upstream_error,
        zero_x::{
            ZERO_X_PERMIT2_QUOTE_PATH,
            requests::ZeroXGetQuoteRequest,
            responses::{ZeroXAllowanceIssue, ZeroXQuoteResponse},
        },
    },
    utils::number_conversion::{from_base_units, slippage_to_bps, to_base_units},
};

pub async fn zero_x_get_quote(
    client: &Client,
    config: &ZeroXConfig,
    request: ZeroXGetQuoteRequest,
) -> AggregatorResult<ZeroXQuoteResponse> {
    let query = json!({
        "chainId": request.chain_id,
        "buyToken": request.buy_token,
        "sellToken": request.sell_token,
        "sellAmount": request.sell_amount,
        "taker": request.taker,
        "slippageBps": request.slippage_bps,
    });

    let query_string = value_to_sorted_querystring(&query).change_context(Error::ParseError)?;
    let url = format!(
        "{}/{ZERO_X_PERMIT2_QUOTE_PATH}?{query_string}",
        config.base_url.trim_end_matches('/')
    );

    let request = client
        .inner_client()
        .get(&url)
        .header("0x-api-key", &config.api_key)
        .header("0x-version", &config.version)
        .build()
        .change_context(Error::ReqwestError)
        .attach_printable("Error building 0x request")?;

    let response = client
        .execute(request)
        .await
        .change_context(Error::ReqwestError)
        .attach_printable("Error in 0x request")?;

    let body: Value = handle_reqwest_response(response)
        .await
        .map_err(|report| upstream_error(ProviderKind::ZeroX, report))?;

    parse_zero_x_quote(body)
}

/// 0x answers `200 {"liquidityAvailable": false}` when it cannot route
pub fn parse_zero_x_quote(body: Value) -> AggregatorResult<ZeroXQuoteResponse> {
    if body.get("liquidityAvailable").and_then(Value::as_bool) == Some(false) {
        return Err(report!(Error::ResponseError)
            .attach_printable("No liquidity available for 0x swap"));
    }

    serde_json::from_value(body)
        .change_context(Error::ResponseError)
        .attach_printable("Unexpected 0x quote shape")
}

fn allowance_issue_spender(issue: &ZeroXAllowanceIssue) -> Option<Address> {
    let spender = issue.spender.as_deref()?.trim();
    if spender.is_empty() {
        return None;
    }
    match spender.parse() {
        Ok(address) => Some(address),
        Err(_) => {
            warn!("Ignoring malformed 0x allowance spender {spender}");
            None
        }
    }
}

/// Maps a permit2 quote onto [`Quote`]
pub fn normalize_zero_x_quote(response: ZeroXQuoteResponse) -> Quote {
    let allowance_issue = response
        .issues
        .as_ref()
        .and_then(|issues| issues.allowance.as_ref());
    let permit = response
        .permit2
        .as_ref()
        .and_then(|permit2| permit2.eip712.clone());

    let sources = dedup_sources(
        response
            .route
            .iter()
            .flat_map(|route| route.fills.iter().map(|fill| fill.source.clone())),
    );

    let protocol_fee = response
        .fees
        .as_ref()
        .and_then(|fees| fees.zero_ex_fee.as_ref())
        .map(|fee| ProtocolFee {
            token: fee.token,
            amount: fee.amount,
        });

    let transaction = &response.transaction;

    Quote {
        sell_token: response.sell_token,
        buy_token: response.buy_token,
        sell_amount: response.sell_amount,
        buy_amount: response.buy_amount,
        min_buy_amount: Some(response.min_buy_amount),
        gas_estimate: transaction.gas.unwrap_or(DEFAULT_SWAP_GAS),
        gas_price: transaction.gas_price,
        requires_approval: allowance_issue.is_some() && response.permit2.is_none(),
        approval_spender: allowance_issue.and_then(allowance_issue_spender),
        permit,
        transaction: Some(QuotedTransaction {
            to: transaction.to,
            data: transaction.data.clone(),
            value: transaction.value,
            gas: transaction.gas,
        }),
        sources,
        protocol_fee,
        raw: ProviderQuote::ZeroX(Box::new(response)),
    }
}

/// Permit2 flow: the wallet approves the Permit2 contract once, then every
/// swap carries a signed permit appended to the settler calldata.
pub struct ZeroXProvider {
    client: Client,
    config: ZeroXConfig,
    tokens: Arc<TokenRegistry>,
    executor: Arc<TransactionExecutor>,
    permit_signer: Arc<dyn PermitSigner>,
}

impl ZeroXProvider {
    pub fn new(
        client: Client,
        config: ZeroXConfig,
        tokens: Arc<TokenRegistry>,
        executor: Arc<TransactionExecutor>,
        permit_signer: Arc<dyn PermitSigner>,
    ) -> Self {
        Self {
            client,
            config,
            tokens,
            executor,
            permit_signer,
        }
    }

    fn spender(check: &ApprovalCheck) -> Address {
        check.spender.unwrap_or(PERMIT2_ADDRESS)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for ZeroXProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ZeroX
    }

    async fn get_quote(&self, intent: &SwapIntent) -> AggregatorResult<Quote> {
        let sell_token = self.tokens.get(&intent.sell_token)?;
        self.tokens.get(&intent.buy_token)?;

        let sell_amount = to_base_units(intent.amount, sell_token.decimals)?;
        let request = ZeroXGetQuoteRequest {
            chain_id: intent.chain_id as u32,
            buy_token: intent.buy_token,
            sell_token: intent.sell_token,
            sell_amount: sell_amount.to_string(),
            taker: intent.wallet,
            slippage_bps: slippage_to_bps(intent.slippage_percent)?,
        };

        let response = zero_x_get_quote(&self.client, &self.config, request).await?;
        let quote = normalize_zero_x_quote(response);

        info!(
            "0x quote: {} -> {} (min {:?}), sources {:?}, fee {:?}, permit {}",
            quote.sell_amount,
            quote.buy_amount,
            quote.min_buy_amount,
            quote.sources,
            quote.protocol_fee,
            quote.permit.is_some()
        );
        Ok(quote)
    }

    async fn needs_approval(&self, check: &ApprovalCheck) -> AggregatorResult<bool> {
        let spender = Self::spender(check);
        let current = self
            .executor
            .chain()
            .allowance(check.token, check.owner, spender)
            .await?;
        let state = AllowanceState::new(current, check.amount);
        info!(
            "0x allowance for {spender}: {} (required {})",
            state.current, state.required
        );
        Ok(state.needs_approval())
    }

    async fn get_approval_data(
        &self,
        check: &ApprovalCheck,
    ) -> AggregatorResult<TransactionRequest> {
        let spender = Self::spender(check);
        self.executor
            .approval_request(
                check.token,
                approve_calldata(spender, U256::from(check.amount)),
                U256::ZERO,
            )
            .await
    }

    async fn execute_swap(
        &self,
        intent: &SwapIntent,
        quote: &Quote,
    ) -> AggregatorResult<SwapResult> {
        if quote.provider() != ProviderKind::ZeroX {
            return Err(report!(Error::ResponseError)
                .attach_printable(format!("0x cannot execute a {} quote", quote.provider())));
        }
        let transaction = quote.transaction.as_ref().ok_or_else(|| {
            report!(Error::ResponseError).attach_printable("0x quote has no transaction")
        })?;
        let buy_decimals = self.tokens.get(&quote.buy_token)?.decimals;
        let buy_amount = from_base_units(quote.buy_amount, buy_decimals)?;

        let data = match &quote.permit {
            Some(typed_data) => {
                let signature = self.permit_signer.sign_typed_data(typed_data).await?;
                encode_permit_calldata(&transaction.data, &signature)
            }
            None => transaction.data.clone(),
        };

        let request = self
            .executor
            .swap_request(
                transaction.to,
                data,
                transaction.value,
                quote.gas_estimate,
                quote.gas_price,
            )
            .await?;
        let receipt = self.executor.submit_and_wait(&request).await?;

        Ok(self.executor.swap_result(intent, buy_amount, &receipt))
    }
}
