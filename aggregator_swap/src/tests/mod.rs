use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use error_stack::report;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::Arc;
use swap_models::{
    constants::chains::ChainId,
    models::{
        AllowanceState, Receipt, ReceiptStatus, SwapIntent, SwapResult, TransactionRequest,
    },
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{
    chain::{CallRequest, ChainClient, approve_calldata},
    config::TokenRegistry,
    error::{AggregatorResult, Error},
    execution::executor::TransactionExecutor,
    routers::{
        ApprovalCheck, ProviderKind, QuoteProvider,
        constants::PERMIT2_ADDRESS,
        one_inch::one_inch::normalize_one_inch_quote,
        quote::Quote,
        zero_x::zero_x::{normalize_zero_x_quote, parse_zero_x_quote},
    },
    utils::{
        number_conversion::{from_base_units, to_base_units},
        sleep::Sleeper,
    },
};

pub const BRLA: Address = Address::repeat_byte(0xe6);
pub const USDC: Address = Address::repeat_byte(0x27);
pub const WALLET: Address = Address::repeat_byte(0x0a);
/// Where fake swaps are sent
pub const FAKE_ROUTER: Address = Address::repeat_byte(0x11);

const ZERO_X_SETTLER: &str = "0x0d0e364aa7852291883c162b22d6d81f6355428f";

#[cfg(test)]
pub fn init_tracing_in_tests() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().pretty().with_ansi(true))
        .try_init()
        .ok();
}

pub fn test_tokens() -> TokenRegistry {
    TokenRegistry::polygon_defaults(BRLA, USDC)
}

/// BRLA → USDC on Polygon from the test wallet
pub fn intent(amount: Decimal) -> SwapIntent {
    SwapIntent::new(BRLA, USDC, amount, WALLET, ChainId::Polygon)
}

/// Records requested delays instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    pub fn total(&self) -> Duration {
        self.sleeps().iter().sum()
    }
}

#[async_trait::async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

/// In-memory chain. The n-th accepted transaction gets `hash_for(n)` and
/// `receipt_statuses[n]` (success when missing).
pub struct FakeChainClient {
    sender: Address,
    gas_price: u128,
    gas_estimate: Option<u64>,
    /// Each allowance query consumes one value, the last one sticks
    allowances: Mutex<VecDeque<U256>>,
    allowance_spenders: Mutex<Vec<Address>>,
    send_failures: AtomicU32,
    sent: Mutex<Vec<TransactionRequest>>,
    /// Receipt shows up on this query for a given hash, never when `None`
    receipt_on_attempt: Option<u32>,
    receipt_statuses: Vec<ReceiptStatus>,
    failing_receipt_queries: bool,
    receipt_attempts: Mutex<HashMap<TxHash, u32>>,
    receipt_queries: AtomicU32,
}

impl Default for FakeChainClient {
    fn default() -> Self {
        Self {
            sender: WALLET,
            gas_price: 30_000_000_000,
            gas_estimate: Some(50_000),
            allowances: Mutex::new(VecDeque::from([U256::ZERO])),
            allowance_spenders: Mutex::new(Vec::new()),
            send_failures: AtomicU32::new(0),
            sent: Mutex::new(Vec::new()),
            receipt_on_attempt: Some(1),
            receipt_statuses: Vec::new(),
            failing_receipt_queries: false,
            receipt_attempts: Mutex::new(HashMap::new()),
            receipt_queries: AtomicU32::new(0),
        }
    }
}

impl FakeChainClient {
    pub fn with_sender(self, sender: Address) -> Self {
        Self { sender, ..self }
    }

    pub fn with_gas_price(self, gas_price: u128) -> Self {
        Self { gas_price, ..self }
    }

    pub fn with_gas_estimate(self, gas_estimate: Option<u64>) -> Self {
        Self {
            gas_estimate,
            ..self
        }
    }

    pub fn with_allowances(self, allowances: Vec<U256>) -> Self {
        Self {
            allowances: Mutex::new(allowances.into()),
            ..self
        }
    }

    pub fn with_send_failures(self, failures: u32) -> Self {
        Self {
            send_failures: AtomicU32::new(failures),
            ..self
        }
    }

    pub fn with_receipt_on_attempt(self, receipt_on_attempt: Option<u32>) -> Self {
        Self {
            receipt_on_attempt,
            ..self
        }
    }

    pub fn with_receipt_statuses(self, receipt_statuses: Vec<ReceiptStatus>) -> Self {
        Self {
            receipt_statuses,
            ..self
        }
    }

    pub fn with_failing_receipt_queries(self) -> Self {
        Self {
            failing_receipt_queries: true,
            ..self
        }
    }

    pub fn hash_for(&self, index: usize) -> TxHash {
        TxHash::with_last_byte(index as u8 + 1)
    }

    /// Accepted transactions, in submission order
    pub fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn allowance_spenders(&self) -> Vec<Address> {
        self.allowance_spenders.lock().unwrap().clone()
    }

    pub fn allowance_queries(&self) -> u32 {
        self.allowance_spenders.lock().unwrap().len() as u32
    }

    pub fn receipt_queries(&self) -> u32 {
        self.receipt_queries.load(Ordering::SeqCst)
    }

    fn status_for(&self, tx_hash: TxHash) -> ReceiptStatus {
        let index = tx_hash[31].checked_sub(1).map(usize::from);
        let is_known = tx_hash[..31].iter().all(|byte| *byte == 0);
        match index {
            Some(index) if is_known => self
                .receipt_statuses
                .get(index)
                .copied()
                .unwrap_or(ReceiptStatus::Success),
            _ => ReceiptStatus::Success,
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for FakeChainClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn gas_price(&self) -> AggregatorResult<u128> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _call: &CallRequest) -> AggregatorResult<u64> {
        self.gas_estimate.ok_or_else(|| {
            report!(Error::ChainClientError(
                "execution reverted: estimation failed".to_string()
            ))
        })
    }

    async fn allowance(
        &self,
        _token: Address,
        _owner: Address,
        spender: Address,
    ) -> AggregatorResult<U256> {
        self.allowance_spenders.lock().unwrap().push(spender);
        let mut allowances = self.allowances.lock().unwrap();
        let value = if allowances.len() > 1 {
            allowances.pop_front()
        } else {
            allowances.front().copied()
        };
        Ok(value.unwrap_or(U256::ZERO))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> AggregatorResult<TxHash> {
        let failures = self.send_failures.load(Ordering::SeqCst);
        if failures > 0 {
            self.send_failures.store(failures - 1, Ordering::SeqCst);
            return Err(report!(Error::ChainClientError(
                "connection reset by peer".to_string()
            )));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(request.clone());
        Ok(self.hash_for(sent.len() - 1))
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> AggregatorResult<Option<Receipt>> {
        self.receipt_queries.fetch_add(1, Ordering::SeqCst);
        if self.failing_receipt_queries {
            return Err(report!(Error::ChainClientError(
                "header not found".to_string()
            )));
        }

        let mut attempts = self.receipt_attempts.lock().unwrap();
        let attempt = attempts.entry(tx_hash).or_insert(0);
        *attempt += 1;

        Ok(match self.receipt_on_attempt {
            Some(mined_at) if *attempt >= mined_at => Some(Receipt {
                tx_hash,
                status: self.status_for(tx_hash),
                gas_used: 150_000,
            }),
            _ => None,
        })
    }
}

/// Provider backed by canned quotes. With an executor it approves and swaps
/// through the fake chain like a real provider would.
pub struct FakeQuoteProvider {
    kind: ProviderKind,
    executor: Option<Arc<TransactionExecutor>>,
    quote: Option<Quote>,
    quote_requests: AtomicU32,
}

impl FakeQuoteProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            executor: None,
            quote: None,
            quote_requests: AtomicU32::new(0),
        }
    }

    pub fn with_executor(self, executor: Arc<TransactionExecutor>) -> Self {
        Self {
            executor: Some(executor),
            ..self
        }
    }

    pub fn with_quote(self, quote: Quote) -> Self {
        Self {
            quote: Some(quote),
            ..self
        }
    }

    pub fn quote_requests(&self) -> u32 {
        self.quote_requests.load(Ordering::SeqCst)
    }

    fn executor(&self) -> AggregatorResult<&Arc<TransactionExecutor>> {
        self.executor.as_ref().ok_or_else(|| {
            report!(Error::ConfigurationError(
                "fake provider has no executor".to_string()
            ))
        })
    }

    fn default_quote(&self, intent: &SwapIntent) -> AggregatorResult<Quote> {
        let tokens = test_tokens();
        let sell_amount = to_base_units(intent.amount, tokens.get(&intent.sell_token)?.decimals)?;
        // Roughly 0.2 USD per BRLA
        let buy_amount = sell_amount / 5_000_000_000_000;

        Ok(match self.kind {
            ProviderKind::OneInch => normalize_one_inch_quote(
                intent.sell_token,
                intent.buy_token,
                sell_amount,
                serde_json::from_value(one_inch_quote_fixture(buy_amount))
                    .map_err(|e| report!(Error::ParseError).attach_printable(e.to_string()))?,
            ),
            ProviderKind::ZeroX => normalize_zero_x_quote(parse_zero_x_quote(
                zero_x_quote_fixture(
                    intent.sell_token,
                    intent.buy_token,
                    sell_amount,
                    buy_amount,
                    true,
                    false,
                ),
            )?),
        })
    }

    fn spender(check: &ApprovalCheck) -> Address {
        check.spender.unwrap_or(FAKE_ROUTER)
    }
}

#[async_trait::async_trait]
impl QuoteProvider for FakeQuoteProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn get_quote(&self, intent: &SwapIntent) -> AggregatorResult<Quote> {
        self.quote_requests.fetch_add(1, Ordering::SeqCst);
        match &self.quote {
            Some(quote) => Ok(quote.clone()),
            None => self.default_quote(intent),
        }
    }

    async fn needs_approval(&self, check: &ApprovalCheck) -> AggregatorResult<bool> {
        let current = self
            .executor()?
            .chain()
            .allowance(check.token, check.owner, Self::spender(check))
            .await?;
        Ok(AllowanceState::new(current, check.amount).needs_approval())
    }

    async fn get_approval_data(
        &self,
        check: &ApprovalCheck,
    ) -> AggregatorResult<TransactionRequest> {
        self.executor()?
            .approval_request(
                check.token,
                approve_calldata(Self::spender(check), U256::from(check.amount)),
                U256::ZERO,
            )
            .await
    }

    async fn execute_swap(
        &self,
        intent: &SwapIntent,
        quote: &Quote,
    ) -> AggregatorResult<SwapResult> {
        let executor = self.executor()?;
        let request = executor
            .swap_request(
                FAKE_ROUTER,
                Bytes::from_static(&[0x12, 0xaa, 0x3c, 0xaf]),
                U256::ZERO,
                quote.gas_estimate,
                quote.gas_price,
            )
            .await?;
        let receipt = executor.submit_and_wait(&request).await?;
        let buy_decimals = test_tokens().get(&quote.buy_token)?.decimals;
        Ok(executor.swap_result(
            intent,
            from_base_units(quote.buy_amount, buy_decimals)?,
            &receipt,
        ))
    }
}

/// `/quote` answer with a two hop QuickSwap/Uniswap route
pub fn one_inch_quote_fixture(buy_amount: u128) -> Value {
    json!({
        "dstAmount": buy_amount.to_string(),
        "gas": 182_340,
        "protocols": [[[
            { "name": "POLYGON_QUICKSWAP_V3", "part": 100, "fromTokenAddress": BRLA, "toTokenAddress": USDC }
        ]], [[
            { "name": "POLYGON_UNISWAP_V3", "part": 100, "fromTokenAddress": BRLA, "toTokenAddress": USDC }
        ]]]
    })
}

/// `/swap/permit2/quote` answer as 0x returns it for a wallet without a
/// Permit2 allowance
pub fn zero_x_quote_fixture(
    sell_token: Address,
    buy_token: Address,
    sell_amount: u128,
    buy_amount: u128,
    allowance_issue: bool,
    omit_permit: bool,
) -> Value {
    let permit2 = (!omit_permit).then(|| {
        json!({
            "type": "Permit2",
            "hash": "0x3e1fd1c6a8d4e4c16b0c9ae1a2b3b5ab29ed24a8ca5e6bb9e6b3ec9a5a6fd7f2",
            "eip712": {
                "types": {
                    "EIP712Domain": [
                        { "name": "name", "type": "string" },
                        { "name": "chainId", "type": "uint256" },
                        { "name": "verifyingContract", "type": "address" }
                    ],
                    "PermitTransferFrom": [
                        { "name": "permitted", "type": "TokenPermissions" },
                        { "name": "spender", "type": "address" },
                        { "name": "nonce", "type": "uint256" },
                        { "name": "deadline", "type": "uint256" }
                    ],
                    "TokenPermissions": [
                        { "name": "token", "type": "address" },
                        { "name": "amount", "type": "uint256" }
                    ]
                },
                "domain": {
                    "name": "Permit2",
                    "chainId": 137,
                    "verifyingContract": PERMIT2_ADDRESS.to_string().to_lowercase()
                },
                "message": {
                    "permitted": {
                        "token": sell_token,
                        "amount": sell_amount.to_string()
                    },
                    "spender": ZERO_X_SETTLER,
                    "nonce": "2241959297937691820908574931991575",
                    "deadline": "1733154400"
                },
                "primaryType": "PermitTransferFrom"
            }
        })
    });

    let issues = if allowance_issue {
        json!({
            "allowance": {
                "actual": "0",
                "spender": PERMIT2_ADDRESS.to_string().to_lowercase()
            },
            "balance": null,
            "simulationIncomplete": false,
            "invalidSourcesPassed": []
        })
    } else {
        json!({
            "allowance": null,
            "balance": null,
            "simulationIncomplete": false,
            "invalidSourcesPassed": []
        })
    };

    json!({
        "blockNumber": "65106128",
        "buyAmount": buy_amount.to_string(),
        "buyToken": buy_token,
        "fees": {
            "integratorFee": null,
            "zeroExFee": {
                "amount": "223875",
                "token": USDC,
                "type": "volume"
            },
            "gasFee": null
        },
        "issues": issues,
        "liquidityAvailable": true,
        "minBuyAmount": "147757500",
        "permit2": permit2,
        "route": {
            "fills": [
                { "from": sell_token, "to": buy_token, "source": "QuickSwap_V3", "proportionBps": "6000" },
                { "from": sell_token, "to": buy_token, "source": "Uniswap_V3", "proportionBps": "4000" },
                { "from": sell_token, "to": buy_token, "source": "QuickSwap_V3", "proportionBps": "10000" }
            ],
            "tokens": []
        },
        "sellAmount": sell_amount.to_string(),
        "sellToken": sell_token,
        "tokenMetadata": {},
        "totalNetworkFee": "11523160000000000",
        "transaction": {
            "to": ZERO_X_SETTLER,
            "data": "0x1fff991f000000000000000000000000000000000000000000000000000000000000000a",
            "gas": "288079",
            "gasPrice": "40000000000",
            "value": "0"
        },
        "zid": "0x6f2b9d8e4e0c3e7a9b1c2d3e"
    })
}
