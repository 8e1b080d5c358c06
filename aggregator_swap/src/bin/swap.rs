use std::process;
use std::str::FromStr;
use std::sync::Arc;

use aggregator_swap::chain::ChainClient as _;
use aggregator_swap::chain::evm::AlloyChainClient;
use aggregator_swap::config::SwapConfig;
use aggregator_swap::error::{AggregatorResult, Error, ReportDisplayExt as _};
use aggregator_swap::execution::approval::ApprovalManager;
use aggregator_swap::execution::executor::TransactionExecutor;
use aggregator_swap::execution::gas::GasPolicy;
use aggregator_swap::execution::permit::LocalPermitSigner;
use aggregator_swap::execution::receipt::ReceiptPoller;
use aggregator_swap::orchestrator::SwapOrchestrator;
use aggregator_swap::prices::{ConfiguredPriceOracle, HttpPriceFeed};
use aggregator_swap::routers::one_inch::OneInchProvider;
use aggregator_swap::routers::selector::AggregatorSelector;
use aggregator_swap::routers::zero_x::ZeroXProvider;
use aggregator_swap::utils::sleep::TokioSleeper;
use alloy::signers::local::PrivateKeySigner;
use error_stack::{ResultExt as _, report};
use rust_decimal::Decimal;
use swap_models::log::init_tracing;
use swap_models::models::{SwapIntent, SwapResult};
use swap_models::network::client_rate_limit::{Client, RateLimitedClient};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

const USAGE: &str = "Usage: swap <amount> [1|2]   (1 = BRLA -> USDC, 2 = USDC -> BRLA)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    BrlaToUsdc,
    UsdcToBrla,
}

impl Direction {
    fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "" | "1" => Some(Direction::BrlaToUsdc),
            "2" => Some(Direction::UsdcToBrla),
            _ => None,
        }
    }

    fn symbols(&self) -> (&'static str, &'static str) {
        match self {
            Direction::BrlaToUsdc => ("BRLA", "USDC"),
            Direction::UsdcToBrla => ("USDC", "BRLA"),
        }
    }
}

#[tokio::main]
async fn main() {
    let config = match SwapConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("swap error: {err:?}");
            process::exit(1);
        }
    };
    init_tracing(config.json_logs);

    match run(config).await {
        Ok(result) => {
            print_result(&result);
            if !result.success {
                process::exit(2);
            }
        }
        Err(err) => {
            tracing::debug!("{err:?}");
            eprintln!("swap error: {} {}", err.current_context(), err.format());
            process::exit(1);
        }
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> AggregatorResult<String> {
    let mut stdout = io::stdout();
    stdout
        .write_all(question.as_bytes())
        .await
        .change_context(Error::ParseError)?;
    stdout.flush().await.change_context(Error::ParseError)?;

    let line = lines
        .next_line()
        .await
        .change_context(Error::ParseError)?
        .unwrap_or_default();
    Ok(line.trim().to_string())
}

async fn read_arguments() -> AggregatorResult<(Decimal, Direction)> {
    let mut args = std::env::args().skip(1);
    let mut lines = BufReader::new(io::stdin()).lines();

    let amount = match args.next() {
        Some(amount) => amount,
        None => prompt(&mut lines, "Amount to swap: ").await?,
    };
    let amount = Decimal::from_str(&amount).map_err(|_| {
        report!(Error::InvalidIntent(format!("invalid amount {amount:?}"))).attach_printable(USAGE)
    })?;

    let direction = match args.next() {
        Some(direction) => direction,
        None => {
            prompt(
                &mut lines,
                "Direction, 1 = BRLA -> USDC, 2 = USDC -> BRLA [1]: ",
            )
            .await?
        }
    };
    let direction = Direction::parse(&direction).ok_or_else(|| {
        report!(Error::InvalidIntent(format!("invalid direction {direction:?}")))
            .attach_printable(USAGE)
    })?;

    Ok((amount, direction))
}

async fn run(config: SwapConfig) -> AggregatorResult<SwapResult> {
    let (amount, direction) = read_arguments().await?;

    let signer = PrivateKeySigner::from_str(config.private_key())
        .change_context(Error::ConfigurationError("PRIVATE_KEY is not a valid key".to_string()))?;
    let chain = Arc::new(AlloyChainClient::connect(&config.rpc_url, signer.clone()).await?);
    let sleeper = Arc::new(TokioSleeper);
    let tokens = Arc::new(config.tokens.clone());

    let poller = ReceiptPoller::new(chain.clone(), sleeper.clone());
    let executor = Arc::new(TransactionExecutor::new(
        chain.clone(),
        poller,
        GasPolicy::default(),
        config.explorer_tx_url.clone(),
    ));

    let one_inch = OneInchProvider::new(
        Client::RateLimited(RateLimitedClient::new(config.one_inch.rate_limit, None)),
        config.one_inch.clone(),
        tokens.clone(),
        executor.clone(),
    );
    let zero_x = ZeroXProvider::new(
        Client::default(),
        config.zero_x.clone(),
        tokens.clone(),
        executor.clone(),
        Arc::new(LocalPermitSigner::new(signer)),
    );
    let selector = AggregatorSelector::new(config.threshold_usd)
        .with_provider(Arc::new(one_inch))
        .with_provider(Arc::new(zero_x));
    let approvals = ApprovalManager::new(executor, sleeper)
        .with_recheck_delay(config.approval_recheck_delay);
    let price_oracle = Arc::new(ConfiguredPriceOracle::new(
        tokens.clone(),
        Arc::new(HttpPriceFeed::default()),
    ));

    let (sell_symbol, buy_symbol) = direction.symbols();
    let intent = SwapIntent::new(
        tokens.by_symbol(sell_symbol)?.address,
        tokens.by_symbol(buy_symbol)?.address,
        amount,
        chain.sender(),
        config.chain_id,
    );
    println!(
        "Swapping {amount} {sell_symbol} for {buy_symbol} on {} from {}",
        config.chain_id, intent.wallet
    );

    SwapOrchestrator::new(price_oracle, selector, approvals, chain, tokens)
        .with_fallback_usd(config.fallback_usd_value())
        .swap(&intent)
        .await
}

fn print_result(result: &SwapResult) {
    if result.success {
        println!("Swap succeeded");
    } else {
        println!("Swap failed");
    }
    println!("  tx hash:     {}", result.tx_hash);
    println!("  sold:        {}", result.sell_amount);
    println!("  bought:      {}", result.buy_amount);
    println!("  gas used:    {}", result.gas_used);
    if let Some(url) = &result.explorer_url {
        println!("  explorer:    {url}");
    }
    if let Some(error) = &result.error {
        println!("  error:       {error}");
    }
}
