use std::sync::Arc;

use error_stack::{ResultExt as _, report};
use rust_decimal::Decimal;
use swap_models::models::{SwapIntent, SwapResult};
use tracing::{debug, info, warn};

use crate::{
    chain::ChainClient,
    config::TokenRegistry,
    error::{AggregatorResult, Error},
    execution::approval::ApprovalManager,
    prices::PriceOracle,
    routers::{ApprovalCheck, selector::AggregatorSelector},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStage {
    Requested,
    Priced,
    Approved,
    Submitted,
    Confirmed,
    Failed,
}

/// Runs one intent through pricing, provider selection, approval and swap.
/// Nothing is retried at this level.
pub struct SwapOrchestrator {
    price_oracle: Arc<dyn PriceOracle>,
    selector: AggregatorSelector,
    approvals: ApprovalManager,
    chain: Arc<dyn ChainClient>,
    tokens: Arc<TokenRegistry>,
    /// USD value assumed when pricing fails, at or above the threshold
    fallback_usd: Decimal,
}

impl SwapOrchestrator {
    pub fn new(
        price_oracle: Arc<dyn PriceOracle>,
        selector: AggregatorSelector,
        approvals: ApprovalManager,
        chain: Arc<dyn ChainClient>,
        tokens: Arc<TokenRegistry>,
    ) -> Self {
        let fallback_usd = selector.threshold_usd() + Decimal::ONE;
        Self {
            price_oracle,
            selector,
            approvals,
            chain,
            tokens,
            fallback_usd,
        }
    }

    pub fn with_fallback_usd(self, fallback_usd: Decimal) -> Self {
        Self {
            fallback_usd,
            ..self
        }
    }

    fn validate(&self, intent: &SwapIntent) -> AggregatorResult<()> {
        if intent.amount <= Decimal::ZERO {
            return Err(report!(Error::InvalidIntent(format!(
                "amount must be positive, got {}",
                intent.amount
            ))));
        }
        if intent.sell_token == intent.buy_token {
            return Err(report!(Error::InvalidIntent(format!(
                "sell and buy token are both {}",
                intent.sell_token
            ))));
        }
        self.tokens.get(&intent.sell_token)?;
        self.tokens.get(&intent.buy_token)?;

        let sender = self.chain.sender();
        if intent.wallet != sender {
            return Err(report!(Error::ConfigurationError(format!(
                "Intent wallet {} does not match signer {sender}",
                intent.wallet
            ))));
        }
        Ok(())
    }

    async fn usd_value(&self, intent: &SwapIntent) -> Decimal {
        match self
            .price_oracle
            .usd_value(intent.sell_token, intent.amount)
            .await
        {
            Ok(value) => value,
            Err(report) => {
                warn!(
                    "Pricing failed, assuming {} USD: {report:?}",
                    self.fallback_usd
                );
                self.fallback_usd
            }
        }
    }

    pub async fn swap(&self, intent: &SwapIntent) -> AggregatorResult<SwapResult> {
        let mut stage = SwapStage::Requested;
        let result = self.run(intent, &mut stage).await;
        if let Err(report) = &result {
            warn!("Swap aborted after {stage:?}: {report:?}");
            advance(&mut stage, SwapStage::Failed);
        }
        result
    }

    async fn run(&self, intent: &SwapIntent, stage: &mut SwapStage) -> AggregatorResult<SwapResult> {
        self.validate(intent)?;

        let amount_usd = self.usd_value(intent).await;
        advance(stage, SwapStage::Priced);

        let provider = self.selector.select(amount_usd)?;
        let quote = provider
            .get_quote(intent)
            .await
            .attach_printable_lazy(|| format!("Quote from {} failed", provider.kind()))?;

        if quote.sell_token != intent.sell_token || quote.buy_token != intent.buy_token {
            return Err(report!(Error::ResponseError).attach_printable(format!(
                "{} quoted {} -> {} for a {} -> {} intent",
                provider.kind(),
                quote.sell_token,
                quote.buy_token,
                intent.sell_token,
                intent.buy_token
            )));
        }
        info!(
            "{} quote: sell {} for {} (gas {}, sources {:?})",
            provider.kind(),
            quote.sell_amount,
            quote.buy_amount,
            quote.gas_estimate,
            quote.sources
        );

        let check = ApprovalCheck::for_quote(intent, &quote);
        self.approvals
            .ensure_approval(provider.as_ref(), &check)
            .await?;
        advance(stage, SwapStage::Approved);

        let result = match provider.execute_swap(intent, &quote).await {
            Ok(result) => result,
            Err(report) => {
                advance(stage, stage_after_swap_error(report.current_context()));
                return Err(report);
            }
        };
        advance(stage, SwapStage::Submitted);

        if result.success {
            advance(stage, SwapStage::Confirmed);
            info!(
                "Swapped {} for {} in {} ({} gas)",
                result.sell_amount, result.buy_amount, result.tx_hash, result.gas_used
            );
        } else {
            advance(stage, SwapStage::Failed);
        }
        Ok(result)
    }
}

/// Only a confirmation timeout proves the swap reached the chain; any other
/// error is raised before submission.
fn stage_after_swap_error(error: &Error) -> SwapStage {
    match error {
        Error::ConfirmationTimeout { .. } => SwapStage::Submitted,
        _ => SwapStage::Approved,
    }
}

fn advance(stage: &mut SwapStage, next: SwapStage) {
    debug!("Swap stage {:?} -> {:?}", stage, next);
    *stage = next;
}
