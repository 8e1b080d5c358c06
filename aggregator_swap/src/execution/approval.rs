use std::{sync::Arc, time::Duration};

use error_stack::report;
use swap_models::models::{Receipt, TransactionRequest};
use tracing::{debug, error, info};

use crate::{
    config::DEFAULT_APPROVAL_RECHECK_DELAY,
    error::{AggregatorResult, Error},
    execution::executor::TransactionExecutor,
    routers::{ApprovalCheck, QuoteProvider},
    utils::{
        retry::{RecheckOutcome, recheck_on_failure},
        sleep::Sleeper,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalState {
    Unknown,
    Checked { needs_approval: bool },
    Approving,
    Approved,
    Failed,
}

/// Drives `Unknown → Checked → (Approving →) Approved | Failed` for one trade
pub struct ApprovalManager {
    executor: Arc<TransactionExecutor>,
    sleeper: Arc<dyn Sleeper>,
    recheck_delay: Duration,
}

impl ApprovalManager {
    pub fn new(executor: Arc<TransactionExecutor>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            executor,
            sleeper,
            recheck_delay: DEFAULT_APPROVAL_RECHECK_DELAY,
        }
    }

    pub fn with_recheck_delay(self, recheck_delay: Duration) -> Self {
        Self {
            recheck_delay,
            ..self
        }
    }

    /// Returns `Approved` or an error. No transaction is sent when the
    /// allowance already covers the trade.
    pub async fn ensure_approval(
        &self,
        provider: &dyn QuoteProvider,
        check: &ApprovalCheck,
    ) -> AggregatorResult<ApprovalState> {
        let mut state = ApprovalState::Unknown;

        let needs_approval = provider.needs_approval(check).await?;
        advance(&mut state, ApprovalState::Checked { needs_approval });

        if !needs_approval {
            info!("Allowance of {} already covers {}", check.token, check.amount);
            advance(&mut state, ApprovalState::Approved);
            return Ok(state);
        }

        let request = provider.get_approval_data(check).await?;
        advance(&mut state, ApprovalState::Approving);

        let outcome = recheck_on_failure(
            self.submit_approval(&request),
            |error| matches!(error, Error::ApprovalFailedOnChain(_)),
            || async {
                provider
                    .needs_approval(check)
                    .await
                    .map(|still_needed| !still_needed)
            },
            self.sleeper.as_ref(),
            self.recheck_delay,
            Error::ApprovalSubmissionTransient,
        )
        .await;

        match outcome {
            Ok(RecheckOutcome::Completed(receipt)) => {
                info!("Approval {} confirmed", receipt.tx_hash);
                advance(&mut state, ApprovalState::Approved);
                Ok(state)
            }
            Ok(RecheckOutcome::Resolved) => {
                info!("Allowance is sufficient after recheck");
                advance(&mut state, ApprovalState::Approved);
                Ok(state)
            }
            Err(report) => {
                advance(&mut state, ApprovalState::Failed);
                error!("Approval of {} failed: {report:?}", check.token);
                Err(report)
            }
        }
    }

    async fn submit_approval(&self, request: &TransactionRequest) -> AggregatorResult<Receipt> {
        let receipt = self.executor.submit_and_wait(request).await?;
        if !receipt.is_success() {
            return Err(report!(Error::ApprovalFailedOnChain(
                receipt.tx_hash.to_string()
            )));
        }
        Ok(receipt)
    }
}

fn advance(state: &mut ApprovalState, next: ApprovalState) {
    debug!("Approval state {:?} -> {:?}", state, next);
    *state = next;
}
