use std::{future::Future, time::Duration};

use error_stack::Report;
use tracing::{error, warn};

use crate::{
    error::{AggregatorResult, Error},
    utils::sleep::Sleeper,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecheckOutcome<T> {
    /// The operation itself succeeded
    Completed(T),
    /// The operation failed but the recheck found nothing left to do
    Resolved,
}

/// Runs `operation` once. When it fails with an error that `is_fatal` does
/// not claim, waits `delay` and asks `recheck` whether the goal was reached
/// anyway. A negative recheck (or a failing one) escalates the original
/// report under `escalation`.
///
/// At most one recheck is ever performed.
pub async fn recheck_on_failure<T, Op, Check, CheckFut>(
    operation: Op,
    is_fatal: impl Fn(&Error) -> bool,
    recheck: Check,
    sleeper: &dyn Sleeper,
    delay: Duration,
    escalation: Error,
) -> AggregatorResult<RecheckOutcome<T>>
where
    Op: Future<Output = AggregatorResult<T>>,
    Check: FnOnce() -> CheckFut,
    CheckFut: Future<Output = AggregatorResult<bool>>,
{
    let report = match operation.await {
        Ok(value) => return Ok(RecheckOutcome::Completed(value)),
        Err(report) if is_fatal(report.current_context()) => return Err(report),
        Err(report) => report,
    };

    warn!(
        "Operation failed ({}), rechecking in {:?}",
        report.current_context(),
        delay
    );
    sleeper.sleep(delay).await;

    match recheck().await {
        Ok(true) => {
            warn!("Recheck shows the operation took effect despite the failure");
            Ok(RecheckOutcome::Resolved)
        }
        Ok(false) => Err(escalate(report, escalation)),
        Err(recheck_report) => {
            error!("Recheck failed: {recheck_report:?}");
            Err(escalate(report, escalation)
                .attach_printable(format!("Recheck failed: {}", recheck_report.current_context())))
        }
    }
}

fn escalate(report: Report<Error>, escalation: Error) -> Report<Error> {
    report.change_context(escalation)
}
