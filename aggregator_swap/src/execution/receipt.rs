use std::{sync::Arc, time::Duration};

use alloy::primitives::TxHash;
use error_stack::report;
use swap_models::models::Receipt;
use tracing::{debug, info, warn};

use crate::{
    chain::ChainClient,
    error::{AggregatorResult, Error},
    utils::sleep::Sleeper,
};

pub const DEFAULT_MAX_RECEIPT_ATTEMPTS: u32 = 30;
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polls for a receipt until it shows up or the attempt budget runs out.
///
/// Every miss, including a failed query, costs one attempt. Attempts are
/// separated by one interval of sleep, with none after the last. A mined
/// receipt ends polling whatever its status.
#[derive(Clone)]
pub struct ReceiptPoller {
    chain: Arc<dyn ChainClient>,
    sleeper: Arc<dyn Sleeper>,
    max_attempts: u32,
    interval: Duration,
}

impl ReceiptPoller {
    pub fn new(chain: Arc<dyn ChainClient>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            chain,
            sleeper,
            max_attempts: DEFAULT_MAX_RECEIPT_ATTEMPTS,
            interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }

    pub fn with_limits(self, max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            ..self
        }
    }

    pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> AggregatorResult<Receipt> {
        for attempt in 1..=self.max_attempts {
            match self.chain.transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    info!(
                        "Receipt for {tx_hash} after {attempt} attempt(s): {:?}, gas used {}",
                        receipt.status, receipt.gas_used
                    );
                    return Ok(receipt);
                }
                Ok(None) => debug!(
                    "Receipt for {tx_hash} not available yet ({attempt}/{})",
                    self.max_attempts
                ),
                Err(report) => warn!(
                    "Receipt query for {tx_hash} failed ({attempt}/{}): {report:?}",
                    self.max_attempts
                ),
            }
            if attempt < self.max_attempts {
                self.sleeper.sleep(self.interval).await;
            }
        }

        Err(report!(Error::ConfirmationTimeout {
            tx_hash: tx_hash.to_string(),
            attempts: self.max_attempts,
        })
        .attach_printable(format!(
            "Waited {:?} without a receipt",
            self.interval * self.max_attempts.saturating_sub(1)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{FakeChainClient, RecordingSleeper};
    use swap_models::models::ReceiptStatus;

    fn poller(chain: Arc<FakeChainClient>, sleeper: Arc<RecordingSleeper>) -> ReceiptPoller {
        ReceiptPoller::new(chain, sleeper)
    }

    #[tokio::test]
    async fn test_receipt_never_arrives() {
        let chain = Arc::new(FakeChainClient::default().with_receipt_on_attempt(None));
        let sleeper = Arc::new(RecordingSleeper::default());
        let tx_hash = TxHash::repeat_byte(0xab);

        let err = poller(chain.clone(), sleeper.clone())
            .wait_for_receipt(tx_hash)
            .await
            .unwrap_err();

        assert_eq!(
            err.current_context(),
            &Error::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                attempts: 30
            }
        );
        assert_eq!(chain.receipt_queries(), 30);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_secs(5); 29]);
        assert_eq!(sleeper.total(), Duration::from_secs(145));
    }

    #[tokio::test]
    async fn test_receipt_arrives_on_attempt_n() {
        for n in [1u32, 2, 17, 30] {
            let chain = Arc::new(FakeChainClient::default().with_receipt_on_attempt(Some(n)));
            let sleeper = Arc::new(RecordingSleeper::default());

            let receipt = poller(chain.clone(), sleeper.clone())
                .wait_for_receipt(TxHash::repeat_byte(1))
                .await
                .unwrap();

            assert_eq!(receipt.status, ReceiptStatus::Success);
            assert_eq!(chain.receipt_queries(), n);
            assert_eq!(sleeper.sleeps().len() as u32, n - 1);
        }
    }

    #[tokio::test]
    async fn test_failed_receipt_is_final() {
        let chain = Arc::new(
            FakeChainClient::default()
                .with_receipt_on_attempt(Some(3))
                .with_receipt_statuses(vec![ReceiptStatus::Failure]),
        );
        let sleeper = Arc::new(RecordingSleeper::default());
        let tx_hash = chain.hash_for(0);

        let receipt = poller(chain.clone(), sleeper)
            .wait_for_receipt(tx_hash)
            .await
            .unwrap();

        assert!(!receipt.is_success());
        assert_eq!(chain.receipt_queries(), 3);
    }

    #[tokio::test]
    async fn test_query_errors_count_as_attempts() {
        let chain = Arc::new(
            FakeChainClient::default()
                .with_receipt_on_attempt(None)
                .with_failing_receipt_queries(),
        );
        let sleeper = Arc::new(RecordingSleeper::default());

        let err = poller(chain.clone(), sleeper.clone())
            .with_limits(4, Duration::from_millis(10))
            .wait_for_receipt(TxHash::repeat_byte(2))
            .await
            .unwrap_err();

        assert!(matches!(
            err.current_context(),
            Error::ConfirmationTimeout { attempts: 4, .. }
        ));
        assert_eq!(chain.receipt_queries(), 4);
        assert_eq!(sleeper.total(), Duration::from_millis(30));
    }
}
