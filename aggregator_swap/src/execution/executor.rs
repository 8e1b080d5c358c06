use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use rust_decimal::Decimal;
use swap_models::models::{Receipt, SwapIntent, SwapResult, TransactionRequest};
use tracing::{info, warn};

use crate::{
    chain::{CallRequest, ChainClient},
    error::{AggregatorResult, Error},
    execution::{
        gas::{GasPolicy, GasPriceSource, GasStep},
        receipt::ReceiptPoller,
    },
};

/// Prices, submits and confirms transactions. Each request handed to
/// [`TransactionExecutor::submit_and_wait`] is broadcast exactly once.
#[derive(Clone)]
pub struct TransactionExecutor {
    chain: Arc<dyn ChainClient>,
    poller: ReceiptPoller,
    gas_policy: GasPolicy,
    explorer_tx_url: Option<String>,
}

impl TransactionExecutor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        poller: ReceiptPoller,
        gas_policy: GasPolicy,
        explorer_tx_url: Option<String>,
    ) -> Self {
        Self {
            chain,
            poller,
            gas_policy,
            explorer_tx_url,
        }
    }

    pub fn chain(&self) -> &Arc<dyn ChainClient> {
        &self.chain
    }

    pub fn gas_policy(&self) -> &GasPolicy {
        &self.gas_policy
    }

    pub fn sender(&self) -> Address {
        self.chain.sender()
    }

    pub async fn gas_price(&self, quoted: Option<u128>) -> AggregatorResult<u128> {
        let source = match quoted {
            Some(price) => GasPriceSource::Quoted(price),
            None => GasPriceSource::Network(self.chain.gas_price().await?),
        };
        self.gas_policy.gas_price(source)
    }

    /// Approval transaction with an estimated (or fallback) buffered limit
    /// and the network price plus premium
    pub async fn approval_request(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
    ) -> AggregatorResult<TransactionRequest> {
        let from = self.chain.sender();
        let call = CallRequest {
            from,
            to,
            data: data.clone(),
            value,
        };
        let estimate = match self.chain.estimate_gas(&call).await {
            Ok(estimate) => Some(estimate),
            Err(report) => {
                warn!(
                    "Approval gas estimation failed, using {}: {report:?}",
                    self.gas_policy.fallback_approval_gas
                );
                None
            }
        };

        Ok(TransactionRequest {
            from,
            to,
            data,
            value,
            gas_limit: self.gas_policy.approval_limit(estimate)?,
            gas_price: self.gas_price(None).await?,
        })
    }

    /// Swap transaction priced with `quoted_gas_price` when set
    pub async fn swap_request(
        &self,
        to: Address,
        data: Bytes,
        value: U256,
        gas_estimate: u64,
        quoted_gas_price: Option<u128>,
    ) -> AggregatorResult<TransactionRequest> {
        Ok(TransactionRequest {
            from: self.chain.sender(),
            to,
            data,
            value,
            gas_limit: self
                .gas_policy
                .buffered_limit(gas_estimate, GasStep::Swap)?,
            gas_price: self.gas_price(quoted_gas_price).await?,
        })
    }

    pub async fn submit_and_wait(&self, request: &TransactionRequest) -> AggregatorResult<Receipt> {
        info!(
            "Submitting transaction to {} (gas limit {}, gas price {})",
            request.to, request.gas_limit, request.gas_price
        );
        let tx_hash = self.chain.send_transaction(request).await?;
        info!("Transaction {tx_hash} submitted, waiting for receipt");
        self.poller.wait_for_receipt(tx_hash).await
    }

    pub fn explorer_url(&self, receipt: &Receipt) -> Option<String> {
        self.explorer_tx_url
            .as_ref()
            .map(|base| format!("{base}{}", receipt.tx_hash))
    }

    pub fn swap_result(
        &self,
        intent: &SwapIntent,
        buy_amount: Decimal,
        receipt: &Receipt,
    ) -> SwapResult {
        let error = (!receipt.is_success())
            .then(|| Error::SwapFailedOnChain(receipt.tx_hash.to_string()).to_string());
        if let Some(error) = &error {
            warn!("{error}");
        }

        SwapResult {
            success: receipt.is_success(),
            tx_hash: receipt.tx_hash,
            sell_amount: intent.amount,
            buy_amount,
            gas_used: receipt.gas_used,
            error,
            explorer_url: self.explorer_url(receipt),
        }
    }
}
