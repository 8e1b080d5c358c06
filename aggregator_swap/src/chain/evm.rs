use alloy::{
    network::{EthereumWallet, ReceiptResponse as _, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest as RpcTransactionRequest,
    signers::local::PrivateKeySigner,
};
use error_stack::ResultExt as _;
use swap_models::models::{Receipt, ReceiptStatus, TransactionRequest};
use tracing::debug;

use crate::{
    chain::{CallRequest, ChainClient, IERC20},
    error::{AggregatorResult, Error},
};

/// JSON-RPC backed chain client. The wallet filler signs with the local key
/// and the nonce filler assigns nonces.
#[derive(Clone)]
pub struct AlloyChainClient {
    provider: DynProvider,
    sender: Address,
}

impl std::fmt::Debug for AlloyChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlloyChainClient")
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl AlloyChainClient {
    pub async fn connect(rpc_url: &str, signer: PrivateKeySigner) -> AggregatorResult<Self> {
        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect(rpc_url)
            .await
            .change_context(Error::ChainClientError(
                "Failed to connect to RPC".to_string(),
            ))
            .attach_printable_lazy(|| format!("RPC url: {rpc_url}"))?
            .erased();

        Ok(Self { provider, sender })
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyChainClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn gas_price(&self) -> AggregatorResult<u128> {
        self.provider
            .get_gas_price()
            .await
            .change_context(Error::ChainClientError(
                "Failed to fetch gas price".to_string(),
            ))
    }

    async fn estimate_gas(&self, call: &CallRequest) -> AggregatorResult<u64> {
        let request = RpcTransactionRequest::default()
            .with_from(call.from)
            .with_to(call.to)
            .with_input(call.data.clone())
            .with_value(call.value);

        self.provider
            .estimate_gas(request)
            .await
            .change_context(Error::ChainClientError(
                "Failed to estimate gas".to_string(),
            ))
            .attach_printable_lazy(|| format!("Call to {}", call.to))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> AggregatorResult<U256> {
        IERC20::new(token, self.provider.clone())
            .allowance(owner, spender)
            .call()
            .await
            .change_context(Error::ChainClientError(
                "Failed to read allowance".to_string(),
            ))
            .attach_printable_lazy(|| format!("Token {token}, owner {owner}, spender {spender}"))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> AggregatorResult<TxHash> {
        let tx = RpcTransactionRequest::default()
            .with_from(request.from)
            .with_to(request.to)
            .with_input(request.data.clone())
            .with_value(request.value)
            .with_gas_limit(request.gas_limit)
            .with_gas_price(request.gas_price);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .change_context(Error::ChainClientError(
                "Failed to send transaction".to_string(),
            ))
            .attach_printable_lazy(|| format!("Transaction to {}", request.to))?;

        let tx_hash = *pending.tx_hash();
        debug!("Transaction {tx_hash} accepted by the node");
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: TxHash) -> AggregatorResult<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .change_context(Error::ChainClientError(
                "Failed to fetch receipt".to_string(),
            ))
            .attach_printable_lazy(|| format!("Transaction {tx_hash}"))?;

        Ok(receipt.map(|receipt| Receipt {
            tx_hash,
            status: if receipt.status() {
                ReceiptStatus::Success
            } else {
                ReceiptStatus::Failure
            },
            gas_used: receipt.gas_used,
        }))
    }
}
