pub mod evm;

use alloy::{
    primitives::{Address, Bytes, TxHash, U256},
    sol,
    sol_types::SolCall,
};
use swap_models::models::{Receipt, TransactionRequest};

use crate::error::AggregatorResult;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ABI encoded `approve(spender, amount)`
pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

/// Unpriced call, used for gas estimation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Everything the swap flow needs from the chain. Nonce management and
/// transaction signing live behind `send_transaction`.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Address every transaction is sent from
    fn sender(&self) -> Address;

    async fn gas_price(&self) -> AggregatorResult<u128>;

    async fn estimate_gas(&self, call: &CallRequest) -> AggregatorResult<u64>;

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> AggregatorResult<U256>;

    /// Signs and broadcasts. Returns as soon as the node accepted the transaction.
    async fn send_transaction(&self, request: &TransactionRequest) -> AggregatorResult<TxHash>;

    /// `None` while the transaction is not mined yet
    async fn transaction_receipt(&self, tx_hash: TxHash) -> AggregatorResult<Option<Receipt>>;
}
