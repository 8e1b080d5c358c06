use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Fully priced transaction, ready to be signed and submitted once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    /// Native value in wei
    pub value: U256,
    pub gas_limit: u64,
    /// Legacy gas price in wei
    pub gas_price: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Failure,
}

/// Mined transaction outcome. Once observed it is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub status: ReceiptStatus,
    pub gas_used: u64,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}
