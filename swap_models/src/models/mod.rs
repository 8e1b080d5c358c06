pub mod allowance;
pub mod intent;
pub mod transaction;

pub use allowance::AllowanceState;
pub use intent::{SwapIntent, SwapResult};
pub use transaction::{Receipt, ReceiptStatus, TransactionRequest};
