pub mod number_conversion;
pub mod retry;
pub mod sleep;
pub mod uint;
