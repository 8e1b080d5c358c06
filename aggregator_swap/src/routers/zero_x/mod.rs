pub mod requests;
pub mod responses;
pub mod zero_x;

pub use zero_x::ZeroXProvider;

// https://0x.org/docs/api#tag/Swap/operation/swap::permit2::getQuote
const ZERO_X_PERMIT2_QUOTE_PATH: &str = "swap/permit2/quote";
