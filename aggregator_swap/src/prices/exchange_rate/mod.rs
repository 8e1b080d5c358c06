pub mod pricing;
pub mod responses;

// https://www.exchangerate-api.com/docs/free
pub const EXCHANGE_RATE_API_URL: &str = "https://open.er-api.com/v6";
