pub mod pricing;
pub mod responses;

// https://docs.coingecko.com/reference/simple-price
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
