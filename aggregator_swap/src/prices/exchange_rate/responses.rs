use std::collections::HashMap;

use serde::Deserialize;

/// `GET /latest/{base}`: units of each currency per one unit of `base_code`
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRateResponse {
    pub result: String,
    #[serde(default)]
    pub base_code: String,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}
