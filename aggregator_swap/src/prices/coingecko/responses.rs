use std::collections::HashMap;

/// `GET /simple/price`: coin id → quote currency → price
pub type CoinGeckoSimplePriceResponse = HashMap<String, HashMap<String, f64>>;
