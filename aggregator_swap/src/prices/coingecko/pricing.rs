use error_stack::{ResultExt as _, report};
use rust_decimal::Decimal;
use swap_models::network::{
    client_rate_limit::Client,
    http::{handle_reqwest_response, value_to_sorted_querystring},
};

use crate::{
    error::{AggregatorResult, Error},
    prices::coingecko::responses::CoinGeckoSimplePriceResponse,
};

pub async fn coingecko_get_simple_price(
    client: &Client,
    base_url: &str,
    coin_id: &str,
) -> AggregatorResult<CoinGeckoSimplePriceResponse> {
    let query = serde_json::json!({
        "ids": coin_id,
        "vs_currencies": "usd",
    });
    let query_string = value_to_sorted_querystring(&query).change_context(Error::ParseError)?;
    let url = format!("{}/simple/price?{query_string}", base_url.trim_end_matches('/'));

    let request = client
        .inner_client()
        .get(&url)
        .build()
        .change_context(Error::ReqwestError)
        .attach_printable("Error building CoinGecko request")?;

    let response = client
        .execute(request)
        .await
        .change_context(Error::ReqwestError)
        .attach_printable("Error in CoinGecko request")?;

    handle_reqwest_response(response)
        .await
        .change_context(Error::ModelsError)
}

pub fn coin_usd_price(
    response: &CoinGeckoSimplePriceResponse,
    coin_id: &str,
) -> AggregatorResult<Decimal> {
    let price = response
        .get(coin_id)
        .and_then(|quotes| quotes.get("usd"))
        .copied()
        .ok_or_else(|| {
            report!(Error::PriceOracleError(format!(
                "CoinGecko has no USD price for {coin_id}"
            )))
        })?;

    if !price.is_finite() || price <= 0.0 {
        return Err(report!(Error::PriceOracleError(format!(
            "CoinGecko returned an invalid price {price} for {coin_id}"
        ))));
    }

    Decimal::try_from(price)
        .change_context(Error::ArithmeticError)
        .attach_printable_lazy(|| format!("Price {price} does not fit a Decimal"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn response(body: &str) -> CoinGeckoSimplePriceResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_coin_usd_price() {
        let body = response(r#"{"brazilian-real":{"usd":0.1843}}"#);
        assert_eq!(
            coin_usd_price(&body, "brazilian-real").unwrap(),
            Decimal::from_str("0.1843").unwrap()
        );
    }

    #[test]
    fn test_coin_usd_price_missing_coin() {
        let err = coin_usd_price(&response("{}"), "brazilian-real").unwrap_err();
        assert!(matches!(err.current_context(), Error::PriceOracleError(_)));

        let err =
            coin_usd_price(&response(r#"{"brazilian-real":{"eur":0.17}}"#), "brazilian-real")
                .unwrap_err();
        assert!(matches!(err.current_context(), Error::PriceOracleError(_)));
    }

    #[test]
    fn test_coin_usd_price_rejects_zero() {
        let err = coin_usd_price(&response(r#"{"brazilian-real":{"usd":0}}"#), "brazilian-real")
            .unwrap_err();
        assert!(matches!(err.current_context(), Error::PriceOracleError(_)));
    }

    #[tokio::test]
    #[ignore = "hits the live CoinGecko API"]
    async fn test_coingecko_get_simple_price() {
        let result = coingecko_get_simple_price(
            &Client::default(),
            crate::prices::coingecko::COINGECKO_API_URL,
            "usd-coin",
        )
        .await;
        println!("Result: {:#?}", result);
        assert!(result.is_ok());
    }
}
