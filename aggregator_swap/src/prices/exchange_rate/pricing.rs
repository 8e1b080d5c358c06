use error_stack::{ResultExt as _, report};
use rust_decimal::Decimal;
use swap_models::network::{client_rate_limit::Client, http::handle_reqwest_response};

use crate::{
    error::{AggregatorResult, Error},
    prices::exchange_rate::responses::ExchangeRateResponse,
};

pub async fn exchange_rate_get_latest_usd(
    client: &Client,
    base_url: &str,
) -> AggregatorResult<ExchangeRateResponse> {
    let url = format!("{}/latest/USD", base_url.trim_end_matches('/'));

    let request = client
        .inner_client()
        .get(&url)
        .build()
        .change_context(Error::ReqwestError)
        .attach_printable("Error building exchange rate request")?;

    let response = client
        .execute(request)
        .await
        .change_context(Error::ReqwestError)
        .attach_printable("Error in exchange rate request")?;

    handle_reqwest_response(response)
        .await
        .change_context(Error::ModelsError)
}

/// USD value of one unit of `currency`, from a USD based rate table
pub fn currency_usd_rate(
    response: &ExchangeRateResponse,
    currency: &str,
) -> AggregatorResult<Decimal> {
    if response.result != "success" || !response.base_code.eq_ignore_ascii_case("USD") {
        return Err(report!(Error::PriceOracleError(format!(
            "Unusable exchange rate table: result {}, base {}",
            response.result, response.base_code
        ))));
    }

    let rate = response
        .rates
        .get(&currency.to_uppercase())
        .copied()
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| {
            report!(Error::PriceOracleError(format!(
                "No usable USD rate for {currency}"
            )))
        })?;

    let rate = Decimal::try_from(rate).change_context(Error::ArithmeticError)?;
    Decimal::ONE
        .checked_div(rate)
        .ok_or_else(|| report!(Error::ArithmeticError))
}
