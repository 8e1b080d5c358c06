use crate::error::{Error, ModelResult};
use error_stack::{ResultExt, report};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::value::Value;
use tracing::{debug, error};

/// Converts a JSON Value into a sorted URL query string
///
/// Takes a JSON object and converts it to a query string with parameters
/// sorted alphabetically by key. `null` values are skipped, strings are used
/// verbatim and every other value uses its JSON representation.
///
/// # Errors
///
/// Returns `Error::ParseError` if the input value is not a JSON object.
pub fn value_to_sorted_querystring(value: &Value) -> ModelResult<String> {
    let mut pairs: Vec<(String, String)> = match value {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Null))
            .map(|(k, v)| {
                let value_str = match v {
                    Value::String(s) => s.to_string(),
                    _ => v.to_string(),
                };
                (k.clone(), value_str)
            })
            .collect(),
        _ => {
            return Err(report!(Error::ParseError)
                .attach_printable(format!("Invalid JSON Object: {value:?}")));
        }
    };

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<String>>()
        .join("&"))
}

/// Reads the body of an upstream response and deserializes it.
///
/// Any status outside `0..=399` becomes `Error::HttpStatus` carrying the
/// status code and the raw body so callers can surface both.
pub async fn handle_reqwest_response<T: DeserializeOwned>(response: Response) -> ModelResult<T> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .change_context(Error::ReqwestError(
            "Failed to get text from response".to_string(),
        ))?;

    parse_response_body(status, &body)
}

pub fn parse_response_body<T: DeserializeOwned>(status: u16, body: &str) -> ModelResult<T> {
    match status {
        0..=399 => {
            debug!("Response body: {body}");
            serde_json::from_str(body).change_context(Error::SerdeDeserialize(
                "Failed to deserialize JSON".to_string(),
            ))
        }
        _ => {
            error!("Error status {status}, body: {body}");
            Err(report!(Error::HttpStatus {
                status,
                body: body.to_string(),
            }))
        }
    }
}
