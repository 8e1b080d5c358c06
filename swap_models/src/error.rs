use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ModelResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Parse error")]
    ParseError,

    #[error("Reqwest error: {0}")]
    ReqwestError(String),

    /// Upstream answered with a non-success status code
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Chain error: {0}")]
    ChainError(String),

    #[error("Serde deserialize error: {0}")]
    SerdeDeserialize(String),

    #[error("Logic error: {0}")]
    LogicError(String),
}
