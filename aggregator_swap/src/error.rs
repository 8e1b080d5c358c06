use error_stack::{AttachmentKind, FrameKind, Report};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type AggregatorResult<T> = error_stack::Result<T, Error>;

#[derive(Error, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Error {
    #[error("Quote provider {provider} answered with status {status}: {body}")]
    QuoteProviderError {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Price oracle error: {0}")]
    PriceOracleError(String),

    #[error("Approval transaction {0} reverted")]
    ApprovalFailedOnChain(String),

    #[error("Approval could not be submitted or confirmed")]
    ApprovalSubmissionTransient,

    #[error("Swap transaction {0} reverted")]
    SwapFailedOnChain(String),

    #[error("Transaction {tx_hash} not confirmed after {attempts} attempts")]
    ConfirmationTimeout { tx_hash: String, attempts: u32 },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid swap intent: {0}")]
    InvalidIntent(String),

    #[error("Parse error")]
    ParseError,

    #[error("Arithmetic error")]
    ArithmeticError,

    #[error("Reqwest error")]
    ReqwestError,

    #[error("Response error")]
    ResponseError,

    #[error("Chain client error: {0}")]
    ChainClientError(String),

    #[error("Signing error")]
    SigningError,

    #[error("Models error")]
    ModelsError,
}

pub trait ReportDisplayExt {
    fn format(&self) -> String;
}

impl ReportDisplayExt for Report<Error> {
    fn format(&self) -> String {
        let mut output = String::new();

        let frames = self.current_frames();

        for frame in frames.iter() {
            if let FrameKind::Attachment(AttachmentKind::Printable(attachment)) = frame.kind() {
                output.push_str(&format!(" {attachment} "));
            }
        }

        output.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use error_stack::report;

    #[test]
    fn test_format_report() {
        let report = report!(Error::ParseError).attach_printable("test1");
        assert_eq!("test1".to_string(), report.format());
    }

    #[test]
    fn test_quote_provider_error_display() {
        let error = Error::QuoteProviderError {
            provider: "0x".to_string(),
            status: 400,
            body: "{\"reason\":\"INSUFFICIENT_LIQUIDITY\"}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Quote provider 0x answered with status 400: {\"reason\":\"INSUFFICIENT_LIQUIDITY\"}"
        );
    }
}
