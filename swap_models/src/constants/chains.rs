use error_stack::{Report, report};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::fmt;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, Hash)]
#[repr(u32)]
pub enum ChainId {
    Ethereum = 1,
    Optimism = 10,
    Bsc = 56,
    Polygon = 137,
    Monad = 143,
    HyperEVM = 999,
    Base = 8453,
    ArbitrumOne = 42161,
}

impl TryFrom<u32> for ChainId {
    type Error = Report<Error>;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        serde_json::from_str(&value.to_string()).map_err(|e| {
            Report::new(Error::ParseError)
                .attach_printable(format!("Failed to parse chain ID: {e}"))
        })
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ethereum => write!(f, "Ethereum"),
            Self::Optimism => write!(f, "Optimism"),
            Self::Bsc => write!(f, "BSC"),
            Self::Polygon => write!(f, "Polygon"),
            Self::Monad => write!(f, "Monad"),
            Self::HyperEVM => write!(f, "HyperEVM"),
            Self::Base => write!(f, "Base"),
            Self::ArbitrumOne => write!(f, "Arbitrum One"),
        }
    }
}

impl TryFrom<&str> for ChainId {
    type Error = Report<Error>;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Ethereum" | "1" => Ok(Self::Ethereum),
            "Optimism" | "10" => Ok(Self::Optimism),
            "Bsc" | "BSC" | "56" => Ok(Self::Bsc),
            "Polygon" | "137" => Ok(Self::Polygon),
            "Monad" | "143" => Ok(Self::Monad),
            "HyperEVM" | "999" => Ok(Self::HyperEVM),
            "Base" | "8453" => Ok(Self::Base),
            "ArbitrumOne" | "Arbitrum One" | "42161" => Ok(Self::ArbitrumOne),
            _ => Err(report!(Error::ChainError(format!(
                "Invalid chain name: {value}"
            )))),
        }
    }
}
