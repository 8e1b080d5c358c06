use alloy::{
    dyn_abi::TypedData,
    primitives::{Bytes, U256},
    signers::{Signer as _, local::PrivateKeySigner},
};
use error_stack::ResultExt as _;
use serde_json::Value;
use tracing::debug;

use crate::error::{AggregatorResult, Error};

/// Signs EIP-712 permit messages handed out by a quote provider
#[async_trait::async_trait]
pub trait PermitSigner: Send + Sync {
    /// 65 byte `r ‖ s ‖ v` signature over the typed data
    async fn sign_typed_data(&self, typed_data: &Value) -> AggregatorResult<Bytes>;
}

pub struct LocalPermitSigner {
    signer: PrivateKeySigner,
}

impl LocalPermitSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }
}

impl std::fmt::Debug for LocalPermitSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalPermitSigner")
            .field("address", &self.signer.address())
            .finish()
    }
}

#[async_trait::async_trait]
impl PermitSigner for LocalPermitSigner {
    async fn sign_typed_data(&self, typed_data: &Value) -> AggregatorResult<Bytes> {
        let typed_data = parse_typed_data(typed_data)?;

        debug!("Signing {} permit", typed_data.primary_type);

        let signature = self
            .signer
            .sign_dynamic_typed_data(&typed_data)
            .await
            .change_context(Error::SigningError)?;

        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

/// JSON numbers become strings first. With `arbitrary_precision` enabled a
/// number above `u64::MAX` does not deserialize into `U256`, while EIP-712
/// coercion accepts decimal strings for every integer type.
pub fn parse_typed_data(typed_data: &Value) -> AggregatorResult<TypedData> {
    fn numbers_to_strings(value: &mut Value) {
        match value {
            Value::Number(number) => *value = Value::String(number.to_string()),
            Value::Array(items) => items.iter_mut().for_each(numbers_to_strings),
            Value::Object(object) => object.values_mut().for_each(numbers_to_strings),
            _ => {}
        }
    }

    let mut typed_data = typed_data.clone();
    numbers_to_strings(&mut typed_data);
    serde_json::from_value(typed_data)
        .change_context(Error::SigningError)
        .attach_printable("Invalid EIP-712 payload")
}

/// `calldata ‖ uint256(len(signature)) ‖ signature`, the layout the 0x
/// settler expects for a Permit2 signed swap
pub fn encode_permit_calldata(calldata: &[u8], signature: &[u8]) -> Bytes {
    let mut payload = Vec::with_capacity(calldata.len() + 32 + signature.len());
    payload.extend_from_slice(calldata);
    payload.extend_from_slice(&U256::from(signature.len()).to_be_bytes::<32>());
    payload.extend_from_slice(signature);
    payload.into()
}
