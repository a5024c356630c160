//! Call data construction
//!
//! Call data is the transaction payload the VM reads: a head segment
//! followed by `@`-separated lower-case hex arguments.
//!
//! - deploy: `<code hex>@0500@<metadata hex>@<args>`
//! - upgrade: `upgradeContract@<code hex>@<metadata hex>@<args>`
//! - execute: `<function>@<args>`

use bytes::Bytes;

use crate::abi::{encode_arguments, PreparedArg, TypedValue};
use crate::contract::{CodeMetadata, VM_TYPE_WASM};
use crate::SdkError;

/// Function name used in upgrade call data
pub const UPGRADE_FUNCTION: &str = "upgradeContract";

/// Separator between call data segments
pub const ARGUMENT_SEPARATOR: char = '@';

/// Builder for `@`-separated call data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDataBuilder {
    head: String,
    args: Vec<Vec<u8>>,
}

impl CallDataBuilder {
    /// Deploy data for `code`
    pub fn deploy(code: &[u8], metadata: CodeMetadata) -> Self {
        Self {
            head: hex::encode(code),
            args: vec![VM_TYPE_WASM.to_vec(), metadata.to_bytes().to_vec()],
        }
    }

    /// Upgrade data for `code`
    pub fn upgrade(code: &[u8], metadata: CodeMetadata) -> Self {
        Self {
            head: UPGRADE_FUNCTION.to_string(),
            args: vec![code.to_vec(), metadata.to_bytes().to_vec()],
        }
    }

    /// Execute data calling `function`
    pub fn execute(function: impl Into<String>) -> Self {
        Self {
            head: function.into(),
            args: Vec::new(),
        }
    }

    /// Append an already encoded argument
    pub fn arg_encoded(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.args.push(bytes.into());
        self
    }

    /// Append a typed value; optional and variadic values may add zero or
    /// several arguments
    pub fn arg_typed(mut self, value: &TypedValue) -> Result<Self, SdkError> {
        self.args.extend(encode_arguments(value)?);
        Ok(self)
    }

    /// Append prepared arguments in order
    pub fn arguments(mut self, args: &[PreparedArg]) -> Result<Self, SdkError> {
        for arg in args {
            match arg {
                PreparedArg::Value(value) => self.args.extend(encode_arguments(value)?),
                PreparedArg::Encoded(bytes) => self.args.push(bytes.clone()),
            }
        }
        Ok(self)
    }

    /// Encoded argument count
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    /// Call data as a string
    pub fn build(&self) -> String {
        let mut out = self.head.clone();
        for arg in &self.args {
            out.push(ARGUMENT_SEPARATOR);
            out.push_str(&hex::encode(arg));
        }
        out
    }

    /// Call data as transaction payload bytes
    pub fn build_bytes(&self) -> Bytes {
        Bytes::from(self.build())
    }
}

/// Split call data into its head and decoded arguments
///
/// An empty segment decodes to an empty buffer.
pub fn parse_call_data(data: &str) -> Result<(String, Vec<Vec<u8>>), SdkError> {
    let mut parts = data.split(ARGUMENT_SEPARATOR);
    let head = parts.next().unwrap_or_default().to_string();
    let args = parts
        .map(hex::decode)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((head, args))
}
