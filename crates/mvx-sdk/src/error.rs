//! SDK error types

use thiserror::Error;

use crate::abi::{ConversionFailure, DecodeError};

/// SDK error type
#[derive(Debug, Error)]
pub enum SdkError {
    /// One or more native arguments could not be converted to their declared types
    #[error("Type conversion failed for {} argument(s): {}", .failures.len(), summarize(.failures))]
    TypeConversion {
        /// Every failing argument of the pass
        failures: Vec<ConversionFailure>,
    },

    /// ABI encoding error
    #[error("ABI encoding error: {0}")]
    AbiEncode(String),

    /// ABI decoding error
    #[error("ABI decoding error: {0}")]
    AbiDecode(#[from] DecodeError),

    /// Malformed ABI definition
    #[error("ABI definition error: {0}")]
    AbiDefinition(String),

    /// Endpoint not present in the ABI
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// The results parser could not locate an outcome
    #[error("Outcome not found: {0}")]
    OutcomeNotFound(String),

    /// Transaction validation or hashing error
    #[error("Transaction error: {0}")]
    Transaction(#[from] mvx_types::TransactionError),

    /// Invalid address format
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}

fn summarize(failures: &[ConversionFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<mvx_primitives::AddressError> for SdkError {
    fn from(e: mvx_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}
