//! Common error types for primitives

use crate::address::AddressError;
use crate::hash::HashError;
use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Address error
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// Hash error
    #[error("hash error: {0}")]
    Hash(#[from] HashError),

    /// Malformed unsigned integer literal
    #[error("invalid unsigned integer: {0:?}")]
    InvalidInteger(String),
}
