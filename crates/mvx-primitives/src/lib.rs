//! # mvx-primitives
//!
//! Primitive types for the mvx smart-contract SDK.
//!
//! This crate provides the fundamental data types used throughout the system:
//! 32-byte account addresses (hex and bech32 forms), 256-bit hashes and the
//! arbitrary-precision unsigned integer used for token amounts.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod error;
mod hash;

pub use address::{Address, AddressError, DEFAULT_HRP};
pub use error::PrimitiveError;
pub use hash::{Hash, HashError, H256};

// Re-export num-bigint for token amounts
pub use num_bigint::BigUint;

/// Account nonce type
pub type Nonce = u64;

/// Gas type
pub type Gas = u64;

/// Parse a base-10 unsigned integer of arbitrary size
///
/// Leading `+`, signs, whitespace and underscores are rejected; the empty
/// string is not zero.
pub fn parse_biguint(s: &str) -> Result<BigUint, PrimitiveError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrimitiveError::InvalidInteger(s.to_string()));
    }
    BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| PrimitiveError::InvalidInteger(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_biguint_large() {
        let v = parse_biguint("1000000000000000000000").unwrap();
        assert_eq!(v, BigUint::from(10u64).pow(21));
    }

    #[test]
    fn test_parse_biguint_zero() {
        assert_eq!(parse_biguint("0").unwrap(), BigUint::from(0u8));
    }

    #[test]
    fn test_parse_biguint_rejects_garbage() {
        for bad in ["", "-1", "+1", "1_000", " 1", "0x10", "1.5"] {
            assert_eq!(
                parse_biguint(bad),
                Err(PrimitiveError::InvalidInteger(bad.to_string())),
                "input {:?}",
                bad
            );
        }
    }
}
