//! # mvx-crypto
//!
//! Hash functions used by the transaction core.
//!
//! - Keccak-256 (contract addresses, hash-based signing)
//! - Blake2b-256 (transaction hashes)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{blake2b_256, keccak256};
