//! Keccak-256 and Blake2b-256 hashing

use blake2::digest::consts::U32;
use blake2::Blake2b;
use mvx_primitives::H256;
use sha3::{Digest, Keccak256};

type Blake2b256 = Blake2b<U32>;

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    H256::from_bytes(hasher.finalize().into())
}

/// Compute Blake2b hash with a 32-byte digest
pub fn blake2b_256(data: &[u8]) -> H256 {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    H256::from_bytes(hasher.finalize().into())
}
