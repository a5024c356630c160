//! Contract deployment helpers: code metadata and contract addresses

use std::fmt;

use mvx_crypto::keccak256;
use mvx_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::SdkError;

/// VM type written into deploy and upgrade data (WASM VM)
pub const VM_TYPE_WASM: [u8; 2] = [0x05, 0x00];

/// Shard id reported for metachain addresses
pub const METACHAIN_SHARD_ID: u32 = u32::MAX;

/// Number of shards assumed when none is configured
pub const DEFAULT_NUMBER_OF_SHARDS: u32 = 3;

const METACHAIN_PREFIX_LEN: usize = 20;

const UPGRADEABLE: u8 = 0x01;
const READABLE: u8 = 0x04;
const PAYABLE: u8 = 0x02;
const PAYABLE_BY_SC: u8 = 0x04;

/// Contract properties declared at deploy/upgrade time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeMetadata {
    /// Code can be upgraded by the owner
    pub upgradeable: bool,
    /// Storage can be read by other contracts
    pub readable: bool,
    /// Accepts native transfers from users
    pub payable: bool,
    /// Accepts native transfers from contracts
    pub payable_by_sc: bool,
}

impl Default for CodeMetadata {
    fn default() -> Self {
        Self {
            upgradeable: true,
            readable: true,
            payable: false,
            payable_by_sc: true,
        }
    }
}

impl CodeMetadata {
    /// Two-byte wire form
    pub fn to_bytes(&self) -> [u8; 2] {
        let mut first = 0;
        let mut second = 0;
        if self.upgradeable {
            first |= UPGRADEABLE;
        }
        if self.readable {
            first |= READABLE;
        }
        if self.payable {
            second |= PAYABLE;
        }
        if self.payable_by_sc {
            second |= PAYABLE_BY_SC;
        }
        [first, second]
    }

    /// Parse the two-byte wire form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SdkError> {
        let [first, second] = <[u8; 2]>::try_from(bytes).map_err(|_| {
            SdkError::Serialization(format!(
                "code metadata must be 2 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self {
            upgradeable: first & UPGRADEABLE != 0,
            readable: first & READABLE != 0,
            payable: second & PAYABLE != 0,
            payable_by_sc: second & PAYABLE_BY_SC != 0,
        })
    }
}

impl fmt::Display for CodeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_bytes()))
    }
}

/// Address of the contract a deployer creates at a given nonce
///
/// `keccak256(deployer || nonce_le)`, then eight zero bytes, the VM type,
/// bytes 10..30 of the hash and the deployer's last two bytes (which keep
/// the contract in the deployer's shard).
pub fn compute_contract_address(deployer: &Address, nonce: u64) -> Address {
    let mut preimage = Vec::with_capacity(Address::LEN + 8);
    preimage.extend_from_slice(deployer.as_bytes());
    preimage.extend_from_slice(&nonce.to_le_bytes());
    let hash = keccak256(&preimage);

    let mut out = [0u8; 32];
    out[8..10].copy_from_slice(&VM_TYPE_WASM);
    out[10..30].copy_from_slice(&hash.as_bytes()[10..30]);
    out[30..32].copy_from_slice(&deployer.as_bytes()[30..32]);
    Address::from_bytes(out)
}

/// Contract address and shard computations for a network layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressComputer {
    number_of_shards: u32,
}

impl Default for AddressComputer {
    fn default() -> Self {
        Self {
            number_of_shards: DEFAULT_NUMBER_OF_SHARDS,
        }
    }
}

impl AddressComputer {
    /// Computer for a network with `number_of_shards` shards (at least one)
    pub fn new(number_of_shards: u32) -> Self {
        Self {
            number_of_shards: number_of_shards.max(1),
        }
    }

    /// Number of shards
    pub fn number_of_shards(&self) -> u32 {
        self.number_of_shards
    }

    /// See [`compute_contract_address`]
    pub fn compute_contract_address(&self, deployer: &Address, nonce: u64) -> Address {
        compute_contract_address(deployer, nonce)
    }

    /// Shard an address belongs to; [`METACHAIN_SHARD_ID`] for system addresses
    pub fn shard_of_address(&self, address: &Address) -> u32 {
        let bytes = address.as_bytes();
        if bytes[..METACHAIN_PREFIX_LEN].iter().all(|b| *b == 0) {
            return METACHAIN_SHARD_ID;
        }
        if self.number_of_shards == 1 {
            return 0;
        }

        let n = u32::BITS - (self.number_of_shards - 1).leading_zeros();
        let mask_high = (1u32 << n) - 1;
        let mask_low = (1u32 << (n - 1)) - 1;
        let last = u32::from(bytes[Address::LEN - 1]);

        let shard = last & mask_high;
        if shard > self.number_of_shards - 1 {
            last & mask_low
        } else {
            shard
        }
    }
}
