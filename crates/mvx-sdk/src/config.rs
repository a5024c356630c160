//! Factory configuration

use mvx_primitives::DEFAULT_HRP;
use mvx_types::{DEFAULT_GAS_PRICE, DEFAULT_TRANSACTION_VERSION};
use serde::{Deserialize, Serialize};

use crate::contract::CodeMetadata;
use crate::SdkError;

/// Network parameters used when building transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsFactoryConfig {
    /// Chain identifier, e.g. "D" for devnet
    pub chain_id: String,
    /// Gas charged for any transaction
    #[serde(default = "default_min_gas_limit")]
    pub min_gas_limit: u64,
    /// Gas charged per byte of data
    #[serde(default = "default_gas_limit_per_byte")]
    pub gas_limit_per_byte: u64,
    /// Gas price set on new transactions
    #[serde(default = "default_min_gas_price")]
    pub min_gas_price: u64,
    /// Version set on new transactions
    #[serde(default = "default_transaction_version")]
    pub transaction_version: u32,
    /// Bech32 prefix for addresses
    #[serde(default = "default_address_hrp")]
    pub address_hrp: String,
    /// Metadata used for deploys that do not specify one
    #[serde(default)]
    pub code_metadata: CodeMetadata,
}

fn default_min_gas_limit() -> u64 {
    50_000
}

fn default_gas_limit_per_byte() -> u64 {
    1_500
}

fn default_min_gas_price() -> u64 {
    DEFAULT_GAS_PRICE
}

fn default_transaction_version() -> u32 {
    DEFAULT_TRANSACTION_VERSION
}

fn default_address_hrp() -> String {
    DEFAULT_HRP.to_string()
}

impl Default for TransactionsFactoryConfig {
    fn default() -> Self {
        Self::new("D")
    }
}

impl TransactionsFactoryConfig {
    /// Config with network defaults for the given chain
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            min_gas_limit: default_min_gas_limit(),
            gas_limit_per_byte: default_gas_limit_per_byte(),
            min_gas_price: default_min_gas_price(),
            transaction_version: default_transaction_version(),
            address_hrp: default_address_hrp(),
            code_metadata: CodeMetadata::default(),
        }
    }

    /// Load from JSON; omitted fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        Ok(serde_json::from_str(json)?)
    }
}
