//! Gas limit estimation
//!
//! A transaction pays a fixed base, a per-byte charge for its data and
//! whatever the contract execution needs. The estimator only computes the
//! figure; it never rejects a transaction whose gas limit is too low.

use mvx_types::Transaction;

use crate::config::TransactionsFactoryConfig;

/// `base + per_byte * data_len + execution_gas`, saturating at `u64::MAX`
pub fn required_gas(base: u64, per_byte: u64, data_len: usize, execution_gas: u64) -> u64 {
    let data_len = u64::try_from(data_len).unwrap_or(u64::MAX);
    base.saturating_add(per_byte.saturating_mul(data_len))
        .saturating_add(execution_gas)
}

/// Gas estimator bound to a network's gas schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasEstimator {
    /// Base gas of any transaction
    pub min_gas_limit: u64,
    /// Gas per data byte
    pub gas_limit_per_byte: u64,
}

impl GasEstimator {
    /// Create an estimator
    pub fn new(min_gas_limit: u64, gas_limit_per_byte: u64) -> Self {
        Self {
            min_gas_limit,
            gas_limit_per_byte,
        }
    }

    /// Estimator using a factory config's gas schedule
    pub fn from_config(config: &TransactionsFactoryConfig) -> Self {
        Self::new(config.min_gas_limit, config.gas_limit_per_byte)
    }

    /// Gas for moving `data` without any execution
    pub fn minimum_gas(&self, data: &[u8]) -> u64 {
        self.estimate(data, 0)
    }

    /// Gas for `data` plus `execution_gas`
    pub fn estimate(&self, data: &[u8], execution_gas: u64) -> u64 {
        required_gas(
            self.min_gas_limit,
            self.gas_limit_per_byte,
            data.len(),
            execution_gas,
        )
    }

    /// Whether `tx` covers at least the data charge
    pub fn is_sufficient(&self, tx: &Transaction) -> bool {
        tx.gas_limit >= self.minimum_gas(&tx.data)
    }
}

impl Default for GasEstimator {
    fn default() -> Self {
        Self::from_config(&TransactionsFactoryConfig::default())
    }
}
