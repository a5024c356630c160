//! # mvx-types
//!
//! Core transaction types for the mvx SDK.
//!
//! This crate provides:
//! - [`Transaction`](transaction::Transaction) - Transaction model with options and signatures
//! - [`TransactionComputer`](transaction::TransactionComputer) - Signing bytes and transaction hash
//! - [`ExecutionRecord`](execution::ExecutionRecord) - Execution results as reported by the network

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod execution;
pub mod transaction;

// Re-export commonly used types
pub use execution::{
    ContractResult, ExecutionReceipt, ExecutionRecord, LogEvent, TransactionLogs,
    TransactionStatus,
};
pub use transaction::{
    Transaction, TransactionComputer, TransactionError, TransactionOptions,
    DEFAULT_GAS_PRICE, DEFAULT_TRANSACTION_VERSION, MIN_VERSION_WITH_OPTIONS,
};
