//! # mvx-sdk
//!
//! Smart-contract transaction core.
//!
//! ## Features
//!
//! - **ABI**: typed values, top-level/nested codec and ABI JSON definitions
//! - **CallDataBuilder**: deploy, upgrade and execute call data
//! - **GasEstimator**: gas limits from data length and execution gas
//! - **AddressComputer**: contract addresses and shard assignment
//! - **SmartContractTransactionsFactory**: unsigned transactions from call intents
//! - **Signer**: async signing seam
//! - **ResultsParser**: return codes and values of processed calls
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mvx_sdk::abi::TypedValue;
//! use mvx_sdk::{
//!     sign_transaction, Address, ExecuteInput, MockSigner, SmartContractTransactionsFactory,
//!     TransactionComputer, TransactionsFactoryConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sender: Address = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th".parse()?;
//!     let contract: Address = "erd1qqqqqqqqqqqqqpgqhdjjyq8dr7v5yq9tv6v5vt9tfvd00vg7h40q6779zn".parse()?;
//!
//!     // Build an unsigned call to `add(7)`
//!     let factory = SmartContractTransactionsFactory::new(TransactionsFactoryConfig::new("D"));
//!     let mut tx = factory.create_transaction_for_execute(
//!         ExecuteInput::new(sender, contract, "add", 6_000_000)
//!             .with_arguments(vec![TypedValue::u32(7).into()]),
//!     )?;
//!     assert_eq!(&tx.data[..], b"add@07");
//!
//!     // Sign and hash
//!     let signer = MockSigner::new(sender);
//!     sign_transaction(&mut tx, &signer).await?;
//!     let hash = TransactionComputer::new().compute_transaction_hash(&tx)?;
//!     println!("Hash: {}", hash);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Parsing Results
//!
//! ```rust,no_run
//! use mvx_sdk::abi::Abi;
//! use mvx_sdk::{ExecutionRecord, ResultsParser};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let abi = Abi::from_json(r#"{"name":"adder","endpoints":[
//!         {"name":"getSum","inputs":[],"outputs":[{"type":"BigUint"}]}]}"#)?;
//!     let record = ExecutionRecord::from_json(r#"{"hash":"aa","smartContractResults":[
//!         {"nonce":1,"data":"@6f6b@2a"}]}"#)?;
//!
//!     let outcome = ResultsParser::new().parse_outcome(&record, abi.endpoint("getSum")?)?;
//!     println!("{} {:?}", outcome.return_code, outcome.values);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod call_data;
pub mod config;
pub mod contract;
mod error;
pub mod factory;
pub mod gas;
pub mod results;
mod signer;
mod tx_builder;

// Re-export main types
pub use call_data::{parse_call_data, CallDataBuilder};
pub use config::TransactionsFactoryConfig;
pub use contract::{compute_contract_address, AddressComputer, CodeMetadata};
pub use error::SdkError;
pub use factory::{
    DeployInput, ExecuteInput, NativeTransferInput, SmartContractTransactionsFactory,
    TransferTransactionsFactory, UpgradeInput,
};
pub use gas::{required_gas, GasEstimator};
pub use results::{
    OutcomeHeuristic, QueryResponse, ResultsParser, ReturnCode, TransactionMetadata,
    TypedOutcomeBundle, UntypedOutcomeBundle,
};

/// Re-export signing seams for custom implementations
pub use signer::{guardian_sign_transaction, sign_transaction, Account, MockSigner, NonceSource, Signer};
pub use tx_builder::TxBuilder;

// Re-export primitives for convenience
pub use mvx_primitives::{Address, BigUint, Gas, Nonce, H256};
pub use mvx_types::{
    ExecutionRecord, Transaction, TransactionComputer, TransactionOptions,
};
