//! Transaction factories
//!
//! Factories turn a caller's intent (deploy, call, upgrade, transfer) into an
//! unsigned [`Transaction`]: arguments are validated and converted, call data
//! is built and the gas limit is computed from the config's gas schedule.

use mvx_primitives::{Address, BigUint};
use mvx_types::Transaction;
use tracing::debug;

use crate::abi::{convert_arguments, Abi, Argument, ParamDef};
use crate::call_data::CallDataBuilder;
use crate::config::TransactionsFactoryConfig;
use crate::contract::CodeMetadata;
use crate::gas::GasEstimator;
use crate::SdkError;

/// Intent to deploy a contract
#[derive(Debug, Clone, PartialEq)]
pub struct DeployInput {
    /// Deployer
    pub sender: Address,
    /// Contract bytecode
    pub bytecode: Vec<u8>,
    /// Gas for executing the constructor
    pub gas_limit: u64,
    /// Constructor arguments
    pub arguments: Vec<Argument>,
    /// Native amount sent to the contract
    pub native_transfer_amount: BigUint,
    /// Code metadata; the config's default when `None`
    pub metadata: Option<CodeMetadata>,
    /// Sender nonce
    pub nonce: u64,
}

impl DeployInput {
    /// Deploy `bytecode` from `sender` with no arguments
    pub fn new(sender: Address, bytecode: impl Into<Vec<u8>>, gas_limit: u64) -> Self {
        Self {
            sender,
            bytecode: bytecode.into(),
            gas_limit,
            arguments: Vec::new(),
            native_transfer_amount: BigUint::default(),
            metadata: None,
            nonce: 0,
        }
    }

    /// Set the constructor arguments
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set the code metadata
    pub fn with_metadata(mut self, metadata: CodeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the native amount
    pub fn with_native_transfer_amount(mut self, amount: impl Into<BigUint>) -> Self {
        self.native_transfer_amount = amount.into();
        self
    }

    /// Set the nonce
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

/// Intent to call a contract endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteInput {
    /// Caller
    pub sender: Address,
    /// Contract address
    pub contract: Address,
    /// Endpoint name
    pub function: String,
    /// Gas for executing the endpoint
    pub gas_limit: u64,
    /// Endpoint arguments
    pub arguments: Vec<Argument>,
    /// Native amount sent with the call
    pub native_transfer_amount: BigUint,
    /// Sender nonce
    pub nonce: u64,
}

impl ExecuteInput {
    /// Call `function` on `contract` with no arguments
    pub fn new(
        sender: Address,
        contract: Address,
        function: impl Into<String>,
        gas_limit: u64,
    ) -> Self {
        Self {
            sender,
            contract,
            function: function.into(),
            gas_limit,
            arguments: Vec::new(),
            native_transfer_amount: BigUint::default(),
            nonce: 0,
        }
    }

    /// Set the endpoint arguments
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set the native amount
    pub fn with_native_transfer_amount(mut self, amount: impl Into<BigUint>) -> Self {
        self.native_transfer_amount = amount.into();
        self
    }

    /// Set the nonce
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

/// Intent to upgrade a deployed contract
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeInput {
    /// Contract owner
    pub sender: Address,
    /// Contract address
    pub contract: Address,
    /// New bytecode
    pub bytecode: Vec<u8>,
    /// Gas for executing the upgrade constructor
    pub gas_limit: u64,
    /// Upgrade constructor arguments
    pub arguments: Vec<Argument>,
    /// Native amount sent to the contract
    pub native_transfer_amount: BigUint,
    /// Code metadata; the config's default when `None`
    pub metadata: Option<CodeMetadata>,
    /// Sender nonce
    pub nonce: u64,
}

impl UpgradeInput {
    /// Upgrade `contract` to `bytecode` with no arguments
    pub fn new(
        sender: Address,
        contract: Address,
        bytecode: impl Into<Vec<u8>>,
        gas_limit: u64,
    ) -> Self {
        Self {
            sender,
            contract,
            bytecode: bytecode.into(),
            gas_limit,
            arguments: Vec::new(),
            native_transfer_amount: BigUint::default(),
            metadata: None,
            nonce: 0,
        }
    }

    /// Set the upgrade constructor arguments
    pub fn with_arguments(mut self, arguments: Vec<Argument>) -> Self {
        self.arguments = arguments;
        self
    }

    /// Set the code metadata
    pub fn with_metadata(mut self, metadata: CodeMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the nonce
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

/// Builds deploy, execute and upgrade transactions
#[derive(Debug, Clone)]
pub struct SmartContractTransactionsFactory {
    config: TransactionsFactoryConfig,
    gas: GasEstimator,
    abi: Option<Abi>,
}

impl SmartContractTransactionsFactory {
    /// Factory without an ABI; arguments must be typed or pre-encoded
    pub fn new(config: TransactionsFactoryConfig) -> Self {
        Self {
            gas: GasEstimator::from_config(&config),
            config,
            abi: None,
        }
    }

    /// Factory converting native arguments with `abi`
    pub fn with_abi(config: TransactionsFactoryConfig, abi: Abi) -> Self {
        Self {
            abi: Some(abi),
            ..Self::new(config)
        }
    }

    /// Factory config
    pub fn config(&self) -> &TransactionsFactoryConfig {
        &self.config
    }

    /// Contract ABI, if any
    pub fn abi(&self) -> Option<&Abi> {
        self.abi.as_ref()
    }

    /// Deploy transaction; the receiver is the zero address
    pub fn create_transaction_for_deploy(&self, input: DeployInput) -> Result<Transaction, SdkError> {
        let params = self.abi.as_ref().map(|abi| abi.constructor().inputs.as_slice());
        let args = convert_arguments(&input.arguments, params)?;
        let metadata = input.metadata.unwrap_or(self.config.code_metadata);

        let data = CallDataBuilder::deploy(&input.bytecode, metadata)
            .arguments(&args)?
            .build_bytes();

        let mut tx = self.new_transaction(input.sender, Address::ZERO, data, input.gas_limit);
        tx.value = input.native_transfer_amount;
        tx.nonce = input.nonce;
        debug!(
            code_len = input.bytecode.len(),
            data_len = tx.data.len(),
            gas_limit = tx.gas_limit,
            "Built deploy transaction"
        );
        Ok(tx)
    }

    /// Contract call transaction
    pub fn create_transaction_for_execute(&self, input: ExecuteInput) -> Result<Transaction, SdkError> {
        let params = self.endpoint_inputs(&input.function)?;
        let args = convert_arguments(&input.arguments, params)?;

        let data = CallDataBuilder::execute(input.function.as_str())
            .arguments(&args)?
            .build_bytes();

        let mut tx = self.new_transaction(input.sender, input.contract, data, input.gas_limit);
        tx.value = input.native_transfer_amount;
        tx.nonce = input.nonce;
        debug!(
            function = %input.function,
            data_len = tx.data.len(),
            gas_limit = tx.gas_limit,
            "Built execute transaction"
        );
        Ok(tx)
    }

    /// Contract upgrade transaction
    pub fn create_transaction_for_upgrade(&self, input: UpgradeInput) -> Result<Transaction, SdkError> {
        let params = self
            .abi
            .as_ref()
            .map(|abi| abi.upgrade_constructor().inputs.as_slice());
        let args = convert_arguments(&input.arguments, params)?;
        let metadata = input.metadata.unwrap_or(self.config.code_metadata);

        let data = CallDataBuilder::upgrade(&input.bytecode, metadata)
            .arguments(&args)?
            .build_bytes();

        let mut tx = self.new_transaction(input.sender, input.contract, data, input.gas_limit);
        tx.value = input.native_transfer_amount;
        tx.nonce = input.nonce;
        debug!(
            contract = %input.contract,
            data_len = tx.data.len(),
            gas_limit = tx.gas_limit,
            "Built upgrade transaction"
        );
        Ok(tx)
    }

    fn endpoint_inputs(&self, function: &str) -> Result<Option<&[ParamDef]>, SdkError> {
        match &self.abi {
            Some(abi) => Ok(Some(abi.endpoint(function)?.inputs.as_slice())),
            None => Ok(None),
        }
    }

    fn new_transaction(
        &self,
        sender: Address,
        receiver: Address,
        data: bytes::Bytes,
        execution_gas: u64,
    ) -> Transaction {
        let gas_limit = self.gas.estimate(&data, execution_gas);
        let mut tx = Transaction::new(sender, receiver, gas_limit, self.config.chain_id.clone());
        tx.gas_price = self.config.min_gas_price;
        tx.version = self.config.transaction_version;
        tx.data = data;
        tx
    }
}

/// Intent to move native funds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTransferInput {
    /// Sender
    pub sender: Address,
    /// Receiver
    pub receiver: Address,
    /// Amount
    pub native_amount: BigUint,
    /// Optional note carried as call data
    pub data: Option<String>,
    /// Sender nonce
    pub nonce: u64,
}

impl NativeTransferInput {
    /// Transfer `amount` from `sender` to `receiver`
    pub fn new(sender: Address, receiver: Address, amount: impl Into<BigUint>) -> Self {
        Self {
            sender,
            receiver,
            native_amount: amount.into(),
            data: None,
            nonce: 0,
        }
    }

    /// Attach a note
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the nonce
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }
}

/// Builds plain transfer transactions
#[derive(Debug, Clone)]
pub struct TransferTransactionsFactory {
    config: TransactionsFactoryConfig,
    gas: GasEstimator,
}

impl TransferTransactionsFactory {
    /// Create a factory
    pub fn new(config: TransactionsFactoryConfig) -> Self {
        Self {
            gas: GasEstimator::from_config(&config),
            config,
        }
    }

    /// Native transfer; gas covers only the data
    pub fn create_transaction_for_native_transfer(&self, input: NativeTransferInput) -> Transaction {
        let data = bytes::Bytes::from(input.data.unwrap_or_default());
        let gas_limit = self.gas.minimum_gas(&data);

        let mut tx = Transaction::new(
            input.sender,
            input.receiver,
            gas_limit,
            self.config.chain_id.clone(),
        );
        tx.nonce = input.nonce;
        tx.value = input.native_amount;
        tx.gas_price = self.config.min_gas_price;
        tx.version = self.config.transaction_version;
        tx.data = data;
        debug!(data_len = tx.data.len(), gas_limit, "Built transfer transaction");
        tx
    }
}
