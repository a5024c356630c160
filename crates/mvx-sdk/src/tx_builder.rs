//! Transaction builder

use bytes::Bytes;
use mvx_primitives::{Address, BigUint};
use mvx_types::{Transaction, TransactionOptions, DEFAULT_GAS_PRICE, DEFAULT_TRANSACTION_VERSION};

use crate::signer::{sign_transaction, Signer};
use crate::SdkError;

/// Transaction builder with fluent API
#[derive(Debug, Clone)]
pub struct TxBuilder {
    chain_id: String,
    sender: Option<Address>,
    receiver: Option<Address>,
    nonce: u64,
    value: BigUint,
    gas_price: u64,
    gas_limit: Option<u64>,
    data: Bytes,
    version: u32,
    options: TransactionOptions,
    guardian: Option<Address>,
}

impl TxBuilder {
    /// Create a new transaction builder
    pub fn new(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            sender: None,
            receiver: None,
            nonce: 0,
            value: BigUint::default(),
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit: None,
            data: Bytes::new(),
            version: DEFAULT_TRANSACTION_VERSION,
            options: TransactionOptions::empty(),
            guardian: None,
        }
    }

    /// Set the sender address
    pub fn sender(mut self, address: Address) -> Self {
        self.sender = Some(address);
        self
    }

    /// Set the receiver address
    pub fn receiver(mut self, address: Address) -> Self {
        self.receiver = Some(address);
        self
    }

    /// Set the nonce
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Set the native amount to transfer
    pub fn value(mut self, value: impl Into<BigUint>) -> Self {
        self.value = value.into();
        self
    }

    /// Set the gas price
    pub fn gas_price(mut self, price: u64) -> Self {
        self.gas_price = price;
        self
    }

    /// Set the gas limit
    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = Some(limit);
        self
    }

    /// Set the call data
    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = data.into();
        self
    }

    /// Set the transaction version
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Set the option flags
    pub fn options(mut self, options: TransactionOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the guardian and the guarded option
    pub fn guardian(mut self, guardian: Address) -> Self {
        self.guardian = Some(guardian);
        self.options.insert(TransactionOptions::GUARDED);
        self
    }

    /// Build an unsigned transaction
    pub fn build(&self) -> Result<Transaction, SdkError> {
        let sender = self.sender.ok_or(SdkError::MissingField("sender".to_string()))?;
        let receiver = self.receiver.ok_or(SdkError::MissingField("receiver".to_string()))?;
        let gas_limit = self.gas_limit.ok_or(SdkError::MissingField("gas_limit".to_string()))?;
        if self.chain_id.is_empty() {
            return Err(SdkError::MissingField("chain_id".to_string()));
        }

        let mut tx = Transaction::new(sender, receiver, gas_limit, self.chain_id.clone());
        tx.nonce = self.nonce;
        tx.value = self.value.clone();
        tx.gas_price = self.gas_price;
        tx.data = self.data.clone();
        tx.version = self.version;
        tx.options = self.options;
        tx.guardian = self.guardian;
        Ok(tx)
    }

    /// Build and sign with `signer`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required fields are missing (sender, receiver, gas_limit, chain_id)
    /// - The signing document cannot be computed
    /// - The signer fails
    pub async fn sign<S: Signer + ?Sized>(&self, signer: &S) -> Result<Transaction, SdkError> {
        let mut tx = self.build()?;
        sign_transaction(&mut tx, signer).await?;
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::MockSigner;

    fn alice() -> Address {
        Address::from_bytes([0x01; 32])
    }

    fn bob() -> Address {
        Address::from_bytes([0x02; 32])
    }

    #[test]
    fn test_tx_builder_defaults() {
        let tx = TxBuilder::new("D")
            .sender(alice())
            .receiver(bob())
            .gas_limit(50_000)
            .build()
            .unwrap();

        assert_eq!(tx.nonce, 0);
        assert_eq!(tx.gas_price, 1_000_000_000);
        assert_eq!(tx.version, 2);
        assert_eq!(tx.chain_id, "D");
        assert!(tx.options.is_empty());
        assert!(!tx.is_signed());
    }

    #[test]
    fn test_tx_builder_all_fields() {
        let tx = TxBuilder::new("T")
            .sender(alice())
            .receiver(bob())
            .nonce(7)
            .value(1_000u64)
            .gas_price(2_000_000_000)
            .gas_limit(70_000)
            .data(&b"hello"[..])
            .options(TransactionOptions::HASH_SIGN)
            .build()
            .unwrap();

        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.value, BigUint::from(1_000u64));
        assert_eq!(tx.gas_price, 2_000_000_000);
        assert_eq!(tx.gas_limit, 70_000);
        assert_eq!(&tx.data[..], b"hello");
        assert!(tx.options.contains(TransactionOptions::HASH_SIGN));
    }

    #[test]
    fn test_tx_builder_guardian_sets_option() {
        let guardian = Address::from_bytes([0x03; 32]);
        let tx = TxBuilder::new("D")
            .sender(alice())
            .receiver(bob())
            .gas_limit(50_000)
            .guardian(guardian)
            .build()
            .unwrap();

        assert_eq!(tx.guardian, Some(guardian));
        assert!(tx.options.contains(TransactionOptions::GUARDED));
    }

    #[test]
    fn test_tx_builder_missing_fields() {
        let err = TxBuilder::new("D").receiver(bob()).gas_limit(1).build().unwrap_err();
        assert!(matches!(err, SdkError::MissingField(f) if f == "sender"));

        let err = TxBuilder::new("D").sender(alice()).receiver(bob()).build().unwrap_err();
        assert!(matches!(err, SdkError::MissingField(f) if f == "gas_limit"));

        let err = TxBuilder::new("")
            .sender(alice())
            .receiver(bob())
            .gas_limit(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, SdkError::MissingField(f) if f == "chain_id"));
    }

    #[tokio::test]
    async fn test_tx_builder_sign() {
        let signer = MockSigner::new(alice());
        let tx = TxBuilder::new("D")
            .sender(alice())
            .receiver(bob())
            .gas_limit(50_000)
            .sign(&signer)
            .await
            .unwrap();

        assert!(tx.is_signed());
        assert_eq!(tx.signature().map(<[u8]>::len), Some(64));
    }
}
