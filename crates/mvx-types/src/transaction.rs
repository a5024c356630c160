//! Transaction model, signing bytes and transaction hash

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use mvx_crypto::{blake2b_256, keccak256};
use mvx_primitives::{Address, AddressError, BigUint, H256, DEFAULT_HRP};
use serde::Serialize;
use thiserror::Error;

use crate::codec;

/// Default gas price (1 gwei-equivalent unit)
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;

/// Transaction version produced by default
pub const DEFAULT_TRANSACTION_VERSION: u32 = 2;

/// Lowest version allowed to carry a non-zero options field
pub const MIN_VERSION_WITH_OPTIONS: u32 = 2;

/// Transaction validation and serialization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// The chain id is mandatory
    #[error("chain id is empty")]
    EmptyChainId,

    /// Options were set on a transaction whose version cannot carry them
    #[error("options require version >= {MIN_VERSION_WITH_OPTIONS}, got version {version}")]
    OptionsRequireVersion {
        /// Transaction version
        version: u32,
    },

    /// Guarded option set without a guardian address
    #[error("guarded transaction has no guardian")]
    MissingGuardian,

    /// Transaction hash requested before a signature was applied
    #[error("transaction is not signed")]
    Unsigned,

    /// Address could not be rendered
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// JSON serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Transaction option flags
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TransactionOptions(u32);

impl TransactionOptions {
    /// Sign the keccak-256 hash of the signing bytes instead of the bytes themselves
    pub const HASH_SIGN: TransactionOptions = TransactionOptions(0b01);

    /// Transaction is co-signed by a guardian
    pub const GUARDED: TransactionOptions = TransactionOptions(0b10);

    /// No options set
    pub const fn empty() -> Self {
        TransactionOptions(0)
    }

    /// Build from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        TransactionOptions(bits)
    }

    /// Raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// True when no flag is set
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when every flag in `other` is set
    pub const fn contains(&self, other: TransactionOptions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the flags in `other`
    pub fn insert(&mut self, other: TransactionOptions) {
        self.0 |= other.0;
    }
}

impl std::ops::BitOr for TransactionOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        TransactionOptions(self.0 | rhs.0)
    }
}

/// A transaction as submitted to the network
///
/// All fields except the signatures are public; signatures are attached with
/// [`Transaction::apply_signature`] and [`Transaction::apply_guardian_signature`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Sender address
    pub sender: Address,
    /// Receiver address (the zero address for contract deployments)
    pub receiver: Address,
    /// Optional sender username (empty when unset)
    pub sender_username: String,
    /// Optional receiver username (empty when unset)
    pub receiver_username: String,
    /// Sender account nonce
    pub nonce: u64,
    /// Native amount transferred
    pub value: BigUint,
    /// Gas price
    pub gas_price: u64,
    /// Gas limit
    pub gas_limit: u64,
    /// Call data
    pub data: Bytes,
    /// Chain identifier
    pub chain_id: String,
    /// Transaction version
    pub version: u32,
    /// Option flags
    pub options: TransactionOptions,
    /// Guardian address for guarded transactions
    pub guardian: Option<Address>,
    signature: Option<Vec<u8>>,
    guardian_signature: Option<Vec<u8>>,
}

impl Transaction {
    /// Create an unsigned transaction with default price, version and no data
    pub fn new(
        sender: Address,
        receiver: Address,
        gas_limit: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            receiver,
            sender_username: String::new(),
            receiver_username: String::new(),
            nonce: 0,
            value: BigUint::default(),
            gas_price: DEFAULT_GAS_PRICE,
            gas_limit,
            data: Bytes::new(),
            chain_id: chain_id.into(),
            version: DEFAULT_TRANSACTION_VERSION,
            options: TransactionOptions::empty(),
            guardian: None,
            signature: None,
            guardian_signature: None,
        }
    }

    /// Attach the sender's signature, replacing any previous one
    pub fn apply_signature(&mut self, signature: Vec<u8>) {
        self.signature = Some(signature);
    }

    /// Attach the guardian's signature
    pub fn apply_guardian_signature(&mut self, signature: Vec<u8>) {
        self.guardian_signature = Some(signature);
    }

    /// Sender signature, if any
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }

    /// Guardian signature, if any
    pub fn guardian_signature(&self) -> Option<&[u8]> {
        self.guardian_signature.as_deref()
    }

    /// True once a non-empty sender signature is attached
    pub fn is_signed(&self) -> bool {
        self.signature.as_ref().is_some_and(|s| !s.is_empty())
    }

    /// True when the transaction is deploying a contract
    pub fn is_contract_deploy(&self) -> bool {
        self.receiver.is_zero()
    }
}

/// JSON document whose bytes are signed. Field order is significant.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SigningPayload<'a> {
    nonce: u64,
    value: String,
    receiver: String,
    sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    receiver_username: Option<String>,
    gas_price: u64,
    gas_limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "chainID")]
    chain_id: &'a str,
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guardian: Option<String>,
}

fn non_empty_base64(bytes: &[u8]) -> Option<String> {
    (!bytes.is_empty()).then(|| BASE64.encode(bytes))
}

/// Computes the bytes to sign and the hash of transactions
#[derive(Clone, Debug, Default)]
pub struct TransactionComputer {
    hrp: Option<String>,
}

impl TransactionComputer {
    /// Computer rendering addresses with the default `erd` prefix
    pub fn new() -> Self {
        Self::default()
    }

    /// Computer rendering addresses with a custom bech32 prefix
    pub fn with_hrp(hrp: impl Into<String>) -> Self {
        Self {
            hrp: Some(hrp.into()),
        }
    }

    fn hrp(&self) -> &str {
        self.hrp.as_deref().unwrap_or(DEFAULT_HRP)
    }

    /// Check the fields the signing document depends on
    pub fn validate(&self, tx: &Transaction) -> Result<(), TransactionError> {
        if tx.chain_id.is_empty() {
            return Err(TransactionError::EmptyChainId);
        }
        if !tx.options.is_empty() && tx.version < MIN_VERSION_WITH_OPTIONS {
            return Err(TransactionError::OptionsRequireVersion {
                version: tx.version,
            });
        }
        if tx.options.contains(TransactionOptions::GUARDED) && tx.guardian.is_none() {
            return Err(TransactionError::MissingGuardian);
        }
        Ok(())
    }

    /// Canonical JSON bytes of the transaction, excluding signatures
    pub fn compute_bytes_for_signing(&self, tx: &Transaction) -> Result<Vec<u8>, TransactionError> {
        self.validate(tx)?;

        let hrp = self.hrp();
        let guardian = match &tx.guardian {
            Some(g) => Some(g.to_bech32(hrp)?),
            None => None,
        };

        let payload = SigningPayload {
            nonce: tx.nonce,
            value: tx.value.to_string(),
            receiver: tx.receiver.to_bech32(hrp)?,
            sender: tx.sender.to_bech32(hrp)?,
            sender_username: non_empty_base64(tx.sender_username.as_bytes()),
            receiver_username: non_empty_base64(tx.receiver_username.as_bytes()),
            gas_price: tx.gas_price,
            gas_limit: tx.gas_limit,
            data: non_empty_base64(&tx.data),
            chain_id: &tx.chain_id,
            version: tx.version,
            options: (!tx.options.is_empty()).then(|| tx.options.bits()),
            guardian,
        };

        serde_json::to_vec(&payload).map_err(|e| TransactionError::Serialization(e.to_string()))
    }

    /// Keccak-256 of the signing bytes
    pub fn compute_hash_for_signing(&self, tx: &Transaction) -> Result<H256, TransactionError> {
        Ok(keccak256(&self.compute_bytes_for_signing(tx)?))
    }

    /// Whether the transaction asks for its hash to be signed
    pub fn has_options_set_for_hash_signing(&self, tx: &Transaction) -> bool {
        tx.options.contains(TransactionOptions::HASH_SIGN)
    }

    /// Bytes a signer must sign: the JSON document, or its hash when the
    /// hash-signing option is set
    pub fn bytes_to_sign(&self, tx: &Transaction) -> Result<Vec<u8>, TransactionError> {
        if self.has_options_set_for_hash_signing(tx) {
            return Ok(self.compute_hash_for_signing(tx)?.as_bytes().to_vec());
        }
        self.compute_bytes_for_signing(tx)
    }

    /// Transaction hash: blake2b-256 of the protobuf serialization
    pub fn compute_transaction_hash(&self, tx: &Transaction) -> Result<H256, TransactionError> {
        if !tx.is_signed() {
            return Err(TransactionError::Unsigned);
        }
        self.validate(tx)?;
        Ok(blake2b_256(&codec::encode_transaction(tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    const BOB: &str = "erd1spyavw0956vq68xj8y4tenjpq2wd5a9p2c6j8gsz7ztyrnpxrruqzu66jx";
    const SIGNATURE: &str = "eaa9e4dfbd21695d9511e9754bde13e90c5cfb21748a339a79be11f744c71872\
                             e9fe8e73c6035c413f5f08eef09e5458e9ea6fc315ff4da0ab6d000b450b2a07";

    fn alice() -> Address {
        Address::from_bech32(ALICE).unwrap()
    }

    fn bob() -> Address {
        Address::from_bech32(BOB).unwrap()
    }

    fn transfer(nonce: u64) -> Transaction {
        let mut tx = Transaction::new(alice(), bob(), 50_000, "D");
        tx.nonce = nonce;
        tx
    }

    // ==================== Signing bytes ====================

    #[test]
    fn test_signing_bytes_minimal() {
        let tx = transfer(89);
        let bytes = TransactionComputer::new().compute_bytes_for_signing(&tx).unwrap();
        let expected = format!(
            r#"{{"nonce":89,"value":"0","receiver":"{}","sender":"{}","gasPrice":1000000000,"gasLimit":50000,"chainID":"D","version":2}}"#,
            BOB, ALICE
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_signing_bytes_with_data_and_value() {
        let mut tx = transfer(90);
        tx.value = BigUint::from(10u64).pow(18);
        tx.data = Bytes::from_static(b"hello");
        let bytes = TransactionComputer::new().compute_bytes_for_signing(&tx).unwrap();
        let expected = format!(
            r#"{{"nonce":90,"value":"1000000000000000000","receiver":"{}","sender":"{}","gasPrice":1000000000,"gasLimit":50000,"data":"aGVsbG8=","chainID":"D","version":2}}"#,
            BOB, ALICE
        );
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_signing_bytes_usernames_base64() {
        let mut tx = transfer(1);
        tx.sender_username = "alice".to_string();
        tx.receiver_username = "bob".to_string();
        let json = String::from_utf8(
            TransactionComputer::new().compute_bytes_for_signing(&tx).unwrap(),
        )
        .unwrap();
        assert!(json.contains(r#""senderUsername":"YWxpY2U=","receiverUsername":"Ym9i","gasPrice""#));
    }

    #[test]
    fn test_signing_bytes_ignore_signature() {
        let tx = transfer(7);
        let mut signed = tx.clone();
        signed.apply_signature(vec![0xaa; 64]);
        let computer = TransactionComputer::new();
        assert_eq!(
            computer.compute_bytes_for_signing(&tx).unwrap(),
            computer.compute_bytes_for_signing(&signed).unwrap()
        );
    }

    #[test]
    fn test_signing_bytes_guarded() {
        let mut tx = transfer(1);
        tx.options = TransactionOptions::GUARDED;
        tx.guardian = Some(bob());
        let json = String::from_utf8(
            TransactionComputer::new().compute_bytes_for_signing(&tx).unwrap(),
        )
        .unwrap();
        assert!(json.ends_with(&format!(r#""version":2,"options":2,"guardian":"{}"}}"#, BOB)));
    }

    // ==================== Validation ====================

    #[test]
    fn test_empty_chain_id_rejected() {
        let mut tx = transfer(1);
        tx.chain_id.clear();
        assert_eq!(
            TransactionComputer::new().compute_bytes_for_signing(&tx),
            Err(TransactionError::EmptyChainId)
        );
    }

    #[test]
    fn test_options_require_version_two() {
        let mut tx = transfer(1);
        tx.version = 1;
        tx.options = TransactionOptions::HASH_SIGN;
        assert_eq!(
            TransactionComputer::new().compute_bytes_for_signing(&tx),
            Err(TransactionError::OptionsRequireVersion { version: 1 })
        );
    }

    #[test]
    fn test_guarded_without_guardian_rejected() {
        let mut tx = transfer(1);
        tx.options = TransactionOptions::GUARDED;
        assert_eq!(
            TransactionComputer::new().compute_bytes_for_signing(&tx),
            Err(TransactionError::MissingGuardian)
        );
    }

    // ==================== Hash signing ====================

    #[test]
    fn test_bytes_to_sign_with_hash_option() {
        let mut tx = transfer(89);
        tx.options = TransactionOptions::HASH_SIGN;
        let computer = TransactionComputer::new();
        let to_sign = computer.bytes_to_sign(&tx).unwrap();
        assert_eq!(
            hex::encode(to_sign),
            "7eebc10d1e4c2bcaef872d19b1429d12c6ce74a1e6ba3372612eae365490bb3f"
        );
    }

    #[test]
    fn test_bytes_to_sign_without_hash_option_is_json() {
        let tx = transfer(89);
        let computer = TransactionComputer::new();
        assert_eq!(
            computer.bytes_to_sign(&tx).unwrap(),
            computer.compute_bytes_for_signing(&tx).unwrap()
        );
    }

    // ==================== Transaction hash ====================

    #[test]
    fn test_transaction_hash_unsigned() {
        let tx = transfer(1);
        assert_eq!(
            TransactionComputer::new().compute_transaction_hash(&tx),
            Err(TransactionError::Unsigned)
        );
    }

    #[test]
    fn test_transaction_hash_known_vector() {
        let mut tx = Transaction::new(alice(), bob(), 100_000, "D");
        tx.nonce = 17243;
        tx.value = BigUint::from(1_000_000_000_000u64);
        tx.data = Bytes::from_static(b"testtx");
        tx.apply_signature(hex::decode(SIGNATURE).unwrap());
        let hash = TransactionComputer::new().compute_transaction_hash(&tx).unwrap();
        assert_eq!(
            hash.to_hex(),
            "fe831aa732aa1fdfb8c96091c6c900895f9635fe4af4c337e98fa3445a032604"
        );
    }

    #[test]
    fn test_transaction_hash_changes_with_signature() {
        let computer = TransactionComputer::new();
        let mut a = transfer(3);
        a.apply_signature(vec![1u8; 64]);
        let mut b = transfer(3);
        b.apply_signature(vec![2u8; 64]);
        assert_ne!(
            computer.compute_transaction_hash(&a).unwrap(),
            computer.compute_transaction_hash(&b).unwrap()
        );
    }

    // ==================== Options ====================

    #[test]
    fn test_options_flags() {
        let both = TransactionOptions::HASH_SIGN | TransactionOptions::GUARDED;
        assert_eq!(both.bits(), 3);
        assert!(both.contains(TransactionOptions::GUARDED));
        assert!(!TransactionOptions::HASH_SIGN.contains(TransactionOptions::GUARDED));
        assert!(TransactionOptions::default().is_empty());
    }

    #[test]
    fn test_is_signed_requires_non_empty() {
        let mut tx = transfer(1);
        assert!(!tx.is_signed());
        tx.apply_signature(Vec::new());
        assert!(!tx.is_signed());
        tx.apply_signature(vec![1]);
        assert!(tx.is_signed());
    }
}
