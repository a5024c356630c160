//! Signing and account seams
//!
//! Key management lives outside this crate. Anything that can produce a
//! signature for an address implements [`Signer`]; anything that tracks an
//! account nonce implements [`NonceSource`].

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mvx_crypto::keccak256;
use mvx_primitives::Address;
use mvx_types::{Transaction, TransactionComputer};
use tracing::debug;

use crate::SdkError;

/// Produces signatures on behalf of one address (object-safe)
#[async_trait]
pub trait Signer: Send + Sync {
    /// Address whose key signs
    fn address(&self) -> Address;

    /// Sign `data` exactly as given
    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SdkError>;
}

/// Source of an account's next nonce
pub trait NonceSource {
    /// Nonce to use for the next transaction
    fn current_nonce(&self) -> u64;
}

/// Minimal account: an address and a locally tracked nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Account {
    /// Account address
    pub address: Address,
    /// Next nonce
    pub nonce: u64,
}

impl Account {
    /// Account starting at `nonce`
    pub fn new(address: Address, nonce: u64) -> Self {
        Self { address, nonce }
    }

    /// Return the current nonce and advance it
    pub fn next_nonce(&mut self) -> u64 {
        let nonce = self.nonce;
        self.nonce += 1;
        nonce
    }
}

impl NonceSource for Account {
    fn current_nonce(&self) -> u64 {
        self.nonce
    }
}

/// Sign `tx` with `signer` and attach the signature
///
/// The signing bytes are computed before the signer is awaited; a
/// signature already present is replaced.
pub async fn sign_transaction<S: Signer + ?Sized>(
    tx: &mut Transaction,
    signer: &S,
) -> Result<(), SdkError> {
    let payload = TransactionComputer::new().bytes_to_sign(tx)?;
    debug!(
        sender = %tx.sender,
        nonce = tx.nonce,
        payload_len = payload.len(),
        "Signing transaction"
    );
    let signature = signer.sign(&payload).await?;
    tx.apply_signature(signature);
    Ok(())
}

/// Sign `tx` as its guardian and attach the guardian signature
pub async fn guardian_sign_transaction<S: Signer + ?Sized>(
    tx: &mut Transaction,
    guardian: &S,
) -> Result<(), SdkError> {
    if tx.guardian != Some(guardian.address()) {
        return Err(SdkError::SigningFailed(format!(
            "{} is not the guardian of this transaction",
            guardian.address()
        )));
    }
    let payload = TransactionComputer::new().bytes_to_sign(tx)?;
    let signature = guardian.sign(&payload).await?;
    tx.apply_guardian_signature(signature);
    Ok(())
}

/// Deterministic signer for tests
///
/// Signatures are `keccak256(address || data) || keccak256(data)`: 64 bytes,
/// stable for the same inputs. Every signed payload is recorded.
#[derive(Debug, Clone)]
pub struct MockSigner {
    address: Address,
    fail: bool,
    signed: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockSigner {
    /// Signer for `address`
    pub fn new(address: Address) -> Self {
        Self {
            address,
            fail: false,
            signed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Signer that rejects every request
    pub fn failing(address: Address) -> Self {
        Self {
            fail: true,
            ..Self::new(address)
        }
    }

    /// Payloads signed so far
    pub fn signed_payloads(&self) -> Vec<Vec<u8>> {
        self.signed
            .lock()
            .map(|signed| signed.clone())
            .unwrap_or_default()
    }

    /// Signature this signer produces for `data`
    pub fn signature_for(&self, data: &[u8]) -> Vec<u8> {
        let mut preimage = self.address.as_bytes().to_vec();
        preimage.extend_from_slice(data);
        let mut signature = keccak256(&preimage).as_bytes().to_vec();
        signature.extend_from_slice(keccak256(data).as_bytes());
        signature
    }
}

#[async_trait]
impl Signer for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SdkError> {
        if self.fail {
            return Err(SdkError::SigningFailed("MockSigner set to fail".to_string()));
        }
        self.signed
            .lock()
            .map_err(|_| SdkError::SigningFailed("MockSigner mutex poisoned".to_string()))?
            .push(data.to_vec());
        Ok(self.signature_for(data))
    }
}
