//! Protobuf encoding of transactions.
//!
//! Transaction hashes are computed over the same protobuf layout the network
//! uses on the wire. Only the encoder is needed: hashes never require parsing
//! the bytes back.

use bytes::{BufMut, Bytes, BytesMut};
use num_bigint::BigUint;

use crate::transaction::{Transaction, TransactionOptions};

// ============================================================================
// Field numbers
// ============================================================================

const FIELD_NONCE: u32 = 1;
const FIELD_VALUE: u32 = 2;
const FIELD_RCV_ADDR: u32 = 3;
const FIELD_RCV_USERNAME: u32 = 4;
const FIELD_SND_ADDR: u32 = 5;
const FIELD_SND_USERNAME: u32 = 6;
const FIELD_GAS_PRICE: u32 = 7;
const FIELD_GAS_LIMIT: u32 = 8;
const FIELD_DATA: u32 = 9;
const FIELD_CHAIN_ID: u32 = 10;
const FIELD_VERSION: u32 = 11;
const FIELD_SIGNATURE: u32 = 12;
const FIELD_OPTIONS: u32 = 13;
const FIELD_GUARDIAN_ADDR: u32 = 14;
const FIELD_GUARDIAN_SIGNATURE: u32 = 15;

const WIRE_VARINT: u32 = 0;
const WIRE_LEN: u32 = 2;

// ============================================================================
// Writer
// ============================================================================

/// Minimal protobuf writer for varint and length-delimited fields
#[derive(Debug, Default)]
pub struct ProtoWriter {
    buf: BytesMut,
}

impl ProtoWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a varint field
    pub fn write_varint_field(&mut self, field: u32, value: u64) {
        self.write_key(field, WIRE_VARINT);
        self.write_varint(value);
    }

    /// Write a length-delimited field
    pub fn write_bytes_field(&mut self, field: u32, value: &[u8]) {
        self.write_key(field, WIRE_LEN);
        self.write_varint(value.len() as u64);
        self.buf.put_slice(value);
    }

    /// Finish and return the encoded bytes
    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }

    fn write_key(&mut self, field: u32, wire_type: u32) {
        self.write_varint(u64::from((field << 3) | wire_type));
    }

    fn write_varint(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.buf.put_u8((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }
}

// ============================================================================
// Transaction Encoding
// ============================================================================

/// Serialize a value as the network's big-integer bytes: a zero sign byte
/// followed by big-endian magnitude; zero is `[0, 0]`.
pub fn encode_value(value: &BigUint) -> Vec<u8> {
    if value.bits() == 0 {
        return vec![0, 0];
    }
    let mut out = Vec::with_capacity(1 + value.bits() as usize / 8 + 1);
    out.push(0);
    out.extend_from_slice(&value.to_bytes_be());
    out
}

/// Encode a transaction (including signatures) to protobuf bytes.
///
/// The caller is responsible for checking that the transaction is signed.
pub fn encode_transaction(tx: &Transaction) -> Bytes {
    let mut w = ProtoWriter::new();

    if tx.nonce != 0 {
        w.write_varint_field(FIELD_NONCE, tx.nonce);
    }
    w.write_bytes_field(FIELD_VALUE, &encode_value(&tx.value));
    w.write_bytes_field(FIELD_RCV_ADDR, tx.receiver.as_bytes());
    if !tx.receiver_username.is_empty() {
        w.write_bytes_field(FIELD_RCV_USERNAME, tx.receiver_username.as_bytes());
    }
    w.write_bytes_field(FIELD_SND_ADDR, tx.sender.as_bytes());
    if !tx.sender_username.is_empty() {
        w.write_bytes_field(FIELD_SND_USERNAME, tx.sender_username.as_bytes());
    }
    w.write_varint_field(FIELD_GAS_PRICE, tx.gas_price);
    w.write_varint_field(FIELD_GAS_LIMIT, tx.gas_limit);
    if !tx.data.is_empty() {
        w.write_bytes_field(FIELD_DATA, &tx.data);
    }
    w.write_bytes_field(FIELD_CHAIN_ID, tx.chain_id.as_bytes());
    w.write_varint_field(FIELD_VERSION, u64::from(tx.version));
    w.write_bytes_field(FIELD_SIGNATURE, tx.signature().unwrap_or_default());
    if !tx.options.is_empty() {
        w.write_varint_field(FIELD_OPTIONS, u64::from(tx.options.bits()));
    }
    if tx.options.contains(TransactionOptions::GUARDED) {
        if let Some(guardian) = &tx.guardian {
            w.write_bytes_field(FIELD_GUARDIAN_ADDR, guardian.as_bytes());
            w.write_bytes_field(
                FIELD_GUARDIAN_SIGNATURE,
                tx.guardian_signature().unwrap_or_default(),
            );
        }
    }

    w.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mvx_primitives::Address;

    // ==================== Varint ====================

    #[test]
    fn test_varint_single_byte() {
        let mut w = ProtoWriter::new();
        w.write_varint_field(1, 1);
        assert_eq!(w.finish().as_ref(), &[0x08, 0x01]);
    }

    #[test]
    fn test_varint_multi_byte() {
        let mut w = ProtoWriter::new();
        w.write_varint_field(1, 300);
        assert_eq!(w.finish().as_ref(), &[0x08, 0xac, 0x02]);
    }

    #[test]
    fn test_varint_u64_max() {
        let mut w = ProtoWriter::new();
        w.write_varint_field(1, u64::MAX);
        let bytes = w.finish();
        assert_eq!(bytes.len(), 11);
        assert_eq!(bytes[10], 0x01);
    }

    #[test]
    fn test_bytes_field() {
        let mut w = ProtoWriter::new();
        w.write_bytes_field(10, b"D");
        assert_eq!(w.finish().as_ref(), &[0x52, 0x01, b'D']);
    }

    // ==================== Value ====================

    #[test]
    fn test_encode_value_zero() {
        assert_eq!(encode_value(&BigUint::from(0u8)), vec![0, 0]);
    }

    #[test]
    fn test_encode_value_nonzero() {
        assert_eq!(
            encode_value(&BigUint::from(1_000_000_000_000u64)),
            vec![0x00, 0xe8, 0xd4, 0xa5, 0x10, 0x00]
        );
    }

    // ==================== Transaction ====================

    #[test]
    fn test_encode_transaction_layout() {
        let alice = Address::from_hex(
            "0139472eff6886771a982f3083da5d421f24c29181e63888228dc81ca60d69e1",
        )
        .unwrap();
        let bob = Address::from_hex(
            "8049d639e5a6980d1cd2392abcce41029cda74a1563523a202f09641cc2618f8",
        )
        .unwrap();
        let mut tx = Transaction::new(alice, bob, 100_000, "D");
        tx.nonce = 17243;
        tx.value = BigUint::from(1_000_000_000_000u64);
        tx.data = Bytes::from_static(b"testtx");
        tx.apply_signature(hex::decode(
            "eaa9e4dfbd21695d9511e9754bde13e90c5cfb21748a339a79be11f744c71872\
             e9fe8e73c6035c413f5f08eef09e5458e9ea6fc315ff4da0ab6d000b450b2a07",
        )
        .unwrap());

        let encoded = encode_transaction(&tx);
        assert_eq!(
            hex::encode(&encoded),
            "08db8601120600e8d4a510001a208049d639e5a6980d1cd2392abcce41029cda74a1\
             563523a202f09641cc2618f82a200139472eff6886771a982f3083da5d421f24c2\
             9181e63888228dc81ca60d69e1388094ebdc0340a08d064a067465737474785201\
             4458026240eaa9e4dfbd21695d9511e9754bde13e90c5cfb21748a339a79be11f7\
             44c71872e9fe8e73c6035c413f5f08eef09e5458e9ea6fc315ff4da0ab6d000b45\
             0b2a07"
        );
    }

    #[test]
    fn test_encode_transaction_zero_nonce_omitted() {
        let mut tx = Transaction::new(Address::ZERO, Address::ZERO, 0, "T");
        tx.apply_signature(vec![1u8; 64]);
        let encoded = encode_transaction(&tx);
        // First field must be the value (field 2), not the nonce
        assert_eq!(encoded[0], 0x12);
    }
}
