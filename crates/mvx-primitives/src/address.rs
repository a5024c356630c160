//! Account address type (32-byte public key, bech32 encoded for humans)

use std::fmt;
use std::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};
use thiserror::Error;

/// Human-readable part used by the network's bech32 addresses
pub const DEFAULT_HRP: &str = "erd";

/// Number of leading zero bytes shared by all smart-contract addresses
const SMART_CONTRACT_PREFIX_LEN: usize = 8;

/// Address parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
    /// Malformed bech32 string (bad checksum, charset or variant)
    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),
    /// Bech32 string with an unexpected human-readable part
    #[error("wrong address prefix: expected {expected}, got {got}")]
    WrongHrp {
        /// Expected prefix
        expected: String,
        /// Actual prefix
        got: String,
    },
}

/// 32-byte account address
///
/// User accounts carry an ed25519 public key; smart contracts carry a
/// derived identifier starting with eight zero bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Address([u8; 32]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 32;

    /// Zero address, also the receiver of contract deployments
    pub const ZERO: Address = Address([0u8; 32]);

    /// Create address from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }

    /// Create address from slice
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != Self::LEN {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse address from hex string (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parse a bech32 address, accepting any human-readable part
    pub fn from_bech32(s: &str) -> Result<Self, AddressError> {
        let (_, address) = decode_bech32(s)?;
        Ok(address)
    }

    /// Parse a bech32 address and check its human-readable part
    pub fn from_bech32_with_hrp(s: &str, hrp: &str) -> Result<Self, AddressError> {
        let (got, address) = decode_bech32(s)?;
        if got != hrp {
            return Err(AddressError::WrongHrp {
                expected: hrp.to_string(),
                got,
            });
        }
        Ok(address)
    }

    /// Encode as bech32 with the given human-readable part
    pub fn to_bech32(&self, hrp: &str) -> Result<String, AddressError> {
        bech32::encode(hrp, self.0.to_base32(), Variant::Bech32)
            .map_err(|e| AddressError::InvalidBech32(e.to_string()))
    }

    /// Get as byte array
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero address
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Check whether the address belongs to a smart contract
    pub fn is_smart_contract(&self) -> bool {
        self.0[..SMART_CONTRACT_PREFIX_LEN].iter().all(|b| *b == 0)
    }

    /// Convert to lower-case hex string (no prefix)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

fn decode_bech32(s: &str) -> Result<(String, Address), AddressError> {
    let (hrp, data, variant) =
        bech32::decode(s).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    if variant != Variant::Bech32 {
        return Err(AddressError::InvalidBech32("expected bech32, got bech32m".to_string()));
    }
    let bytes =
        Vec::<u8>::from_base32(&data).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;
    Ok((hrp, Address::from_slice(&bytes)?))
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_bech32(DEFAULT_HRP).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Accepts bech32 (any prefix) or 64-character hex
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        if trimmed.len() == Self::LEN * 2 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Self::from_hex(trimmed);
        }
        Self::from_bech32(s)
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Serde implementation (behind feature flag)
#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let encoded = self
                .to_bech32(DEFAULT_HRP)
                .map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&encoded)
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_BECH32: &str = "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th";
    const ALICE_HEX: &str = "0139472eff6886771a982f3083da5d421f24c29181e63888228dc81ca60d69e1";
    const CONTRACT_BECH32: &str = "erd1qqqqqqqqqqqqqpgqhy6nl6zq07rnzry8uyh6rtyq0uzgtk3e69fqgtz9l4";
    const CONTRACT_HEX: &str = "00000000000000000500b9353fe8407f87310c87e12fa1ac807f0485da39d152";

    // ==================== Bech32 ====================

    #[test]
    fn test_address_from_bech32() {
        let addr = Address::from_bech32(ALICE_BECH32).unwrap();
        assert_eq!(addr.to_hex(), ALICE_HEX);
    }

    #[test]
    fn test_address_to_bech32() {
        let addr = Address::from_hex(ALICE_HEX).unwrap();
        assert_eq!(addr.to_bech32("erd").unwrap(), ALICE_BECH32);
        assert_eq!(addr.to_string(), ALICE_BECH32);
    }

    #[test]
    fn test_zero_address_bech32() {
        assert_eq!(
            Address::ZERO.to_string(),
            "erd1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq6gq4hu"
        );
    }

    #[test]
    fn test_address_wrong_hrp() {
        let result = Address::from_bech32_with_hrp(ALICE_BECH32, "xyz");
        match result {
            Err(AddressError::WrongHrp { expected, got }) => {
                assert_eq!(expected, "xyz");
                assert_eq!(got, "erd");
            }
            other => panic!("Expected WrongHrp error, got {:?}", other),
        }
    }

    #[test]
    fn test_address_bad_checksum() {
        let mut corrupted = ALICE_BECH32.to_string();
        corrupted.pop();
        corrupted.push('q');
        assert!(matches!(
            Address::from_bech32(&corrupted),
            Err(AddressError::InvalidBech32(_))
        ));
    }

    #[test]
    fn test_address_bech32_wrong_payload_length() {
        let short = bech32::encode("erd", [1u8; 20].to_base32(), Variant::Bech32).unwrap();
        assert_eq!(
            Address::from_bech32(&short),
            Err(AddressError::InvalidLength(20))
        );
    }

    // ==================== Hex parsing ====================

    #[test]
    fn test_address_from_hex_with_prefix() {
        let a = Address::from_hex(ALICE_HEX).unwrap();
        let b = Address::from_hex(&format!("0x{}", ALICE_HEX)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_address_from_hex_invalid_chars() {
        let result = Address::from_hex(&"zz".repeat(32));
        assert!(matches!(result, Err(AddressError::InvalidHex(_))));
    }

    #[test]
    fn test_address_from_hex_too_short() {
        let result = Address::from_hex(&ALICE_HEX[..62]);
        assert_eq!(result, Err(AddressError::InvalidLength(31)));
    }

    #[test]
    fn test_address_from_slice_empty() {
        assert_eq!(Address::from_slice(&[]), Err(AddressError::InvalidLength(0)));
    }

    // ==================== FromStr ====================

    #[test]
    fn test_address_parse_either_form() {
        let from_bech: Address = ALICE_BECH32.parse().unwrap();
        let from_hex: Address = ALICE_HEX.parse().unwrap();
        assert_eq!(from_bech, from_hex);
    }

    // ==================== Smart contract detection ====================

    #[test]
    fn test_is_smart_contract() {
        let contract = Address::from_bech32(CONTRACT_BECH32).unwrap();
        assert_eq!(contract.to_hex(), CONTRACT_HEX);
        assert!(contract.is_smart_contract());

        let user = Address::from_bech32(ALICE_BECH32).unwrap();
        assert!(!user.is_smart_contract());
    }

    #[test]
    fn test_address_debug() {
        let addr = Address::from_hex(ALICE_HEX).unwrap();
        assert_eq!(format!("{:?}", addr), format!("Address({})", ALICE_HEX));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_address_serde_bech32() {
        let addr = Address::from_hex(ALICE_HEX).unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", ALICE_BECH32));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
