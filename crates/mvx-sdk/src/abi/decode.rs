//! ABI decoding
//!
//! Decoding never truncates or pads: running out of bytes, leftover bytes
//! where the input must be consumed exactly, unknown presence markers and
//! values outside the target width are all errors. Every error names the
//! field path and byte offset where it happened.

use std::fmt;

use mvx_primitives::{Address, BigUint};
use thiserror::Error;

use super::encode::is_valid_token_identifier;
use super::types::{NumType, StructType, Type};
use super::value::{Numeric, StructValue, TypedValue};

/// Root path used when the caller does not name the decoded value
pub const ROOT_PATH: &str = "value";

/// What went wrong while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Input ended before the value was complete
    UnexpectedEnd {
        /// Bytes required from the offset
        needed: usize,
        /// Bytes available from the offset
        available: usize,
    },
    /// Bytes left over after the value
    TrailingBytes {
        /// Number of unread bytes
        count: usize,
    },
    /// Presence or boolean marker other than 0 or 1
    InvalidMarker(u8),
    /// Integer does not fit the target type
    OutOfRange(String),
    /// Token identifier is not printable ASCII
    InvalidTokenIdentifier,
    /// Type cannot be decoded in this context
    Unsupported(String),
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::UnexpectedEnd { needed, available } => {
                write!(f, "unexpected end of input: need {} bytes, have {}", needed, available)
            }
            DecodeErrorKind::TrailingBytes { count } => write!(f, "{} trailing bytes", count),
            DecodeErrorKind::InvalidMarker(m) => write!(f, "invalid marker byte 0x{:02x}", m),
            DecodeErrorKind::OutOfRange(msg) => write!(f, "value out of range: {}", msg),
            DecodeErrorKind::InvalidTokenIdentifier => f.write_str("invalid token identifier"),
            DecodeErrorKind::Unsupported(msg) => write!(f, "unsupported: {}", msg),
        }
    }
}

/// Decoding error with the location it occurred at
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at {path} (offset {offset})")]
pub struct DecodeError {
    /// Field path, e.g. `output[1].amount`
    pub path: String,
    /// Byte offset within the decoded buffer
    pub offset: usize,
    /// Failure kind
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    fn new(path: &str, offset: usize, kind: DecodeErrorKind) -> Self {
        Self {
            path: path.to_string(),
            offset,
            kind,
        }
    }
}

/// Cursor over an input buffer
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn read(&mut self, n: usize, path: &str) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::new(
                path,
                self.pos,
                DecodeErrorKind::UnexpectedEnd {
                    needed: n,
                    available: self.remaining(),
                },
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self, path: &str) -> Result<u8, DecodeError> {
        Ok(self.read(1, path)?[0])
    }

    fn read_length(&mut self, path: &str) -> Result<usize, DecodeError> {
        let bytes = self.read(4, path)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
    }

    fn read_length_prefixed(&mut self, path: &str) -> Result<&'a [u8], DecodeError> {
        let len = self.read_length(path)?;
        self.read(len, path)
    }

    fn finish(&self, path: &str) -> Result<(), DecodeError> {
        if !self.is_empty() {
            return Err(DecodeError::new(
                path,
                self.pos,
                DecodeErrorKind::TrailingBytes {
                    count: self.remaining(),
                },
            ));
        }
        Ok(())
    }
}

// ==================== Public API ====================

/// Decode a whole buffer as a top-level value
///
/// An `optional` type always decodes as present, since a buffer exists;
/// absent optionals are missing arguments and never reach this function.
pub fn decode_top_level(data: &[u8], ty: &Type) -> Result<TypedValue, DecodeError> {
    decode_top_level_at(data, ty, ROOT_PATH)
}

/// Decode a top-level value, reporting errors under `path`
pub fn decode_top_level_at(data: &[u8], ty: &Type, path: &str) -> Result<TypedValue, DecodeError> {
    match ty {
        Type::Num(n) => decode_top_level_number(data, *n, path).map(TypedValue::Num),
        Type::BigUint => Ok(TypedValue::BigUint(BigUint::from_bytes_be(data))),
        Type::Bool => match data {
            [] | [0] => Ok(TypedValue::Bool(false)),
            [1] => Ok(TypedValue::Bool(true)),
            [m] => Err(DecodeError::new(path, 0, DecodeErrorKind::InvalidMarker(*m))),
            _ => Err(DecodeError::new(
                path,
                1,
                DecodeErrorKind::TrailingBytes {
                    count: data.len() - 1,
                },
            )),
        },
        Type::Address => {
            let mut reader = Reader::new(data);
            let value = read_address(&mut reader, path)?;
            reader.finish(path)?;
            Ok(value)
        }
        Type::TokenIdentifier => token_identifier(data, path, 0),
        Type::Bytes => Ok(TypedValue::Bytes(data.to_vec())),
        Type::Option(inner) => {
            let value = match data {
                [] | [0] => None,
                [1, rest @ ..] => {
                    let mut reader = Reader::new(rest);
                    let value = read_nested(&mut reader, inner, path)?;
                    reader.finish(path).map_err(|e| shift(e, 1))?;
                    Some(Box::new(value))
                }
                [m, ..] => {
                    return Err(DecodeError::new(path, 0, DecodeErrorKind::InvalidMarker(*m)))
                }
            };
            Ok(TypedValue::Option {
                inner_type: (**inner).clone(),
                value,
            })
        }
        // A buffer that exists holds a value; absence is a missing argument
        Type::Optional(inner) => Ok(TypedValue::optional_some(decode_top_level_at(
            data, inner, path,
        )?)),
        Type::List(item) => {
            let mut reader = Reader::new(data);
            let mut items = Vec::new();
            while !reader.is_empty() {
                let item_path = format!("{}[{}]", path, items.len());
                items.push(read_sized_item(&mut reader, item, &item_path)?);
            }
            Ok(TypedValue::List {
                item_type: (**item).clone(),
                items,
            })
        }
        Type::Variadic(_) => Err(DecodeError::new(
            path,
            0,
            DecodeErrorKind::Unsupported("variadic values span several parts".to_string()),
        )),
        Type::Struct(s) => {
            let mut reader = Reader::new(data);
            let value = read_struct(&mut reader, s, path)?;
            reader.finish(path)?;
            Ok(value)
        }
    }
}

/// Decode one nested value from the start of `data`, returning it and the
/// number of bytes consumed
pub fn decode_nested(data: &[u8], ty: &Type) -> Result<(TypedValue, usize), DecodeError> {
    let mut reader = Reader::new(data);
    let value = read_nested(&mut reader, ty, ROOT_PATH)?;
    Ok((value, reader.pos))
}

/// Decode a nested value that must consume `data` exactly
pub fn decode_nested_exact(data: &[u8], ty: &Type) -> Result<TypedValue, DecodeError> {
    let mut reader = Reader::new(data);
    let value = read_nested(&mut reader, ty, ROOT_PATH)?;
    reader.finish(ROOT_PATH)?;
    Ok(value)
}

/// Interpret a raw buffer as a big-endian unsigned number of at most 8 bytes
pub fn decode_unsigned_number(data: &[u8]) -> Result<u64, DecodeError> {
    if data.len() > 8 {
        return Err(DecodeError::new(
            ROOT_PATH,
            0,
            DecodeErrorKind::OutOfRange(format!("{} bytes do not fit u64", data.len())),
        ));
    }
    Ok(data.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

// ==================== Nested ====================

fn read_nested(reader: &mut Reader<'_>, ty: &Type, path: &str) -> Result<TypedValue, DecodeError> {
    match ty {
        Type::Num(n) => {
            let offset = reader.pos;
            let bytes = reader.read(n.width(), path)?;
            let value = if n.is_signed() {
                signed_from_be(bytes)
            } else {
                unsigned_from_be(bytes)
            };
            Ok(TypedValue::Num(numeric(*n, value, path, offset)?))
        }
        Type::BigUint => {
            let bytes = reader.read_length_prefixed(path)?;
            Ok(TypedValue::BigUint(BigUint::from_bytes_be(bytes)))
        }
        Type::Bool => {
            let offset = reader.pos;
            match reader.read_u8(path)? {
                0 => Ok(TypedValue::Bool(false)),
                1 => Ok(TypedValue::Bool(true)),
                m => Err(DecodeError::new(path, offset, DecodeErrorKind::InvalidMarker(m))),
            }
        }
        Type::Address => read_address(reader, path),
        Type::TokenIdentifier => {
            let offset = reader.pos + 4;
            let bytes = reader.read_length_prefixed(path)?;
            token_identifier(bytes, path, offset)
        }
        Type::Bytes => Ok(TypedValue::Bytes(reader.read_length_prefixed(path)?.to_vec())),
        Type::Option(inner) => {
            let offset = reader.pos;
            let value = match reader.read_u8(path)? {
                0 => None,
                1 => Some(Box::new(read_nested(reader, inner, path)?)),
                m => {
                    return Err(DecodeError::new(path, offset, DecodeErrorKind::InvalidMarker(m)))
                }
            };
            Ok(TypedValue::Option {
                inner_type: (**inner).clone(),
                value,
            })
        }
        Type::Optional(_) => Err(DecodeError::new(
            path,
            reader.pos,
            DecodeErrorKind::Unsupported("optional values cannot be nested".to_string()),
        )),
        Type::List(item) => {
            let offset = reader.pos;
            let count = reader.read_length(path)?;
            let needed = count.saturating_mul(min_nested_size(item));
            if needed > reader.remaining() {
                return Err(DecodeError::new(
                    path,
                    offset,
                    DecodeErrorKind::UnexpectedEnd {
                        needed,
                        available: reader.remaining(),
                    },
                ));
            }
            let mut items = Vec::with_capacity(count.min(reader.remaining()));
            for i in 0..count {
                let item_path = format!("{}[{}]", path, i);
                items.push(read_nested(reader, item, &item_path)?);
            }
            Ok(TypedValue::List {
                item_type: (**item).clone(),
                items,
            })
        }
        Type::Variadic(item) => {
            let mut items = Vec::new();
            while !reader.is_empty() {
                let item_path = format!("{}[{}]", path, items.len());
                items.push(read_sized_item(reader, item, &item_path)?);
            }
            Ok(TypedValue::Variadic {
                item_type: (**item).clone(),
                items,
            })
        }
        Type::Struct(s) => read_struct(reader, s, path),
    }
}

/// Fewest bytes a nested value of this type can occupy
fn min_nested_size(ty: &Type) -> usize {
    match ty {
        Type::Num(n) => n.width(),
        Type::Bool | Type::Option(_) => 1,
        Type::Address => 32,
        Type::BigUint | Type::TokenIdentifier | Type::Bytes | Type::List(_) => 4,
        Type::Optional(_) | Type::Variadic(_) => 0,
        Type::Struct(s) => s.fields.iter().map(|f| min_nested_size(&f.ty)).sum(),
    }
}

/// Read one item of a sequence that runs to the end of the buffer
fn read_sized_item(reader: &mut Reader<'_>, ty: &Type, path: &str) -> Result<TypedValue, DecodeError> {
    let start = reader.pos;
    let value = read_nested(reader, ty, path)?;
    if reader.pos == start {
        return Err(DecodeError::new(
            path,
            start,
            DecodeErrorKind::Unsupported(format!("{} items occupy no bytes", ty)),
        ));
    }
    Ok(value)
}

fn read_struct(reader: &mut Reader<'_>, ty: &StructType, path: &str) -> Result<TypedValue, DecodeError> {
    let mut values = Vec::with_capacity(ty.fields.len());
    for field in &ty.fields {
        let field_path = format!("{}.{}", path, field.name);
        values.push(read_nested(reader, &field.ty, &field_path)?);
    }
    Ok(TypedValue::Struct(StructValue::new(ty.clone(), values)))
}

fn read_address(reader: &mut Reader<'_>, path: &str) -> Result<TypedValue, DecodeError> {
    let bytes = reader.read(Address::LEN, path)?;
    let mut out = [0u8; 32];
    out.copy_from_slice(bytes);
    Ok(TypedValue::Address(Address::from_bytes(out)))
}

fn token_identifier(bytes: &[u8], path: &str, offset: usize) -> Result<TypedValue, DecodeError> {
    if !is_valid_token_identifier(bytes) {
        return Err(DecodeError::new(path, offset, DecodeErrorKind::InvalidTokenIdentifier));
    }
    // Printable ASCII is valid UTF-8
    let id = String::from_utf8_lossy(bytes).into_owned();
    Ok(TypedValue::TokenIdentifier(id))
}

// ==================== Numbers ====================

fn decode_top_level_number(data: &[u8], ty: NumType, path: &str) -> Result<Numeric, DecodeError> {
    if data.len() > ty.width() {
        return Err(DecodeError::new(
            path,
            0,
            DecodeErrorKind::OutOfRange(format!(
                "{} bytes do not fit {}",
                data.len(),
                ty.name()
            )),
        ));
    }
    let value = if ty.is_signed() {
        signed_from_be(data)
    } else {
        unsigned_from_be(data)
    };
    numeric(ty, value, path, 0)
}

fn numeric(ty: NumType, value: i128, path: &str, offset: usize) -> Result<Numeric, DecodeError> {
    Numeric::new(ty, value).map_err(|_| {
        DecodeError::new(
            path,
            offset,
            DecodeErrorKind::OutOfRange(format!("{} does not fit {}", value, ty.name())),
        )
    })
}

fn unsigned_from_be(bytes: &[u8]) -> i128 {
    bytes.iter().fold(0i128, |acc, b| (acc << 8) | i128::from(*b))
}

fn signed_from_be(bytes: &[u8]) -> i128 {
    match bytes.first() {
        None => 0,
        Some(first) => {
            let start: i128 = if first & 0x80 != 0 { -1 } else { 0 };
            bytes.iter().fold(start, |acc, b| (acc << 8) | i128::from(*b))
        }
    }
}

fn shift(mut e: DecodeError, by: usize) -> DecodeError {
    e.offset += by;
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::encode::{encode_nested, encode_top_level};
    use crate::abi::types::FieldDef;

    fn u32_ty() -> Type {
        Type::Num(NumType::U32)
    }

    // ==================== Numbers ====================

    #[test]
    fn test_decode_top_level_u32() {
        assert_eq!(decode_top_level(&[0x07], &u32_ty()).unwrap(), TypedValue::u32(7));
        assert_eq!(decode_top_level(&[], &u32_ty()).unwrap(), TypedValue::u32(0));
        assert_eq!(
            decode_top_level(&[0, 0, 0, 7], &u32_ty()).unwrap(),
            TypedValue::u32(7)
        );
    }

    #[test]
    fn test_decode_top_level_u32_too_wide() {
        let err = decode_top_level(&[1, 0, 0, 0, 0], &u32_ty()).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::OutOfRange(_)));
    }

    #[test]
    fn test_decode_signed() {
        let i16_ty = Type::Num(NumType::I16);
        assert_eq!(decode_top_level(&[0xff], &i16_ty).unwrap(), TypedValue::i16(-1));
        assert_eq!(decode_top_level(&[0x00, 0x80], &i16_ty).unwrap(), TypedValue::i16(128));
        assert_eq!(
            decode_nested_exact(&[0xff, 0xfe], &i16_ty).unwrap(),
            TypedValue::i16(-2)
        );
    }

    #[test]
    fn test_decode_nested_number_underrun() {
        let err = decode_nested(&[0, 0, 7], &u32_ty()).unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(
            err.kind,
            DecodeErrorKind::UnexpectedEnd {
                needed: 4,
                available: 3
            }
        );
    }

    #[test]
    fn test_decode_unsigned_number() {
        assert_eq!(decode_unsigned_number(&[]).unwrap(), 0);
        assert_eq!(decode_unsigned_number(&[0x01, 0x00]).unwrap(), 256);
        assert!(decode_unsigned_number(&[1; 9]).is_err());
    }

    // ==================== Scalars ====================

    #[test]
    fn test_decode_bool_markers() {
        assert_eq!(decode_top_level(&[], &Type::Bool).unwrap(), TypedValue::Bool(false));
        assert_eq!(decode_top_level(&[1], &Type::Bool).unwrap(), TypedValue::Bool(true));
        let err = decode_top_level(&[2], &Type::Bool).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidMarker(2));
        let err = decode_nested(&[5], &Type::Bool).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidMarker(5));
    }

    #[test]
    fn test_decode_address_exact() {
        let err = decode_top_level(&[1u8; 33], &Type::Address).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TrailingBytes { count: 1 });
        assert!(decode_top_level(&[1u8; 31], &Type::Address).is_err());
    }

    #[test]
    fn test_decode_token_identifier_validation() {
        assert_eq!(
            decode_top_level(b"WEGLD-abcdef", &Type::TokenIdentifier).unwrap(),
            TypedValue::token_identifier("WEGLD-abcdef")
        );
        let err = decode_top_level(&[0x00, 0x41], &Type::TokenIdentifier).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidTokenIdentifier);
    }

    #[test]
    fn test_decode_bytes_nested_length_overrun() {
        let err = decode_nested(&[0, 0, 0, 5, 1, 2], &Type::Bytes).unwrap_err();
        assert_eq!(err.offset, 4);
    }

    // ==================== Containers ====================

    #[test]
    fn test_decode_option() {
        let ty = Type::option(u32_ty());
        assert_eq!(
            decode_top_level(&[], &ty).unwrap(),
            TypedValue::option_none(u32_ty())
        );
        assert_eq!(
            decode_top_level(&[1, 0, 0, 0, 9], &ty).unwrap(),
            TypedValue::option_some(TypedValue::u32(9))
        );
        let err = decode_nested(&[2], &ty).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidMarker(2));
    }

    #[test]
    fn test_decode_list_paths() {
        let ty = Type::list(Type::Bool);
        let err = decode_nested(&[0, 0, 0, 2, 1, 5], &ty).unwrap_err();
        assert_eq!(err.path, "value[1]");
        assert_eq!(err.offset, 5);
        assert_eq!(err.kind, DecodeErrorKind::InvalidMarker(5));
    }

    #[test]
    fn test_decode_list_count_exceeds_input() {
        let ty = Type::list(u32_ty());
        // Count says 2 but only one item follows
        let err = decode_nested(&[0, 0, 0, 2, 0, 0, 0, 1], &ty).unwrap_err();
        assert_eq!(err.path, "value");
        assert_eq!(err.offset, 0);
        assert_eq!(err.kind, DecodeErrorKind::UnexpectedEnd { needed: 8, available: 4 });

        let err = decode_nested(&[0xff, 0xff, 0xff, 0xff, 1], &Type::list(Type::Bool)).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::UnexpectedEnd { .. }));
    }

    #[test]
    fn test_decode_nested_list_of_empty_structs() {
        let empty = Type::Struct(StructType::new("Empty", vec![]));
        let (value, consumed) = decode_nested(&[0, 0, 0, 2], &Type::list(empty.clone())).unwrap();
        assert_eq!(consumed, 4);
        match value {
            TypedValue::List { items, .. } => assert_eq!(items.len(), 2),
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_zero_sized_items_to_end_rejected() {
        let empty = Type::Struct(StructType::new("Empty", vec![]));

        let err = decode_top_level(&[0x01], &Type::list(empty.clone())).unwrap_err();
        assert_eq!(err.path, "value[0]");
        assert!(matches!(err.kind, DecodeErrorKind::Unsupported(_)));

        let err = decode_nested(&[0x01], &Type::variadic(empty)).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::Unsupported(_)));
    }

    #[test]
    fn test_decode_optional_top_level_present() {
        let ty = Type::optional(u32_ty());
        assert_eq!(
            decode_top_level(&[], &ty).unwrap(),
            TypedValue::optional_some(TypedValue::u32(0))
        );
        assert_eq!(
            decode_top_level(&[], &Type::optional(Type::Bool)).unwrap(),
            TypedValue::optional_some(TypedValue::Bool(false))
        );
        assert_eq!(
            decode_top_level(&[0x2a], &ty).unwrap(),
            TypedValue::optional_some(TypedValue::u32(42))
        );
    }

    #[test]
    fn test_decode_nested_exact_trailing() {
        let err = decode_nested_exact(&[0, 0, 0, 1, 0xaa], &u32_ty()).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::TrailingBytes { count: 1 });
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn test_decode_nested_reports_consumed() {
        let (value, consumed) = decode_nested(&[0, 0, 0, 1, 0xaa], &u32_ty()).unwrap();
        assert_eq!(value, TypedValue::u32(1));
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_decode_variadic_nested_consumes_all() {
        let ty = Type::variadic(Type::Num(NumType::U8));
        let (value, consumed) = decode_nested(&[1, 2, 3], &ty).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(
            value,
            TypedValue::variadic(
                Type::Num(NumType::U8),
                vec![TypedValue::u8(1), TypedValue::u8(2), TypedValue::u8(3)]
            )
        );
    }

    #[test]
    fn test_decode_struct_field_path() {
        let ty = StructType::new(
            "Payment",
            vec![
                FieldDef::new("token", Type::TokenIdentifier),
                FieldDef::new("amount", Type::BigUint),
            ],
        );
        let mut data = vec![0, 0, 0, 4];
        data.extend_from_slice(b"EGLD");
        data.extend_from_slice(&[0, 0, 0, 9, 1]);
        let err = decode_top_level_at(&data, &Type::Struct(ty), "output[1]").unwrap_err();
        assert_eq!(err.path, "output[1].amount");
        assert_eq!(err.offset, 12);
    }

    // ==================== Round trips ====================

    #[test]
    fn test_optional_zero_values_roundtrip() {
        for value in [
            TypedValue::optional_some(TypedValue::u32(0)),
            TypedValue::optional_some(TypedValue::Bool(false)),
            TypedValue::optional_some(TypedValue::bytes(vec![])),
        ] {
            let top = encode_top_level(&value).unwrap();
            assert_eq!(decode_top_level(&top, &value.type_of()).unwrap(), value);
        }
    }

    #[test]
    fn test_struct_roundtrip() {
        let ty = StructType::new(
            "Order",
            vec![
                FieldDef::new("id", Type::Num(NumType::U64)),
                FieldDef::new("owner", Type::Address),
                FieldDef::new("tags", Type::list(Type::Bytes)),
                FieldDef::new("limit", Type::option(Type::BigUint)),
            ],
        );
        let value = TypedValue::Struct(StructValue::new(
            ty.clone(),
            vec![
                TypedValue::u64(99),
                TypedValue::address(Address::from_bytes([3u8; 32])),
                TypedValue::list(
                    Type::Bytes,
                    vec![TypedValue::bytes_from_utf8("a"), TypedValue::bytes(vec![])],
                ),
                TypedValue::option_some(TypedValue::biguint(5u8)),
            ],
        ));
        let ty = Type::Struct(ty);
        let top = encode_top_level(&value).unwrap();
        assert_eq!(decode_top_level(&top, &ty).unwrap(), value);
        let nested = encode_nested(&value).unwrap();
        assert_eq!(decode_nested_exact(&nested, &ty).unwrap(), value);
    }
}
