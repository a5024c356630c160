//! ABI encoding
//!
//! Two contexts exist. Top-level encoding is used for a whole call argument
//! and is as short as possible; nested encoding is used inside containers
//! and is self-delimiting (fixed width or length-prefixed).

use num_traits::Zero;

use super::types::Type;
use super::value::{Numeric, TypedValue};
use crate::SdkError;

/// Encode a value as a single top-level buffer
pub fn encode_top_level(value: &TypedValue) -> Result<Vec<u8>, SdkError> {
    check_declared_types(value)?;
    let mut out = Vec::new();
    write_top_level(value, &mut out)?;
    Ok(out)
}

/// Encode a value in nested (self-delimiting) form
pub fn encode_nested(value: &TypedValue) -> Result<Vec<u8>, SdkError> {
    check_declared_types(value)?;
    let mut out = Vec::new();
    write_nested(value, &mut out)?;
    Ok(out)
}

/// Expand a value into the call arguments it occupies
///
/// An absent `optional` produces no argument, a variadic produces one
/// argument per element, everything else produces exactly one.
pub fn encode_arguments(value: &TypedValue) -> Result<Vec<Vec<u8>>, SdkError> {
    check_declared_types(value)?;
    let mut args = Vec::new();
    push_arguments(value, &mut args)?;
    Ok(args)
}

fn push_arguments(value: &TypedValue, args: &mut Vec<Vec<u8>>) -> Result<(), SdkError> {
    match value {
        TypedValue::Optional { value: None, .. } => Ok(()),
        TypedValue::Optional {
            value: Some(inner), ..
        } => push_arguments(inner, args),
        TypedValue::Variadic { items, .. } => {
            for item in items {
                let mut out = Vec::new();
                write_top_level(item, &mut out)?;
                args.push(out);
            }
            Ok(())
        }
        other => {
            let mut out = Vec::new();
            write_top_level(other, &mut out)?;
            args.push(out);
            Ok(())
        }
    }
}

// ==================== Top-level ====================

fn write_top_level(value: &TypedValue, out: &mut Vec<u8>) -> Result<(), SdkError> {
    match value {
        TypedValue::Num(n) => out.extend_from_slice(&minimal_number_bytes(n)),
        TypedValue::BigUint(b) => {
            if !b.is_zero() {
                out.extend_from_slice(&b.to_bytes_be());
            }
        }
        TypedValue::Bool(b) => {
            if *b {
                out.push(1);
            }
        }
        TypedValue::Address(a) => out.extend_from_slice(a.as_bytes()),
        TypedValue::TokenIdentifier(id) => {
            validate_token_identifier(id)?;
            out.extend_from_slice(id.as_bytes());
        }
        TypedValue::Bytes(b) => out.extend_from_slice(b),
        TypedValue::Option { value, .. } => {
            if let Some(inner) = value {
                out.push(1);
                write_nested(inner, out)?;
            }
        }
        // Absence shows only as a missing argument, see `encode_arguments`
        TypedValue::Optional { value, .. } => {
            if let Some(inner) = value {
                write_top_level(inner, out)?;
            }
        }
        TypedValue::List { items, .. } => {
            for item in items {
                write_nested(item, out)?;
            }
        }
        TypedValue::Variadic { .. } => {
            return Err(SdkError::AbiEncode(
                "variadic values expand to several arguments and have no single top-level encoding"
                    .to_string(),
            ));
        }
        TypedValue::Struct(s) => {
            for field in &s.values {
                write_nested(field, out)?;
            }
        }
    }
    Ok(())
}

// ==================== Nested ====================

fn write_nested(value: &TypedValue, out: &mut Vec<u8>) -> Result<(), SdkError> {
    match value {
        TypedValue::Num(n) => out.extend_from_slice(&fixed_number_bytes(n)),
        TypedValue::BigUint(b) => {
            if b.is_zero() {
                write_length(0, out)?;
            } else {
                write_length_prefixed(&b.to_bytes_be(), out)?;
            }
        }
        TypedValue::Bool(b) => out.push(u8::from(*b)),
        TypedValue::Address(a) => out.extend_from_slice(a.as_bytes()),
        TypedValue::TokenIdentifier(id) => {
            validate_token_identifier(id)?;
            write_length_prefixed(id.as_bytes(), out)?;
        }
        TypedValue::Bytes(b) => write_length_prefixed(b, out)?,
        TypedValue::Option { value, .. } => match value {
            Some(inner) => {
                out.push(1);
                write_nested(inner, out)?;
            }
            None => out.push(0),
        },
        TypedValue::Optional { .. } => {
            return Err(SdkError::AbiEncode(
                "optional values cannot be nested inside other values".to_string(),
            ));
        }
        TypedValue::List { items, .. } => {
            write_length(items.len(), out)?;
            for item in items {
                write_nested(item, out)?;
            }
        }
        TypedValue::Variadic { items, .. } => {
            for item in items {
                write_nested(item, out)?;
            }
        }
        TypedValue::Struct(s) => {
            for field in &s.values {
                write_nested(field, out)?;
            }
        }
    }
    Ok(())
}

fn write_length(len: usize, out: &mut Vec<u8>) -> Result<(), SdkError> {
    let len = u32::try_from(len)
        .map_err(|_| SdkError::AbiEncode(format!("length {} exceeds u32", len)))?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn write_length_prefixed(bytes: &[u8], out: &mut Vec<u8>) -> Result<(), SdkError> {
    write_length(bytes.len(), out)?;
    out.extend_from_slice(bytes);
    Ok(())
}

// ==================== Numbers ====================

/// Exactly `width` bytes, big-endian two's complement
fn fixed_number_bytes(n: &Numeric) -> Vec<u8> {
    let full = n.value().to_be_bytes();
    full[full.len() - n.num_type().width()..].to_vec()
}

/// Shortest big-endian representation; zero is empty
fn minimal_number_bytes(n: &Numeric) -> Vec<u8> {
    let full = n.value().to_be_bytes();
    if n.value() == 0 {
        return Vec::new();
    }
    if !n.num_type().is_signed() {
        let start = full.iter().position(|b| *b != 0).unwrap_or(full.len());
        return full[start..].to_vec();
    }
    // Drop redundant sign-extension bytes
    let filler = if n.value() < 0 { 0xff } else { 0x00 };
    let mut start = 0;
    while start + 1 < full.len()
        && full[start] == filler
        && (full[start + 1] & 0x80) == (filler & 0x80)
    {
        start += 1;
    }
    full[start..].to_vec()
}

// ==================== Validation ====================

/// Token identifiers are non-empty printable ASCII without spaces
pub(crate) fn is_valid_token_identifier(bytes: &[u8]) -> bool {
    !bytes.is_empty() && bytes.iter().all(|b| (0x21..=0x7e).contains(b))
}

fn validate_token_identifier(id: &str) -> Result<(), SdkError> {
    if !is_valid_token_identifier(id.as_bytes()) {
        return Err(SdkError::AbiEncode(format!("invalid token identifier {:?}", id)));
    }
    Ok(())
}

/// Check that every container's content matches its declared type
fn check_declared_types(value: &TypedValue) -> Result<(), SdkError> {
    match value {
        TypedValue::Option {
            inner_type,
            value: Some(inner),
        }
        | TypedValue::Optional {
            inner_type,
            value: Some(inner),
        } => {
            expect_type(inner_type, inner)?;
            check_declared_types(inner)
        }
        TypedValue::List { item_type, items } | TypedValue::Variadic { item_type, items } => {
            for item in items {
                expect_type(item_type, item)?;
                check_declared_types(item)?;
            }
            Ok(())
        }
        TypedValue::Struct(s) => {
            if s.values.len() != s.ty.fields.len() {
                return Err(SdkError::AbiEncode(format!(
                    "struct {} expects {} fields, got {}",
                    s.ty.name,
                    s.ty.fields.len(),
                    s.values.len()
                )));
            }
            for (field, v) in s.ty.fields.iter().zip(&s.values) {
                expect_type(&field.ty, v)?;
                check_declared_types(v)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn expect_type(declared: &Type, value: &TypedValue) -> Result<(), SdkError> {
    let actual = value.type_of();
    if &actual != declared {
        return Err(SdkError::AbiEncode(format!(
            "type mismatch: declared {}, got {}",
            declared, actual
        )));
    }
    Ok(())
}
