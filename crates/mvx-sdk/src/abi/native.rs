//! Conversion of loosely-typed arguments into typed values
//!
//! Callers may mix already-typed values, pre-encoded buffers and plain JSON
//! values. JSON values are converted against the endpoint's declared
//! parameters in a validation pass that runs before any encoding, and every
//! failing argument is reported at once.

use std::fmt;
use std::str::FromStr;

use mvx_primitives::{parse_biguint, Address, BigUint};
use serde_json::Value;

use super::encode::is_valid_token_identifier;
use super::registry::ParamDef;
use super::types::{StructType, Type};
use super::value::{Numeric, StructValue, TypedValue};
use crate::SdkError;

/// A call argument as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Value that already carries its ABI type
    Typed(TypedValue),
    /// Plain value converted using the ABI
    Native(Value),
    /// Bytes passed through as one argument without encoding
    Encoded(Vec<u8>),
}

/// An argument ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedArg {
    /// Typed value, expanded by its argument-position encoding
    Value(TypedValue),
    /// Pre-encoded single argument
    Encoded(Vec<u8>),
}

/// One argument that could not be converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionFailure {
    /// Zero-based argument position
    pub position: usize,
    /// The offending value, rendered as JSON
    pub value: String,
    /// Expected type
    pub expected: String,
    /// Why the conversion failed
    pub reason: String,
}

impl fmt::Display for ConversionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "argument {}: cannot convert {} to {}: {}",
            self.position, self.value, self.expected, self.reason
        )
    }
}

impl From<TypedValue> for Argument {
    fn from(value: TypedValue) -> Self {
        Argument::Typed(value)
    }
}

impl From<Address> for Argument {
    fn from(value: Address) -> Self {
        Argument::Typed(TypedValue::Address(value))
    }
}

impl From<BigUint> for Argument {
    fn from(value: BigUint) -> Self {
        Argument::Typed(TypedValue::BigUint(value))
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Argument::Native(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Native(Value::String(value.to_string()))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Native(Value::String(value))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Native(Value::Bool(value))
    }
}

macro_rules! native_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Argument {
                fn from(value: $t) -> Self {
                    Argument::Native(Value::from(value))
                }
            }
        )*
    };
}

native_from_int!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Validate and convert arguments against optional endpoint parameters
///
/// Without parameters, typed and pre-encoded arguments pass through and
/// every native argument fails. With parameters, arguments are matched
/// positionally; a trailing variadic parameter takes all remaining
/// arguments, and missing trailing `optional` parameters are absent.
pub fn convert_arguments(
    args: &[Argument],
    params: Option<&[ParamDef]>,
) -> Result<Vec<PreparedArg>, SdkError> {
    let mut failures = Vec::new();
    let prepared = match params {
        None => convert_without_abi(args, &mut failures),
        Some(params) => convert_with_abi(args, params, &mut failures),
    };
    if !failures.is_empty() {
        return Err(SdkError::TypeConversion { failures });
    }
    Ok(prepared)
}

fn convert_without_abi(args: &[Argument], failures: &mut Vec<ConversionFailure>) -> Vec<PreparedArg> {
    let mut out = Vec::with_capacity(args.len());
    for (position, arg) in args.iter().enumerate() {
        match arg {
            Argument::Typed(v) => out.push(PreparedArg::Value(v.clone())),
            Argument::Encoded(b) => out.push(PreparedArg::Encoded(b.clone())),
            Argument::Native(v) => failures.push(ConversionFailure {
                position,
                value: v.to_string(),
                expected: "typed value".to_string(),
                reason: "native values need an ABI to determine their type".to_string(),
            }),
        }
    }
    out
}

fn convert_with_abi(
    args: &[Argument],
    params: &[ParamDef],
    failures: &mut Vec<ConversionFailure>,
) -> Vec<PreparedArg> {
    let mut out = Vec::with_capacity(args.len());
    let mut next = 0;

    for (index, param) in params.iter().enumerate() {
        let is_last = index + 1 == params.len();
        if let (Type::Variadic(item), true) = (&param.ty, is_last) {
            for (offset, arg) in args[next.min(args.len())..].iter().enumerate() {
                let position = next + offset;
                match convert_variadic_arg(arg, &param.ty, item) {
                    Ok(p) => out.push(p),
                    Err(reason) => failures.push(failure(position, arg, &param.ty, reason)),
                }
            }
            next = args.len();
            break;
        }

        let Some(arg) = args.get(next) else {
            if !matches!(param.ty, Type::Optional(_)) {
                failures.push(ConversionFailure {
                    position: next,
                    value: "<missing>".to_string(),
                    expected: param.ty.to_string(),
                    reason: format!("missing argument {:?}", param.name),
                });
            }
            continue;
        };

        match convert_arg(arg, &param.ty) {
            Ok(p) => out.push(p),
            Err(reason) => failures.push(failure(next, arg, &param.ty, reason)),
        }
        next += 1;
    }

    for (position, arg) in args.iter().enumerate().skip(next) {
        failures.push(ConversionFailure {
            position,
            value: render(arg),
            expected: "nothing".to_string(),
            reason: format!("endpoint takes {} argument(s)", params.len()),
        });
    }
    out
}

fn convert_arg(arg: &Argument, ty: &Type) -> Result<PreparedArg, String> {
    match arg {
        Argument::Encoded(b) => Ok(PreparedArg::Encoded(b.clone())),
        Argument::Typed(v) => typed_for(v, ty).map(PreparedArg::Value),
        Argument::Native(v) => native_to_typed(v, ty).map(PreparedArg::Value),
    }
}

fn convert_variadic_arg(arg: &Argument, variadic: &Type, item: &Type) -> Result<PreparedArg, String> {
    match arg {
        // A complete variadic value may be supplied as a single typed argument
        Argument::Typed(v) if &v.type_of() == variadic => Ok(PreparedArg::Value(v.clone())),
        other => convert_arg(other, item),
    }
}

/// Typed values keep their own type. A bare value of an `optional`
/// parameter's inner type is wrapped as present.
fn typed_for(value: &TypedValue, ty: &Type) -> Result<TypedValue, String> {
    if let Type::Optional(inner) = ty {
        if value.type_of() == **inner {
            return Ok(TypedValue::optional_some(value.clone()));
        }
    }
    Ok(value.clone())
}

fn failure(position: usize, arg: &Argument, ty: &Type, reason: String) -> ConversionFailure {
    ConversionFailure {
        position,
        value: render(arg),
        expected: ty.to_string(),
        reason,
    }
}

fn render(arg: &Argument) -> String {
    match arg {
        Argument::Typed(v) => format!("{:?}", v),
        Argument::Native(v) => v.to_string(),
        Argument::Encoded(b) => format!("0x{}", hex::encode(b)),
    }
}

// ==================== JSON to typed value ====================

/// Convert a JSON value to a typed value of the given type
pub fn native_to_typed(value: &Value, ty: &Type) -> Result<TypedValue, String> {
    match ty {
        Type::Num(n) => {
            let raw = integer_of(value)?;
            Numeric::new(*n, raw)
                .map(TypedValue::Num)
                .map_err(|_| format!("{} does not fit {}", raw, n.name()))
        }
        Type::BigUint => match value {
            Value::Number(num) => num
                .as_u64()
                .map(|v| TypedValue::BigUint(BigUint::from(v)))
                .ok_or_else(|| "expected a non-negative integer".to_string()),
            Value::String(s) => parse_biguint(s)
                .map(TypedValue::BigUint)
                .map_err(|e| e.to_string()),
            _ => Err("expected an integer or decimal string".to_string()),
        },
        Type::Bool => value
            .as_bool()
            .map(TypedValue::Bool)
            .ok_or_else(|| "expected a boolean".to_string()),
        Type::Address => {
            let s = value
                .as_str()
                .ok_or_else(|| "expected a bech32 or hex address string".to_string())?;
            Address::from_str(s)
                .map(TypedValue::Address)
                .map_err(|e| e.to_string())
        }
        Type::TokenIdentifier => {
            let s = value
                .as_str()
                .ok_or_else(|| "expected a token identifier string".to_string())?;
            if !is_valid_token_identifier(s.as_bytes()) {
                return Err(format!("{:?} is not a valid token identifier", s));
            }
            Ok(TypedValue::token_identifier(s))
        }
        Type::Bytes => match value {
            Value::String(s) => Ok(TypedValue::bytes_from_utf8(s)),
            Value::Array(items) => items
                .iter()
                .map(|b| {
                    b.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| "byte arrays must contain values 0..=255".to_string())
                })
                .collect::<Result<Vec<u8>, _>>()
                .map(TypedValue::Bytes),
            _ => Err("expected a string or byte array".to_string()),
        },
        Type::Option(inner) => match value {
            Value::Null => Ok(TypedValue::option_none((**inner).clone())),
            other => Ok(TypedValue::Option {
                inner_type: (**inner).clone(),
                value: Some(Box::new(native_to_typed(other, inner)?)),
            }),
        },
        Type::Optional(inner) => match value {
            Value::Null => Ok(TypedValue::optional_none((**inner).clone())),
            other => Ok(TypedValue::Optional {
                inner_type: (**inner).clone(),
                value: Some(Box::new(native_to_typed(other, inner)?)),
            }),
        },
        Type::List(item) => {
            let items = sequence(value, item)?;
            Ok(TypedValue::list((**item).clone(), items))
        }
        Type::Variadic(item) => {
            let items = sequence(value, item)?;
            Ok(TypedValue::variadic((**item).clone(), items))
        }
        Type::Struct(s) => native_struct(value, s),
    }
}

fn integer_of(value: &Value) -> Result<i128, String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .ok_or_else(|| format!("{} is not an integer", n)),
        Value::String(s) => s
            .parse::<i128>()
            .map_err(|_| format!("{:?} is not an integer", s)),
        _ => Err("expected an integer".to_string()),
    }
}

fn sequence(value: &Value, item: &Type) -> Result<Vec<TypedValue>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "expected an array".to_string())?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| native_to_typed(v, item).map_err(|e| format!("item {}: {}", i, e)))
        .collect()
}

fn native_struct(value: &Value, ty: &StructType) -> Result<TypedValue, String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected an object for {}", ty.name))?;
    let mut values = Vec::with_capacity(ty.fields.len());
    for field in &ty.fields {
        let raw = object
            .get(&field.name)
            .ok_or_else(|| format!("missing field {:?}", field.name))?;
        let converted =
            native_to_typed(raw, &field.ty).map_err(|e| format!("field {}: {}", field.name, e))?;
        values.push(converted);
    }
    Ok(TypedValue::Struct(StructValue::new(ty.clone(), values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::types::{FieldDef, NumType};
    use serde_json::json;

    fn u32_param(name: &str) -> ParamDef {
        ParamDef::new(name, Type::Num(NumType::U32))
    }

    // ==================== Without ABI ====================

    #[test]
    fn test_no_abi_native_fails() {
        let err = convert_arguments(&[Argument::from(0u32)], None).unwrap_err();
        match err {
            SdkError::TypeConversion { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].position, 0);
                assert_eq!(failures[0].value, "0");
            }
            other => panic!("Expected TypeConversion, got {:?}", other),
        }
    }

    #[test]
    fn test_no_abi_typed_and_encoded_pass() {
        let args = vec![
            Argument::from(TypedValue::u32(7)),
            Argument::Encoded(vec![0xab]),
        ];
        let prepared = convert_arguments(&args, None).unwrap();
        assert_eq!(
            prepared,
            vec![
                PreparedArg::Value(TypedValue::u32(7)),
                PreparedArg::Encoded(vec![0xab])
            ]
        );
    }

    #[test]
    fn test_no_abi_collects_all_failures() {
        let args = vec![
            Argument::from(1u8),
            Argument::from(TypedValue::Bool(true)),
            Argument::from("x"),
        ];
        match convert_arguments(&args, None).unwrap_err() {
            SdkError::TypeConversion { failures } => {
                let positions: Vec<usize> = failures.iter().map(|f| f.position).collect();
                assert_eq!(positions, vec![0, 2]);
            }
            other => panic!("Expected TypeConversion, got {:?}", other),
        }
    }

    // ==================== With ABI ====================

    #[test]
    fn test_native_numbers_converted() {
        let params = vec![u32_param("a"), ParamDef::new("b", Type::BigUint)];
        let args = vec![Argument::from(7u32), Argument::from("1000000000000000000000")];
        let prepared = convert_arguments(&args, Some(&params)).unwrap();
        assert_eq!(prepared[0], PreparedArg::Value(TypedValue::u32(7)));
        assert_eq!(
            prepared[1],
            PreparedArg::Value(TypedValue::biguint(BigUint::from(10u64).pow(21)))
        );
    }

    #[test]
    fn test_native_out_of_range() {
        let params = vec![ParamDef::new("a", Type::Num(NumType::U8))];
        let err = convert_arguments(&[Argument::from(300u32)], Some(&params)).unwrap_err();
        match err {
            SdkError::TypeConversion { failures } => {
                assert_eq!(failures[0].expected, "u8");
                assert!(failures[0].reason.contains("does not fit"));
            }
            other => panic!("Expected TypeConversion, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_biguint_rejected() {
        let params = vec![ParamDef::new("a", Type::BigUint)];
        assert!(convert_arguments(&[Argument::from(-1i32)], Some(&params)).is_err());
    }

    #[test]
    fn test_missing_trailing_optional_is_absent() {
        let params = vec![u32_param("a"), ParamDef::new("b", Type::optional(Type::Bytes))];
        let prepared = convert_arguments(&[Argument::from(1u32)], Some(&params)).unwrap();
        assert_eq!(prepared.len(), 1);
    }

    #[test]
    fn test_missing_required_argument() {
        let params = vec![u32_param("a"), u32_param("b")];
        match convert_arguments(&[Argument::from(1u32)], Some(&params)).unwrap_err() {
            SdkError::TypeConversion { failures } => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].position, 1);
                assert_eq!(failures[0].value, "<missing>");
            }
            other => panic!("Expected TypeConversion, got {:?}", other),
        }
    }

    #[test]
    fn test_too_many_arguments() {
        let params = vec![u32_param("a")];
        let args = vec![Argument::from(1u32), Argument::from(2u32)];
        match convert_arguments(&args, Some(&params)).unwrap_err() {
            SdkError::TypeConversion { failures } => assert_eq!(failures[0].position, 1),
            other => panic!("Expected TypeConversion, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_variadic_consumes_rest() {
        let params = vec![
            ParamDef::new("to", Type::Address),
            ParamDef::new("amounts", Type::variadic(Type::BigUint)),
        ];
        let args = vec![
            Argument::from(json!(
                "erd1qyu5wthldzr8wx5c9ucg8kjagg0jfs53s8nr3zpz3hypefsdd8ssycr6th"
            )),
            Argument::from(1u32),
            Argument::from(TypedValue::biguint(2u8)),
            Argument::from("3"),
        ];
        let prepared = convert_arguments(&args, Some(&params)).unwrap();
        assert_eq!(prepared.len(), 4);
        assert_eq!(prepared[3], PreparedArg::Value(TypedValue::biguint(3u8)));
    }

    #[test]
    fn test_typed_value_keeps_its_own_type() {
        let params = vec![u32_param("a")];
        let prepared = convert_arguments(&[Argument::from(TypedValue::u8(1))], Some(&params)).unwrap();
        assert_eq!(prepared, vec![PreparedArg::Value(TypedValue::u8(1))]);
    }

    #[test]
    fn test_typed_value_wrapped_for_optional() {
        let params = vec![ParamDef::new("a", Type::optional(Type::Bool))];
        let prepared =
            convert_arguments(&[Argument::from(TypedValue::Bool(true))], Some(&params)).unwrap();
        assert_eq!(
            prepared[0],
            PreparedArg::Value(TypedValue::optional_some(TypedValue::Bool(true)))
        );
    }

    // ==================== Composite values ====================

    #[test]
    fn test_native_struct_and_list() {
        let payment = StructType::new(
            "Payment",
            vec![
                FieldDef::new("token", Type::TokenIdentifier),
                FieldDef::new("amount", Type::BigUint),
            ],
        );
        let ty = Type::list(Type::Struct(payment));
        let value = json!([{"token": "USDC-c76f1f", "amount": "500"}]);
        let converted = native_to_typed(&value, &ty).unwrap();
        match converted {
            TypedValue::List { items, .. } => {
                assert_eq!(items.len(), 1);
                match &items[0] {
                    TypedValue::Struct(s) => {
                        assert_eq!(s.field("amount"), Some(&TypedValue::biguint(500u32)))
                    }
                    other => panic!("Expected struct, got {:?}", other),
                }
            }
            other => panic!("Expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_native_struct_missing_field() {
        let ty = Type::Struct(StructType::new(
            "P",
            vec![FieldDef::new("a", Type::Bool)],
        ));
        let err = native_to_typed(&json!({}), &ty).unwrap_err();
        assert!(err.contains("missing field"));
    }

    #[test]
    fn test_native_option_null() {
        let ty = Type::option(Type::Num(NumType::U8));
        assert_eq!(
            native_to_typed(&Value::Null, &ty).unwrap(),
            TypedValue::option_none(Type::Num(NumType::U8))
        );
    }

    #[test]
    fn test_native_token_identifier_invalid() {
        assert!(native_to_typed(&json!("bad id"), &Type::TokenIdentifier).is_err());
    }

    #[test]
    fn test_failure_display() {
        let f = ConversionFailure {
            position: 2,
            value: "\"x\"".to_string(),
            expected: "u32".to_string(),
            reason: "not a number".to_string(),
        };
        assert_eq!(f.to_string(), "argument 2: cannot convert \"x\" to u32: not a number");
    }
}
