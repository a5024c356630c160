//! Contract ABI: typed values and their binary codec
//!
//! This module provides functionality for:
//! - Describing argument and result types ([`Type`], [`TypedValue`])
//! - Top-level and nested encoding and decoding
//! - Loading contract ABI JSON and converting plain JSON arguments
//!
//! # Example
//!
//! ```rust
//! use mvx_sdk::abi::{decode_top_level, encode_arguments, NumType, Type, TypedValue};
//!
//! // A u32 argument occupies one argument with its minimal encoding
//! let args = encode_arguments(&TypedValue::u32(7)).unwrap();
//! assert_eq!(args, vec![vec![0x07]]);
//!
//! // Decode a result part back
//! let value = decode_top_level(&[0x07], &Type::Num(NumType::U32)).unwrap();
//! assert_eq!(value, TypedValue::u32(7));
//! ```

mod decode;
mod encode;
mod native;
mod registry;
mod types;
mod value;

pub use decode::{
    decode_nested, decode_nested_exact, decode_top_level, decode_top_level_at,
    decode_unsigned_number, DecodeError, DecodeErrorKind,
};
pub use encode::{encode_arguments, encode_nested, encode_top_level};
pub use native::{convert_arguments, native_to_typed, Argument, ConversionFailure, PreparedArg};
pub use registry::{Abi, EndpointDef, ParamDef};
pub use types::{FieldDef, NumType, StructType, Type};
pub use value::{Numeric, StructValue, TypedValue};
