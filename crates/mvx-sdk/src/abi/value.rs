//! Typed values

use mvx_primitives::{Address, BigUint};

use super::types::{NumType, StructType, Type};
use crate::SdkError;

/// Fixed-width integer value, range-checked against its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Numeric {
    ty: NumType,
    value: i128,
}

impl Numeric {
    /// Create a value, failing if it does not fit the type
    pub fn new(ty: NumType, value: i128) -> Result<Self, SdkError> {
        if value < ty.min() || value > ty.max() {
            return Err(SdkError::AbiEncode(format!(
                "value {} out of range for {}",
                value,
                ty.name()
            )));
        }
        Ok(Self { ty, value })
    }

    /// Integer type
    pub fn num_type(&self) -> NumType {
        self.ty
    }

    /// Integer value
    pub fn value(&self) -> i128 {
        self.value
    }
}

/// Value of a composite type, fields in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructValue {
    /// Composite type
    pub ty: StructType,
    /// Field values, same order as `ty.fields`
    pub values: Vec<TypedValue>,
}

impl StructValue {
    /// Create a struct value
    pub fn new(ty: StructType, values: Vec<TypedValue>) -> Self {
        Self { ty, values }
    }

    /// Look up a field value by name
    pub fn field(&self, name: &str) -> Option<&TypedValue> {
        self.ty
            .fields
            .iter()
            .position(|f| f.name == name)
            .and_then(|i| self.values.get(i))
    }
}

/// A value tagged with its ABI type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypedValue {
    /// Fixed-width integer
    Num(Numeric),
    /// Arbitrary-precision unsigned integer
    BigUint(BigUint),
    /// Boolean
    Bool(bool),
    /// Address
    Address(Address),
    /// Token identifier
    TokenIdentifier(String),
    /// Byte buffer
    Bytes(Vec<u8>),
    /// Option with presence marker
    Option {
        /// Declared inner type
        inner_type: Type,
        /// Inner value when present
        value: Option<Box<TypedValue>>,
    },
    /// Omittable argument
    Optional {
        /// Declared inner type
        inner_type: Type,
        /// Inner value when present
        value: Option<Box<TypedValue>>,
    },
    /// Counted sequence
    List {
        /// Declared item type
        item_type: Type,
        /// Items
        items: Vec<TypedValue>,
    },
    /// Variadic sequence
    Variadic {
        /// Declared item type
        item_type: Type,
        /// Items
        items: Vec<TypedValue>,
    },
    /// Composite
    Struct(StructValue),
}

macro_rules! num_constructor {
    ($name:ident, $t:ty, $variant:ident) => {
        #[doc = concat!("Create a `", stringify!($name), "` value")]
        pub fn $name(value: $t) -> Self {
            TypedValue::Num(Numeric {
                ty: NumType::$variant,
                value: i128::from(value),
            })
        }
    };
}

impl TypedValue {
    num_constructor!(u8, u8, U8);
    num_constructor!(u16, u16, U16);
    num_constructor!(u32, u32, U32);
    num_constructor!(u64, u64, U64);
    num_constructor!(i8, i8, I8);
    num_constructor!(i16, i16, I16);
    num_constructor!(i32, i32, I32);
    num_constructor!(i64, i64, I64);

    /// Create a big unsigned integer value
    pub fn biguint(value: impl Into<BigUint>) -> Self {
        TypedValue::BigUint(value.into())
    }

    /// Create an address value
    pub fn address(address: Address) -> Self {
        TypedValue::Address(address)
    }

    /// Create a token identifier value
    pub fn token_identifier(id: impl Into<String>) -> Self {
        TypedValue::TokenIdentifier(id.into())
    }

    /// Create a byte buffer value
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        TypedValue::Bytes(bytes.into())
    }

    /// Create a byte buffer holding UTF-8 text
    pub fn bytes_from_utf8(text: &str) -> Self {
        TypedValue::Bytes(text.as_bytes().to_vec())
    }

    /// Present `Option`
    pub fn option_some(value: TypedValue) -> Self {
        TypedValue::Option {
            inner_type: value.type_of(),
            value: Some(Box::new(value)),
        }
    }

    /// Absent `Option`
    pub fn option_none(inner_type: Type) -> Self {
        TypedValue::Option {
            inner_type,
            value: None,
        }
    }

    /// Present `optional`
    pub fn optional_some(value: TypedValue) -> Self {
        TypedValue::Optional {
            inner_type: value.type_of(),
            value: Some(Box::new(value)),
        }
    }

    /// Absent `optional`
    pub fn optional_none(inner_type: Type) -> Self {
        TypedValue::Optional {
            inner_type,
            value: None,
        }
    }

    /// Counted sequence
    pub fn list(item_type: Type, items: Vec<TypedValue>) -> Self {
        TypedValue::List { item_type, items }
    }

    /// Variadic sequence
    pub fn variadic(item_type: Type, items: Vec<TypedValue>) -> Self {
        TypedValue::Variadic { item_type, items }
    }

    /// The ABI type of this value
    pub fn type_of(&self) -> Type {
        match self {
            TypedValue::Num(n) => Type::Num(n.num_type()),
            TypedValue::BigUint(_) => Type::BigUint,
            TypedValue::Bool(_) => Type::Bool,
            TypedValue::Address(_) => Type::Address,
            TypedValue::TokenIdentifier(_) => Type::TokenIdentifier,
            TypedValue::Bytes(_) => Type::Bytes,
            TypedValue::Option { inner_type, .. } => Type::option(inner_type.clone()),
            TypedValue::Optional { inner_type, .. } => Type::optional(inner_type.clone()),
            TypedValue::List { item_type, .. } => Type::list(item_type.clone()),
            TypedValue::Variadic { item_type, .. } => Type::variadic(item_type.clone()),
            TypedValue::Struct(s) => Type::Struct(s.ty.clone()),
        }
    }

    /// Integer value of a numeric or big-integer value, if it fits `u64`
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            TypedValue::Num(n) => u64::try_from(n.value()).ok(),
            TypedValue::BigUint(b) => u64::try_from(b).ok(),
            _ => None,
        }
    }

    /// Integer value of a numeric value
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            TypedValue::Num(n) => Some(n.value()),
            _ => None,
        }
    }

    /// Big integer value
    pub fn as_biguint(&self) -> Option<&BigUint> {
        match self {
            TypedValue::BigUint(b) => Some(b),
            _ => None,
        }
    }

    /// Boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Address value
    pub fn as_address(&self) -> Option<&Address> {
        match self {
            TypedValue::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Raw bytes of a byte buffer or token identifier
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TypedValue::Bytes(b) => Some(b),
            TypedValue::TokenIdentifier(s) => Some(s.as_bytes()),
            _ => None,
        }
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        TypedValue::Bool(value)
    }
}

impl From<Address> for TypedValue {
    fn from(value: Address) -> Self {
        TypedValue::Address(value)
    }
}

impl From<BigUint> for TypedValue {
    fn from(value: BigUint) -> Self {
        TypedValue::BigUint(value)
    }
}
