//! ABI type definitions

use std::fmt;

/// Fixed-width integer types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumType {
    /// Unsigned 8-bit
    U8,
    /// Unsigned 16-bit
    U16,
    /// Unsigned 32-bit
    U32,
    /// Unsigned 64-bit
    U64,
    /// Signed 8-bit
    I8,
    /// Signed 16-bit
    I16,
    /// Signed 32-bit
    I32,
    /// Signed 64-bit
    I64,
}

impl NumType {
    /// Width in bytes
    pub const fn width(&self) -> usize {
        match self {
            NumType::U8 | NumType::I8 => 1,
            NumType::U16 | NumType::I16 => 2,
            NumType::U32 | NumType::I32 => 4,
            NumType::U64 | NumType::I64 => 8,
        }
    }

    /// Whether values are two's complement signed
    pub const fn is_signed(&self) -> bool {
        matches!(self, NumType::I8 | NumType::I16 | NumType::I32 | NumType::I64)
    }

    /// Smallest representable value
    pub const fn min(&self) -> i128 {
        if self.is_signed() {
            -(1i128 << (self.width() * 8 - 1))
        } else {
            0
        }
    }

    /// Largest representable value
    pub const fn max(&self) -> i128 {
        if self.is_signed() {
            (1i128 << (self.width() * 8 - 1)) - 1
        } else {
            (1i128 << (self.width() * 8)) - 1
        }
    }

    /// Name as written in ABI type expressions
    pub const fn name(&self) -> &'static str {
        match self {
            NumType::U8 => "u8",
            NumType::U16 => "u16",
            NumType::U32 => "u32",
            NumType::U64 => "u64",
            NumType::I8 => "i8",
            NumType::I16 => "i16",
            NumType::I32 => "i32",
            NumType::I64 => "i64",
        }
    }
}

/// Named field of a composite type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: Type,
}

impl FieldDef {
    /// Create a field definition
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Composite type with ordered named fields
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructType {
    /// Type name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl StructType {
    /// Create a struct type
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// Contract ABI types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Fixed-width integer
    Num(NumType),
    /// Arbitrary-precision unsigned integer
    BigUint,
    /// Boolean
    Bool,
    /// 32-byte address
    Address,
    /// Token identifier (printable ASCII)
    TokenIdentifier,
    /// Raw byte buffer
    Bytes,
    /// Value that may be absent, with an explicit presence marker
    Option(Box<Type>),
    /// Argument that may be omitted entirely (top level / argument position only)
    Optional(Box<Type>),
    /// Counted sequence
    List(Box<Type>),
    /// Variadic sequence, one argument per element
    Variadic(Box<Type>),
    /// Composite with named fields
    Struct(StructType),
}

impl Type {
    /// `Option<inner>`
    pub fn option(inner: Type) -> Self {
        Type::Option(Box::new(inner))
    }

    /// `optional<inner>`
    pub fn optional(inner: Type) -> Self {
        Type::Optional(Box::new(inner))
    }

    /// `List<item>`
    pub fn list(item: Type) -> Self {
        Type::List(Box::new(item))
    }

    /// `variadic<item>`
    pub fn variadic(item: Type) -> Self {
        Type::Variadic(Box::new(item))
    }

    /// Types that only make sense in argument position
    pub fn is_multi_value(&self) -> bool {
        matches!(self, Type::Optional(_) | Type::Variadic(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Num(n) => f.write_str(n.name()),
            Type::BigUint => f.write_str("BigUint"),
            Type::Bool => f.write_str("bool"),
            Type::Address => f.write_str("Address"),
            Type::TokenIdentifier => f.write_str("TokenIdentifier"),
            Type::Bytes => f.write_str("bytes"),
            Type::Option(inner) => write!(f, "Option<{}>", inner),
            Type::Optional(inner) => write!(f, "optional<{}>", inner),
            Type::List(item) => write!(f, "List<{}>", item),
            Type::Variadic(item) => write!(f, "variadic<{}>", item),
            Type::Struct(s) => f.write_str(&s.name),
        }
    }
}
