//! Contract ABI definitions loaded from JSON

use std::collections::HashMap;

use serde::Deserialize;

use super::types::{FieldDef, NumType, StructType, Type};
use crate::SdkError;

/// Named endpoint parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: Type,
}

impl ParamDef {
    /// Create a parameter definition
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Endpoint (or constructor) signature
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EndpointDef {
    /// Endpoint name
    pub name: String,
    /// Inputs in call order
    pub inputs: Vec<ParamDef>,
    /// Output types in result order
    pub outputs: Vec<Type>,
}

impl EndpointDef {
    /// Create an endpoint definition
    pub fn new(name: impl Into<String>, inputs: Vec<ParamDef>, outputs: Vec<Type>) -> Self {
        Self {
            name: name.into(),
            inputs,
            outputs,
        }
    }
}

/// Parsed contract ABI
#[derive(Debug, Clone, Default)]
pub struct Abi {
    /// Contract name
    pub name: String,
    constructor: EndpointDef,
    upgrade_constructor: Option<EndpointDef>,
    endpoints: Vec<EndpointDef>,
}

impl Abi {
    /// Create an empty ABI
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: EndpointDef::new("init", vec![], vec![]),
            ..Default::default()
        }
    }

    /// Set the constructor
    pub fn with_constructor(mut self, constructor: EndpointDef) -> Self {
        self.constructor = constructor;
        self
    }

    /// Set the upgrade constructor
    pub fn with_upgrade_constructor(mut self, constructor: EndpointDef) -> Self {
        self.upgrade_constructor = Some(constructor);
        self
    }

    /// Add an endpoint
    pub fn with_endpoint(mut self, endpoint: EndpointDef) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Parse the standard ABI JSON document
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let raw: RawAbi = serde_json::from_str(json)
            .map_err(|e| SdkError::AbiDefinition(format!("malformed ABI JSON: {}", e)))?;
        let resolver = TypeResolver::new(&raw.types);

        let constructor = match &raw.constructor {
            Some(c) => resolver.endpoint("init", c)?,
            None => EndpointDef::new("init", vec![], vec![]),
        };
        let upgrade_constructor = raw
            .upgrade_constructor
            .as_ref()
            .map(|c| resolver.endpoint("upgrade", c))
            .transpose()?;
        let endpoints = raw
            .endpoints
            .iter()
            .map(|e| resolver.endpoint(&e.name, &e.signature))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: raw.name,
            constructor,
            upgrade_constructor,
            endpoints,
        })
    }

    /// Look up an endpoint by name
    pub fn endpoint(&self, name: &str) -> Result<&EndpointDef, SdkError> {
        self.endpoints
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| SdkError::UnknownEndpoint(name.to_string()))
    }

    /// All endpoints
    pub fn endpoints(&self) -> &[EndpointDef] {
        &self.endpoints
    }

    /// Deployment constructor
    pub fn constructor(&self) -> &EndpointDef {
        &self.constructor
    }

    /// Upgrade constructor, falling back to the deployment constructor
    pub fn upgrade_constructor(&self) -> &EndpointDef {
        self.upgrade_constructor.as_ref().unwrap_or(&self.constructor)
    }
}

// ==================== Raw JSON ====================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAbi {
    #[serde(default)]
    name: String,
    #[serde(default)]
    constructor: Option<RawSignature>,
    #[serde(default)]
    upgrade_constructor: Option<RawSignature>,
    #[serde(default)]
    endpoints: Vec<RawEndpoint>,
    #[serde(default)]
    types: HashMap<String, RawTypeDef>,
}

#[derive(Deserialize)]
struct RawEndpoint {
    name: String,
    #[serde(flatten)]
    signature: RawSignature,
}

#[derive(Deserialize)]
struct RawSignature {
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Deserialize)]
struct RawTypeDef {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    fields: Vec<RawParam>,
}

// ==================== Type expressions ====================

struct TypeResolver<'a> {
    custom: &'a HashMap<String, RawTypeDef>,
}

impl<'a> TypeResolver<'a> {
    fn new(custom: &'a HashMap<String, RawTypeDef>) -> Self {
        Self { custom }
    }

    fn endpoint(&self, name: &str, sig: &RawSignature) -> Result<EndpointDef, SdkError> {
        let inputs = sig
            .inputs
            .iter()
            .map(|p| Ok(ParamDef::new(p.name.clone(), self.resolve(&p.ty, &mut Vec::new())?)))
            .collect::<Result<Vec<_>, SdkError>>()?;
        let outputs = sig
            .outputs
            .iter()
            .map(|p| self.resolve(&p.ty, &mut Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(EndpointDef::new(name, inputs, outputs))
    }

    /// Resolve a type expression; `stack` holds the structs being resolved
    fn resolve(&self, expr: &str, stack: &mut Vec<String>) -> Result<Type, SdkError> {
        let expr = expr.trim();
        if let Some((outer, inner)) = split_generic(expr)? {
            let inner = self.resolve(inner, stack)?;
            if inner.is_multi_value() {
                return Err(SdkError::AbiDefinition(format!(
                    "{} cannot be nested in {}<...>",
                    inner, outer
                )));
            }
            return match outer {
                "Option" => Ok(Type::option(inner)),
                "optional" | "OptionalValue" => Ok(Type::optional(inner)),
                "List" | "vec" | "Vec" | "ManagedVec" => Ok(Type::list(inner)),
                "variadic" | "MultiValueEncoded" | "MultiValueManagedVec" => {
                    Ok(Type::variadic(inner))
                }
                other => Err(SdkError::AbiDefinition(format!(
                    "unsupported generic type {}<...>",
                    other
                ))),
            };
        }

        let simple = match expr {
            "u8" => Type::Num(NumType::U8),
            "u16" => Type::Num(NumType::U16),
            "u32" | "usize" => Type::Num(NumType::U32),
            "u64" => Type::Num(NumType::U64),
            "i8" => Type::Num(NumType::I8),
            "i16" => Type::Num(NumType::I16),
            "i32" | "isize" => Type::Num(NumType::I32),
            "i64" => Type::Num(NumType::I64),
            "BigUint" => Type::BigUint,
            "bool" => Type::Bool,
            "Address" | "ManagedAddress" => Type::Address,
            "TokenIdentifier" | "EgldOrEsdtTokenIdentifier" => Type::TokenIdentifier,
            "bytes" | "ManagedBuffer" | "BoxedBytes" => Type::Bytes,
            name => return self.resolve_custom(name, stack),
        };
        Ok(simple)
    }

    fn resolve_custom(&self, name: &str, stack: &mut Vec<String>) -> Result<Type, SdkError> {
        let def = self
            .custom
            .get(name)
            .ok_or_else(|| SdkError::AbiDefinition(format!("unknown type {}", name)))?;
        if def.kind != "struct" {
            return Err(SdkError::AbiDefinition(format!(
                "unsupported custom type kind {:?} for {}",
                def.kind, name
            )));
        }
        if stack.iter().any(|s| s == name) {
            return Err(SdkError::AbiDefinition(format!(
                "recursive type {} cannot be encoded",
                name
            )));
        }

        if def.fields.is_empty() {
            return Err(SdkError::AbiDefinition(format!("struct {} has no fields", name)));
        }

        stack.push(name.to_string());
        let fields = def
            .fields
            .iter()
            .map(|f| self.field(f, stack))
            .collect::<Result<Vec<_>, SdkError>>();
        stack.pop();

        Ok(Type::Struct(StructType::new(name, fields?)))
    }

    fn field(&self, raw: &RawParam, stack: &mut Vec<String>) -> Result<FieldDef, SdkError> {
        let ty = self.resolve(&raw.ty, stack)?;
        if ty.is_multi_value() {
            return Err(SdkError::AbiDefinition(format!(
                "field {} cannot have argument-only type {}",
                raw.name, ty
            )));
        }
        Ok(FieldDef::new(raw.name.clone(), ty))
    }
}

/// Split `Outer<Inner>` into its parts; `None` for non-generic expressions
fn split_generic(expr: &str) -> Result<Option<(&str, &str)>, SdkError> {
    let Some(open) = expr.find('<') else {
        return Ok(None);
    };
    if !expr.ends_with('>') {
        return Err(SdkError::AbiDefinition(format!("malformed type expression {:?}", expr)));
    }
    let outer = &expr[..open];
    let inner = &expr[open + 1..expr.len() - 1];

    // Only single-parameter generics are supported
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    SdkError::AbiDefinition(format!("unbalanced type expression {:?}", expr))
                })?
            }
            ',' if depth == 0 => {
                return Err(SdkError::AbiDefinition(format!(
                    "multi-parameter type {:?} is not supported",
                    expr
                )))
            }
            _ => {}
        }
    }
    if depth != 0 || inner.trim().is_empty() {
        return Err(SdkError::AbiDefinition(format!("malformed type expression {:?}", expr)));
    }
    Ok(Some((outer.trim(), inner)))
}
