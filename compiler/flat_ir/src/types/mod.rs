//! Declared field types.
//!
//! A field is either a primitive (stored and compared by value) or a
//! reference (nullable, compared and hashed by delegation). The split drives
//! every value-semantics rule the synthesizer emits.

use std::fmt;
use std::str::FromStr;

/// Primitive field kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
}

impl PrimitiveKind {
    /// Spelling used in declarative schemas and listings.
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::I8 => "i8",
            PrimitiveKind::I16 => "i16",
            PrimitiveKind::I32 => "i32",
            PrimitiveKind::I64 => "i64",
            PrimitiveKind::F32 => "f32",
            PrimitiveKind::F64 => "f64",
            PrimitiveKind::Char => "char",
        }
    }
}

/// Reference field kinds. Reference fields may hold `null`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// Immutable text.
    Str,
    /// Immutable byte buffer.
    Bytes,
    /// Opaque host object, identified by its type name.
    Object(String),
}

/// The declared type of a field, parameter, or return value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Reference(ReferenceKind),
}

impl FieldType {
    pub const BOOL: FieldType = FieldType::Primitive(PrimitiveKind::Bool);
    pub const I8: FieldType = FieldType::Primitive(PrimitiveKind::I8);
    pub const I16: FieldType = FieldType::Primitive(PrimitiveKind::I16);
    pub const I32: FieldType = FieldType::Primitive(PrimitiveKind::I32);
    pub const I64: FieldType = FieldType::Primitive(PrimitiveKind::I64);
    pub const F32: FieldType = FieldType::Primitive(PrimitiveKind::F32);
    pub const F64: FieldType = FieldType::Primitive(PrimitiveKind::F64);
    pub const CHAR: FieldType = FieldType::Primitive(PrimitiveKind::Char);
    pub const STR: FieldType = FieldType::Reference(ReferenceKind::Str);
    pub const BYTES: FieldType = FieldType::Reference(ReferenceKind::Bytes);

    /// An opaque object type with the given name.
    pub fn object(name: impl Into<String>) -> Self {
        FieldType::Reference(ReferenceKind::Object(name.into()))
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, FieldType::Reference(_))
    }

    /// Identifier-safe spelling, used to name grouped storage.
    ///
    /// `object:Point` becomes `object_Point`.
    pub fn ident(&self) -> String {
        match self {
            FieldType::Primitive(kind) => kind.as_str().to_owned(),
            FieldType::Reference(ReferenceKind::Str) => "str".to_owned(),
            FieldType::Reference(ReferenceKind::Bytes) => "bytes".to_owned(),
            FieldType::Reference(ReferenceKind::Object(name)) => format!("object_{name}"),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(kind) => f.write_str(kind.as_str()),
            FieldType::Reference(ReferenceKind::Str) => f.write_str("str"),
            FieldType::Reference(ReferenceKind::Bytes) => f.write_str("bytes"),
            FieldType::Reference(ReferenceKind::Object(name)) => write!(f, "object:{name}"),
        }
    }
}

/// Error returned when a type spelling is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown field type `{0}`")]
pub struct ParseTypeError(pub String);

impl FromStr for FieldType {
    type Err = ParseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "bool" => FieldType::BOOL,
            "i8" => FieldType::I8,
            "i16" => FieldType::I16,
            "i32" => FieldType::I32,
            "i64" => FieldType::I64,
            "f32" => FieldType::F32,
            "f64" => FieldType::F64,
            "char" => FieldType::CHAR,
            "str" => FieldType::STR,
            "bytes" => FieldType::BYTES,
            other => match other.strip_prefix("object:") {
                Some(name) if !name.is_empty() => FieldType::object(name),
                _ => return Err(ParseTypeError(other.to_owned())),
            },
        };
        Ok(ty)
    }
}

impl TryFrom<String> for FieldType {
    type Error = ParseTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl<'de> serde::Deserialize<'de> for FieldType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let spelling = String::deserialize(deserializer)?;
        spelling.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests;
