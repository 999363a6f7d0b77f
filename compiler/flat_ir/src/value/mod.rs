//! Runtime field values.
//!
//! Values carry the 32-bit hash contributions used by synthesized `hashCode`
//! bodies. Primitive contributions truncate to `i32`; reference contributions
//! delegate to the referenced value.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::types::{FieldType, PrimitiveKind, ReferenceKind};

/// A host object stored in an `object:<Name>` field.
///
/// Equality and hashing of object fields delegate to these methods.
pub trait ObjectRef: fmt::Debug + Send + Sync + 'static {
    /// Declared type name; must match the field's `object:<Name>` spelling.
    fn type_name(&self) -> &str;

    fn equals(&self, other: &dyn ObjectRef) -> bool;

    fn hash_code(&self) -> i32;

    fn as_any(&self) -> &dyn Any;
}

/// A value held in a record field, passed as an argument, or returned.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    Object(Arc<dyn ObjectRef>),
    Null,
}

impl Value {
    /// Initial value of a freshly constructed field of type `ty`.
    pub fn default_for(ty: &FieldType) -> Value {
        match ty {
            FieldType::Primitive(kind) => match kind {
                PrimitiveKind::Bool => Value::Bool(false),
                PrimitiveKind::I8 => Value::I8(0),
                PrimitiveKind::I16 => Value::I16(0),
                PrimitiveKind::I32 => Value::I32(0),
                PrimitiveKind::I64 => Value::I64(0),
                PrimitiveKind::F32 => Value::F32(0.0),
                PrimitiveKind::F64 => Value::F64(0.0),
                PrimitiveKind::Char => Value::Char('\0'),
            },
            FieldType::Reference(_) => Value::Null,
        }
    }

    pub fn str(text: &str) -> Value {
        Value::Str(Arc::from(text))
    }

    pub fn bytes(data: &[u8]) -> Value {
        Value::Bytes(Arc::from(data))
    }

    pub fn object(object: impl ObjectRef) -> Value {
        Value::Object(Arc::new(object))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value's runtime kind, for error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Bool(_) => "bool".to_owned(),
            Value::I8(_) => "i8".to_owned(),
            Value::I16(_) => "i16".to_owned(),
            Value::I32(_) => "i32".to_owned(),
            Value::I64(_) => "i64".to_owned(),
            Value::F32(_) => "f32".to_owned(),
            Value::F64(_) => "f64".to_owned(),
            Value::Char(_) => "char".to_owned(),
            Value::Str(_) => "str".to_owned(),
            Value::Bytes(_) => "bytes".to_owned(),
            Value::Object(o) => format!("object:{}", o.type_name()),
            Value::Null => "null".to_owned(),
        }
    }

    /// Whether this value may be stored in a field declared as `ty`.
    ///
    /// `Null` conforms to every reference type and to no primitive type.
    pub fn conforms_to(&self, ty: &FieldType) -> bool {
        match (self, ty) {
            (Value::Bool(_), FieldType::Primitive(PrimitiveKind::Bool))
            | (Value::I8(_), FieldType::Primitive(PrimitiveKind::I8))
            | (Value::I16(_), FieldType::Primitive(PrimitiveKind::I16))
            | (Value::I32(_), FieldType::Primitive(PrimitiveKind::I32))
            | (Value::I64(_), FieldType::Primitive(PrimitiveKind::I64))
            | (Value::F32(_), FieldType::Primitive(PrimitiveKind::F32))
            | (Value::F64(_), FieldType::Primitive(PrimitiveKind::F64))
            | (Value::Char(_), FieldType::Primitive(PrimitiveKind::Char))
            | (Value::Str(_), FieldType::Reference(ReferenceKind::Str))
            | (Value::Bytes(_), FieldType::Reference(ReferenceKind::Bytes))
            | (Value::Null, FieldType::Reference(_)) => true,
            (Value::Object(o), FieldType::Reference(ReferenceKind::Object(name))) => {
                o.type_name() == name
            }
            _ => false,
        }
    }

    /// Primitive inequality: the `!=` of the primitive's own type.
    ///
    /// Floating-point fields follow IEEE semantics, so `NaN` never equals
    /// itself. Mixed kinds are always unequal.
    #[allow(clippy::float_cmp, reason = "field equality is exact by definition")]
    pub fn primitive_ne(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a != b,
            (Value::I8(a), Value::I8(b)) => a != b,
            (Value::I16(a), Value::I16(b)) => a != b,
            (Value::I32(a), Value::I32(b)) => a != b,
            (Value::I64(a), Value::I64(b)) => a != b,
            (Value::F32(a), Value::F32(b)) => a != b,
            (Value::F64(a), Value::F64(b)) => a != b,
            (Value::Char(a), Value::Char(b)) => a != b,
            _ => true,
        }
    }

    /// Null-safe delegated equality for reference values.
    ///
    /// Both null: equal. Exactly one null: unequal. Otherwise the referenced
    /// values decide.
    pub fn reference_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.equals(b.as_ref()),
            _ => false,
        }
    }

    /// Hash contribution of a primitive value, truncated to 32 bits.
    ///
    /// Wider integers keep their low 32 bits, floats convert with `as`
    /// (saturating, `NaN` to zero), `bool` contributes 1 or 0.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        reason = "truncation to 32 bits is the documented hash contribution"
    )]
    pub fn primitive_hash(&self) -> i32 {
        match self {
            Value::Bool(b) => i32::from(*b),
            Value::I8(v) => i32::from(*v),
            Value::I16(v) => i32::from(*v),
            Value::I32(v) => *v,
            Value::I64(v) => *v as i32,
            Value::F32(v) => *v as i32,
            Value::F64(v) => *v as i32,
            Value::Char(c) => u32::from(*c) as i32,
            _ => 0,
        }
    }

    /// Delegated hash of a reference value, or 0 when null.
    pub fn reference_hash(&self) -> i32 {
        match self {
            Value::Str(s) => string_hash(s),
            Value::Bytes(b) => bytes_hash(b),
            Value::Object(o) => o.hash_code(),
            _ => 0,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// String hash over UTF-16 code units: `h = 31*h + unit`, starting at 0.
pub fn string_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Byte-buffer hash: `h = 31*h + byte` over signed bytes, starting at 1.
pub fn bytes_hash(data: &[u8]) -> i32 {
    data.iter().fold(1i32, |h, &byte| {
        h.wrapping_mul(31)
            .wrapping_add(i32::from(i8::from_ne_bytes([byte])))
    })
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(_) | Value::Bytes(_) | Value::Object(_) | Value::Null, _) => {
                self.reference_eq(other)
            }
            _ => !self.primitive_ne(other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F32(v) => write_float(f, *v),
            Value::F64(v) => write_float(f, *v),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Bytes(b) => write!(f, "{b:?}"),
            Value::Object(o) => write!(f, "{o:?}"),
            Value::Null => f.write_str("null"),
        }
    }
}

/// Float literal spelling: `1.0`, `0.001`, `1.0E7`, `1.5E-5`, `NaN`, `-Infinity`.
///
/// Plain notation for magnitudes in `[1e-3, 1e7)` and for zero, scientific
/// otherwise. Digits are the shortest that round-trip in the value's own width.
fn write_float<T>(f: &mut fmt::Formatter<'_>, v: T) -> fmt::Result
where
    T: Copy + Into<f64> + fmt::Display + fmt::LowerExp,
{
    let wide: f64 = v.into();
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let plain = v.to_string();
        if plain.contains('.') {
            f.write_str(&plain)
        } else {
            write!(f, "{plain}.0")
        }
    } else {
        let sci = format!("{v:e}");
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        if mantissa.contains('.') {
            write!(f, "{mantissa}E{exponent}")
        } else {
            write!(f, "{mantissa}.0E{exponent}")
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    char => Char,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
