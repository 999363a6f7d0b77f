//! Validation errors.

use flat_ir::FieldType;

/// A schema problem found before any code is synthesized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no contract was supplied")]
    NullContract,

    #[error("`{0}` carries its own implementation and is not a capability contract")]
    NotAContract(String),

    #[error("field directive #{position} has no name")]
    MissingFieldName { position: usize },

    #[error("field `{0}` has no declared type")]
    MissingFieldType(String),

    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("method `{method}` refers to unknown field `{field}`")]
    UnknownField { method: String, field: String },

    #[error("accessor for field `{field}` uses type `{actual}`, but the field is `{expected}`")]
    AccessorTypeMismatch {
        field: String,
        expected: FieldType,
        actual: FieldType,
    },

    #[error("getter `{method}` must take no parameters")]
    GetterHasParameters { method: String },

    #[error("getter `{method}` for field `{field}` declares no return type")]
    GetterWithoutReturnType { method: String, field: String },

    #[error("setter `{method}` must not declare a return type")]
    SetterHasReturnType { method: String },

    #[error("parameter `{param}` of setter `{method}` is not bound to a field")]
    UnboundParameter { method: String, param: String },

    #[error("method `{0}` is declared more than once")]
    DuplicateMethod(String),

    #[error("accessor `{0}` uses a name reserved for a synthesized value method")]
    ReservedMethod(String),
}

impl ValidationError {
    /// The field the error is about, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingFieldType(field)
            | ValidationError::DuplicateField(field)
            | ValidationError::UnknownField { field, .. }
            | ValidationError::AccessorTypeMismatch { field, .. }
            | ValidationError::GetterWithoutReturnType { field, .. } => Some(field),
            _ => None,
        }
    }
}
