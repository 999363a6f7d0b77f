//! Contract and value model for the flatstruct specialization engine.
//!
//! A [`Contract`] declares ordered fields and the accessor directives that
//! bind methods to them. [`Value`] is what those fields hold at runtime.
//! Everything downstream (validation, layout, synthesis, emission) reads from
//! the types defined here.

mod contract;
mod types;
mod value;

pub use contract::{
    AccessorDirective, Contract, ContractBuilder, ContractDef, ContractId, ContractKind, DefError,
    FieldDirective, FieldModifiers, MethodDecl, MethodDeclBuilder, ParamDecl, EQUALS, HASH_CODE,
    TO_STRING, VALUE_METHODS,
};
pub use types::{FieldType, ParseTypeError, PrimitiveKind, ReferenceKind};
pub use value::{bytes_hash, string_hash, ObjectRef, Value};
