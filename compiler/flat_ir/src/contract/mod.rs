//! Capability contracts: the authored schema a record type is specialized from.
//!
//! A contract is the raw, unvalidated form. Field names and types stay
//! optional here so the extractor can report incomplete directives instead of
//! the builder panicking on them.

mod builder;
mod def;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Deserialize;

use crate::types::FieldType;

pub use builder::{ContractBuilder, MethodDeclBuilder};
pub use def::{ContractDef, DefError};

/// Name of the synthesized structural equality method.
pub const EQUALS: &str = "equals";
/// Name of the synthesized structural hash method.
pub const HASH_CODE: &str = "hashCode";
/// Name of the synthesized textual dump method.
pub const TO_STRING: &str = "toString";

/// Method names every specialized type implements itself.
pub const VALUE_METHODS: [&str; 3] = [EQUALS, HASH_CODE, TO_STRING];

bitflags::bitflags! {
    /// Storage modifiers of a validated field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FieldModifiers: u8 {
        /// Storage is hidden behind accessors. Always set on specialized fields.
        const PRIVATE = 1;
        /// Every read and write takes the slot's exclusive lock.
        const VOLATILE = 1 << 1;
    }
}

/// Process-unique identity of a contract.
///
/// Allocated once when the contract is built; two contracts with identical
/// fields are still distinct contracts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractId(u64);

impl ContractId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ContractId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a contract is a pure capability contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    /// No own implementation; may be specialized.
    #[default]
    Interface,
    /// Carries its own implementation; rejected by the extractor.
    Class,
}

/// A field declaration as authored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDirective {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub declared_type: Option<FieldType>,
    #[serde(default)]
    pub volatile: bool,
}

impl FieldDirective {
    pub fn new(name: impl Into<String>, declared_type: FieldType) -> Self {
        FieldDirective {
            name: Some(name.into()),
            declared_type: Some(declared_type),
            volatile: false,
        }
    }
}

/// Ties a getter method or a setter parameter to a field.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessorDirective {
    pub field: String,
    /// Access happens under the field's exclusive lock.
    #[serde(default)]
    pub synchronized: bool,
}

impl AccessorDirective {
    pub fn new(field: impl Into<String>) -> Self {
        AccessorDirective {
            field: field.into(),
            synchronized: false,
        }
    }

    #[must_use]
    pub fn synchronized(mut self) -> Self {
        self.synchronized = true;
        self
    }
}

/// A method parameter, optionally bound to a field by a setter directive.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub setter: Option<AccessorDirective>,
}

/// A method declared by a contract.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
    #[serde(default)]
    pub returns: Option<FieldType>,
    #[serde(default)]
    pub getter: Option<AccessorDirective>,
}

impl MethodDecl {
    pub fn builder(name: impl Into<String>) -> MethodDeclBuilder {
        MethodDeclBuilder::new(name)
    }

    /// Whether any accessor directive is attached to this method.
    pub fn has_directives(&self) -> bool {
        self.getter.is_some() || self.params.iter().any(|p| p.setter.is_some())
    }
}

/// A capability contract.
#[derive(Debug)]
pub struct Contract {
    id: ContractId,
    name: String,
    kind: ContractKind,
    fields: Vec<FieldDirective>,
    methods: Vec<MethodDecl>,
}

impl Contract {
    pub(crate) fn new(
        name: String,
        kind: ContractKind,
        fields: Vec<FieldDirective>,
        methods: Vec<MethodDecl>,
    ) -> Arc<Contract> {
        Arc::new(Contract {
            id: ContractId::fresh(),
            name,
            kind,
            fields,
            methods,
        })
    }

    /// Start building a pure capability contract.
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    /// Field directives in declaration order.
    pub fn fields(&self) -> &[FieldDirective] {
        &self.fields
    }

    /// Method declarations in declaration order.
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
