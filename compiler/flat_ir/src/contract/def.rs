//! Serde-backed contract definitions.

use std::sync::Arc;

use serde::Deserialize;

use crate::contract::{Contract, ContractKind, FieldDirective, MethodDecl};

/// Error loading a [`ContractDef`].
#[derive(Debug, thiserror::Error)]
pub enum DefError {
    #[error("malformed contract definition: {0}")]
    Json(#[from] serde_json::Error),
}

/// A contract as written in a declarative document.
///
/// Field directives keep their optional parts, so an incomplete entry loads
/// fine here and is reported by the extractor instead.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDef {
    pub name: String,
    #[serde(default)]
    pub kind: ContractKind,
    #[serde(default)]
    pub fields: Vec<FieldDirective>,
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
}

impl ContractDef {
    /// Parse a JSON document. A literal `null` document yields `None`.
    pub fn from_json(text: &str) -> Result<Option<ContractDef>, DefError> {
        Ok(serde_json::from_str::<Option<ContractDef>>(text)?)
    }

    /// Freeze into a contract with a fresh identity.
    pub fn into_contract(self) -> Arc<Contract> {
        Contract::new(self.name, self.kind, self.fields, self.methods)
    }
}
