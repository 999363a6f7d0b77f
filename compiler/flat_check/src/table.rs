//! The validated field table.

use flat_ir::{FieldModifiers, FieldType};
use rustc_hash::FxHashMap;

/// A validated field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub modifiers: FieldModifiers,
    /// Position in schema order.
    pub index: usize,
}

impl Field {
    pub fn is_volatile(&self) -> bool {
        self.modifiers.contains(FieldModifiers::VOLATILE)
    }
}

/// A setter parameter bound to a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetterBinding {
    /// Position of the parameter in the method signature.
    pub param: usize,
    pub field: String,
    pub synchronized: bool,
}

/// A getter bound to a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetterBinding {
    pub field: String,
    pub synchronized: bool,
}

/// A contract method with its checked bindings.
///
/// Methods without any binding are kept too: they stay abstract on the
/// specialized type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundMethod {
    pub name: String,
    pub params: Vec<(String, FieldType)>,
    pub returns: Option<FieldType>,
    pub setters: Vec<SetterBinding>,
    pub getter: Option<GetterBinding>,
}

impl BoundMethod {
    /// Whether the synthesizer produces a body for this method.
    pub fn is_accessor(&self) -> bool {
        self.getter.is_some() || !self.setters.is_empty()
    }
}

/// Ordered fields and accessor bindings of a validated contract.
#[derive(Clone, Debug)]
pub struct FieldTable {
    pub contract_name: String,
    pub fields: Vec<Field>,
    pub methods: Vec<BoundMethod>,
    index: FxHashMap<String, usize>,
}

impl FieldTable {
    pub(crate) fn new(
        contract_name: String,
        fields: Vec<Field>,
        methods: Vec<BoundMethod>,
    ) -> Self {
        let index = fields
            .iter()
            .map(|f| (f.name.clone(), f.index))
            .collect();
        FieldTable {
            contract_name,
            fields,
            methods,
            index,
        }
    }

    pub(crate) fn with_methods(mut self, methods: Vec<BoundMethod>) -> Self {
        self.methods = methods;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn accessors(&self) -> impl Iterator<Item = &BoundMethod> {
        self.methods.iter().filter(|m| m.is_accessor())
    }
}
