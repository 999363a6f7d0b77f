//! Fluent builders for contracts and method declarations.

use std::sync::Arc;

use crate::contract::{
    AccessorDirective, Contract, ContractKind, FieldDirective, MethodDecl, ParamDecl,
};
use crate::types::FieldType;

/// Builder for [`Contract`].
///
/// ```
/// use flat_ir::{Contract, FieldType};
///
/// let point = Contract::builder("Point2D")
///     .field("x", FieldType::I32)
///     .field("y", FieldType::I32)
///     .getter("getX", "x", FieldType::I32)
///     .setter("setX", "x", FieldType::I32)
///     .build();
///
/// assert_eq!(point.fields().len(), 2);
/// assert_eq!(point.methods().len(), 2);
/// ```
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    kind: ContractKind,
    fields: Vec<FieldDirective>,
    methods: Vec<MethodDecl>,
}

impl ContractBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ContractBuilder {
            name: name.into(),
            kind: ContractKind::Interface,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: ContractKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldDirective::new(name, ty));
        self
    }

    /// Add a field whose storage is exclusive-access-guarded.
    #[must_use]
    pub fn volatile_field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        let mut directive = FieldDirective::new(name, ty);
        directive.volatile = true;
        self.fields.push(directive);
        self
    }

    /// Add a raw field directive, possibly incomplete.
    #[must_use]
    pub fn directive(mut self, directive: FieldDirective) -> Self {
        self.fields.push(directive);
        self
    }

    /// Add a zero-argument getter `method` returning `returns`, bound to `field`.
    #[must_use]
    pub fn getter(self, method: &str, field: &str, returns: FieldType) -> Self {
        self.method(
            MethodDecl::builder(method)
                .returns(returns)
                .getter(AccessorDirective::new(field))
                .build(),
        )
    }

    /// Like [`getter`](Self::getter), reading under the field's lock.
    #[must_use]
    pub fn synchronized_getter(self, method: &str, field: &str, returns: FieldType) -> Self {
        self.method(
            MethodDecl::builder(method)
                .returns(returns)
                .getter(AccessorDirective::new(field).synchronized())
                .build(),
        )
    }

    /// Add a one-parameter setter `method` whose parameter is bound to `field`.
    #[must_use]
    pub fn setter(self, method: &str, field: &str, param: FieldType) -> Self {
        self.method(
            MethodDecl::builder(method)
                .setter_param(field, param, AccessorDirective::new(field))
                .build(),
        )
    }

    /// Like [`setter`](Self::setter), writing under the field's lock.
    #[must_use]
    pub fn synchronized_setter(self, method: &str, field: &str, param: FieldType) -> Self {
        self.method(
            MethodDecl::builder(method)
                .setter_param(field, param, AccessorDirective::new(field).synchronized())
                .build(),
        )
    }

    #[must_use]
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    pub fn build(self) -> Arc<Contract> {
        Contract::new(self.name, self.kind, self.fields, self.methods)
    }
}

/// Builder for [`MethodDecl`].
#[derive(Debug)]
pub struct MethodDeclBuilder {
    decl: MethodDecl,
}

impl MethodDeclBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDeclBuilder {
            decl: MethodDecl {
                name: name.into(),
                params: Vec::new(),
                returns: None,
                getter: None,
            },
        }
    }

    /// Add a parameter with no directive.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.decl.params.push(ParamDecl {
            name: name.into(),
            ty,
            setter: None,
        });
        self
    }

    /// Add a parameter carrying a setter directive.
    #[must_use]
    pub fn setter_param(
        mut self,
        name: impl Into<String>,
        ty: FieldType,
        setter: AccessorDirective,
    ) -> Self {
        self.decl.params.push(ParamDecl {
            name: name.into(),
            ty,
            setter: Some(setter),
        });
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: FieldType) -> Self {
        self.decl.returns = Some(ty);
        self
    }

    #[must_use]
    pub fn getter(mut self, getter: AccessorDirective) -> Self {
        self.decl.getter = Some(getter);
        self
    }

    pub fn build(self) -> MethodDecl {
        self.decl
    }
}
