//! Method synthesis: accessors plus value semantics.

use flat_check::{BoundMethod, FieldTable};

use crate::builder::{
    MethodBuilder, MethodKind, MethodModifiers, MethodSpec, Stmt, TypeRef, ValueRule,
};

pub use flat_ir::{EQUALS, HASH_CODE, TO_STRING};

const HASH_SEED: i32 = 1;

/// Synthesize every method body of the specialized type `type_name`.
///
/// Accessors come first, in contract declaration order, followed by
/// `equals`, `hashCode` and `toString`. Contract methods without accessor
/// directives get no spec. Cannot fail for a validated table.
#[tracing::instrument(level = "debug", skip(table), fields(fields = table.len()))]
pub fn synthesize(table: &FieldTable, type_name: &str) -> Vec<MethodSpec> {
    let mut specs: Vec<MethodSpec> = table.accessors().map(accessor).collect();
    specs.push(equals(table));
    specs.push(hash_code(table));
    specs.push(to_string(table, type_name));

    for spec in &specs {
        tracing::trace!(method = %spec.name, "\n{spec}");
    }
    specs
}

fn accessor(method: &BoundMethod) -> MethodSpec {
    let mut mb = MethodBuilder::new(&method.name, MethodKind::Accessor);
    mb.add_modifier(MethodModifiers::PUBLIC);
    for (name, ty) in &method.params {
        mb.add_param(name, TypeRef::Field(ty.clone()));
    }
    if let Some(ty) = &method.returns {
        mb.set_return_type(TypeRef::Field(ty.clone()));
    }

    for setter in &method.setters {
        mb.add_stmt(Stmt::Store {
            field: setter.field.clone(),
            param: setter.param,
            locked: setter.synchronized,
        });
    }
    if let Some(getter) = &method.getter {
        mb.add_stmt(Stmt::Return {
            field: getter.field.clone(),
            locked: getter.synchronized,
        });
    }
    mb.build()
}

fn value_method(name: &str, kind: MethodKind, returns: TypeRef) -> MethodBuilder {
    let mut mb = MethodBuilder::new(name, kind);
    mb.add_modifier(MethodModifiers::PUBLIC);
    mb.set_return_type(returns);
    mb
}

fn equals(table: &FieldTable) -> MethodSpec {
    let mut mb = value_method(EQUALS, MethodKind::Equals, TypeRef::Bool);
    mb.add_param("other", TypeRef::Instance);
    mb.add_stmt(Stmt::SameInstance);
    mb.add_stmt(Stmt::SameType);
    for field in &table.fields {
        mb.add_stmt(Stmt::Compare {
            field: field.name.clone(),
            rule: ValueRule::for_type(&field.ty),
        });
    }
    mb.add_stmt(Stmt::ReturnBool(true));
    mb.build()
}

fn hash_code(table: &FieldTable) -> MethodSpec {
    let mut mb = value_method(HASH_CODE, MethodKind::HashCode, TypeRef::Int);
    mb.add_stmt(Stmt::HashSeed(HASH_SEED));
    for field in &table.fields {
        mb.add_stmt(Stmt::HashMix {
            field: field.name.clone(),
            rule: ValueRule::for_type(&field.ty),
        });
    }
    mb.add_stmt(Stmt::ReturnHash);
    mb.build()
}

fn to_string(table: &FieldTable, type_name: &str) -> MethodSpec {
    let mut mb = value_method(TO_STRING, MethodKind::Dump, TypeRef::Text);
    mb.add_stmt(Stmt::DumpOpen {
        header: type_name.to_owned(),
    });
    for field in &table.fields {
        mb.add_stmt(Stmt::DumpField {
            field: field.name.clone(),
            rule: ValueRule::for_type(&field.ty),
        });
    }
    mb.add_stmt(Stmt::DumpClose);
    mb.build()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
