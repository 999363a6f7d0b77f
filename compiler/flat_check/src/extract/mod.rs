//! Contract → field table.

use flat_ir::{Contract, ContractKind, FieldModifiers, MethodDecl, VALUE_METHODS};
use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::table::{BoundMethod, Field, FieldTable, GetterBinding, SetterBinding};

/// Validate `contract` and extract its field table.
///
/// Checks run in a fixed order: contract kind, field directives, then each
/// method in declaration order. The first problem found is returned.
#[tracing::instrument(level = "debug", skip_all, fields(contract = %contract.name()))]
pub fn extract(contract: &Contract) -> Result<FieldTable, ValidationError> {
    if contract.kind() == ContractKind::Class {
        return Err(ValidationError::NotAContract(contract.name().to_owned()));
    }

    let fields = extract_fields(contract)?;
    let table = FieldTable::new(contract.name().to_owned(), fields, Vec::new());

    let mut seen = FxHashSet::default();
    let mut methods = Vec::with_capacity(contract.methods().len());
    for decl in contract.methods() {
        if !seen.insert(decl.name.as_str()) {
            return Err(ValidationError::DuplicateMethod(decl.name.clone()));
        }
        if decl.has_directives() && VALUE_METHODS.contains(&decl.name.as_str()) {
            return Err(ValidationError::ReservedMethod(decl.name.clone()));
        }
        methods.push(bind_method(&table, decl)?);
    }

    let table = table.with_methods(methods);
    tracing::debug!(
        fields = table.len(),
        accessors = table.accessors().count(),
        "extracted field table"
    );
    Ok(table)
}

/// Like [`extract`], for callers that may not have a contract at all.
pub fn extract_opt(contract: Option<&Contract>) -> Result<FieldTable, ValidationError> {
    contract.map_or(Err(ValidationError::NullContract), extract)
}

fn extract_fields(contract: &Contract) -> Result<Vec<Field>, ValidationError> {
    let mut fields: Vec<Field> = Vec::with_capacity(contract.fields().len());
    let mut seen = FxHashSet::default();
    for (position, directive) in contract.fields().iter().enumerate() {
        let name = match directive.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ValidationError::MissingFieldName { position }),
        };
        let Some(ty) = directive.declared_type.clone() else {
            return Err(ValidationError::MissingFieldType(name.to_owned()));
        };
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateField(name.to_owned()));
        }

        let mut modifiers = FieldModifiers::PRIVATE;
        if directive.volatile {
            modifiers |= FieldModifiers::VOLATILE;
        }
        fields.push(Field {
            name: name.to_owned(),
            ty,
            modifiers,
            index: fields.len(),
        });
    }
    Ok(fields)
}

fn bind_method(table: &FieldTable, decl: &MethodDecl) -> Result<BoundMethod, ValidationError> {
    let lookup = |field: &str| {
        table.field(field).ok_or_else(|| ValidationError::UnknownField {
            method: decl.name.clone(),
            field: field.to_owned(),
        })
    };

    let mut setters = Vec::new();
    for (param, p) in decl.params.iter().enumerate() {
        let Some(directive) = &p.setter else {
            continue;
        };
        let field = lookup(&directive.field)?;
        if field.ty != p.ty {
            return Err(ValidationError::AccessorTypeMismatch {
                field: field.name.clone(),
                expected: field.ty.clone(),
                actual: p.ty.clone(),
            });
        }
        setters.push(SetterBinding {
            param,
            field: field.name.clone(),
            synchronized: directive.synchronized,
        });
    }

    let getter = match &decl.getter {
        Some(directive) => {
            let field = lookup(&directive.field)?;
            let Some(returns) = &decl.returns else {
                return Err(ValidationError::GetterWithoutReturnType {
                    method: decl.name.clone(),
                    field: field.name.clone(),
                });
            };
            if *returns != field.ty {
                return Err(ValidationError::AccessorTypeMismatch {
                    field: field.name.clone(),
                    expected: field.ty.clone(),
                    actual: returns.clone(),
                });
            }
            Some(GetterBinding {
                field: field.name.clone(),
                synchronized: directive.synchronized,
            })
        }
        None => None,
    };

    // A getter may also assign through setter parameters; any other
    // parameter of an accessor is left without a value to store.
    if getter.is_some() && setters.is_empty() && !decl.params.is_empty() {
        return Err(ValidationError::GetterHasParameters {
            method: decl.name.clone(),
        });
    }
    if !setters.is_empty() {
        if getter.is_none() && decl.returns.is_some() {
            return Err(ValidationError::SetterHasReturnType {
                method: decl.name.clone(),
            });
        }
        if let Some(p) = decl.params.iter().find(|p| p.setter.is_none()) {
            return Err(ValidationError::UnboundParameter {
                method: decl.name.clone(),
                param: p.name.clone(),
            });
        }
    }

    Ok(BoundMethod {
        name: decl.name.clone(),
        params: decl.params.iter().map(|p| (p.name.clone(), p.ty.clone())).collect(),
        returns: decl.returns.clone(),
        setters,
        getter,
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
