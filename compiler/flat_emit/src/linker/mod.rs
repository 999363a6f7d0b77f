//! The emitter boundary and its default implementation.

use std::fmt::Write as _;
use std::sync::Arc;

use flat_ir::Contract;
use flat_synth::{MethodKind, MethodSpec, Stmt, StorageSpec, TypeRef, EQUALS, HASH_CODE, TO_STRING};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::error::EmitError;
use crate::loaded::{
    Access, AccessorBody, DumpBody, EqualsBody, HashBody, LoadOp, LoadedType, StoreOp,
};

/// Everything an emitter needs to produce one specialized type.
#[derive(Debug)]
pub struct EmitRequest<'a> {
    pub storage: StorageSpec,
    pub methods: Vec<MethodSpec>,
    pub contract: &'a Arc<Contract>,
    pub type_name: &'a str,
}

/// Turns storage and method specs into a loaded type.
///
/// Implementations must be shareable across threads; the specialization
/// cache calls them from whichever thread claims a key first.
pub trait Emitter: Send + Sync {
    fn emit(&self, request: EmitRequest<'_>) -> Result<LoadedType, EmitError>;
}

/// The default emitter: links specs into compiled op tables.
#[derive(Copy, Clone, Debug, Default)]
pub struct Linker;

impl Emitter for Linker {
    #[tracing::instrument(level = "debug", skip_all, fields(type_name = request.type_name))]
    fn emit(&self, request: EmitRequest<'_>) -> Result<LoadedType, EmitError> {
        let EmitRequest {
            storage,
            methods,
            contract,
            type_name,
        } = request;
        let scope = Scope {
            storage: &storage,
            contract,
        };

        let mut seen = FxHashSet::default();
        let mut accessors = FxHashMap::default();
        let mut equals = None;
        let mut hash = None;
        let mut dump = None;
        for spec in &methods {
            if !seen.insert(spec.name.as_str()) {
                return Err(EmitError::DuplicateMethod(spec.name.clone()));
            }
            match spec.kind {
                MethodKind::Accessor => {
                    accessors.insert(spec.name.clone(), scope.accessor(spec)?);
                }
                MethodKind::Equals => equals = Some(scope.equals(spec)?),
                MethodKind::HashCode => hash = Some(scope.hash(spec)?),
                MethodKind::Dump => dump = Some(scope.dump(spec)?),
            }
        }

        let equals = equals.ok_or(EmitError::MissingIntrinsic(EQUALS))?;
        let hash = hash.ok_or(EmitError::MissingIntrinsic(HASH_CODE))?;
        let dump = dump.ok_or(EmitError::MissingIntrinsic(TO_STRING))?;

        let mut listing = storage.to_string();
        for spec in &methods {
            let _ = writeln!(listing, "{spec}");
        }

        tracing::debug!(accessors = accessors.len(), "linked");
        Ok(LoadedType::new(
            type_name.to_owned(),
            Arc::clone(contract),
            storage,
            accessors,
            equals,
            hash,
            dump,
            listing,
        ))
    }
}

/// Resolution context for one emit request.
struct Scope<'a> {
    storage: &'a StorageSpec,
    contract: &'a Contract,
}

impl Scope<'_> {
    fn resolve(&self, method: &MethodSpec, field: &str) -> Result<Access, EmitError> {
        let resolved = self
            .storage
            .resolve(field)
            .ok_or_else(|| EmitError::UnresolvedField {
                method: method.name.clone(),
                field: field.to_owned(),
            })?;
        Ok(Access {
            slot: resolved.slot,
            field: resolved.field,
            guarded: self.storage.is_guarded(resolved.slot),
        })
    }

    fn accessor(&self, spec: &MethodSpec) -> Result<AccessorBody, EmitError> {
        let decl = self
            .contract
            .method(&spec.name)
            .ok_or_else(|| EmitError::UnknownMethod(spec.name.clone()))?;
        if decl.params.len() != spec.arity() {
            return Err(EmitError::ArityMismatch {
                method: spec.name.clone(),
                declared: decl.params.len(),
                synthesized: spec.arity(),
            });
        }

        let mut params = SmallVec::new();
        for p in &spec.params {
            let TypeRef::Field(ty) = &p.ty else {
                return Err(misplaced(spec));
            };
            params.push((p.name.clone(), ty.clone()));
        }

        let mut stores = SmallVec::new();
        let mut load = None;
        for stmt in &spec.body {
            match stmt {
                Stmt::Store {
                    field,
                    param,
                    locked,
                } if load.is_none() && *param < params.len() => stores.push(StoreOp {
                    access: self.resolve(spec, field)?,
                    param: *param,
                    locked: *locked,
                }),
                Stmt::Return { field, locked } if load.is_none() => {
                    load = Some(LoadOp {
                        access: self.resolve(spec, field)?,
                        locked: *locked,
                    });
                }
                _ => return Err(misplaced(spec)),
            }
        }

        Ok(AccessorBody {
            params,
            stores,
            load,
        })
    }

    fn equals(&self, spec: &MethodSpec) -> Result<EqualsBody, EmitError> {
        let mut same_instance = false;
        let mut same_type = false;
        let mut compares = Vec::new();
        let mut result = None;
        for stmt in &spec.body {
            match stmt {
                _ if result.is_some() => return Err(misplaced(spec)),
                Stmt::SameInstance if compares.is_empty() => same_instance = true,
                Stmt::SameType if compares.is_empty() => same_type = true,
                // Field comparisons index the other operand by this type's
                // layout, so they are only sound after the type check.
                Stmt::Compare { field, rule } if same_type => {
                    compares.push((self.resolve(spec, field)?, *rule));
                }
                Stmt::ReturnBool(value) => result = Some(*value),
                _ => return Err(misplaced(spec)),
            }
        }
        let result = result.ok_or_else(|| misplaced(spec))?;
        Ok(EqualsBody {
            same_instance,
            compares,
            result,
        })
    }

    fn hash(&self, spec: &MethodSpec) -> Result<HashBody, EmitError> {
        let mut seed = None;
        let mut mixes = Vec::new();
        let mut done = false;
        for stmt in &spec.body {
            match stmt {
                _ if done => return Err(misplaced(spec)),
                Stmt::HashSeed(value) if seed.is_none() => seed = Some(*value),
                Stmt::HashMix { field, rule } if seed.is_some() => {
                    mixes.push((self.resolve(spec, field)?, *rule));
                }
                Stmt::ReturnHash if seed.is_some() => done = true,
                _ => return Err(misplaced(spec)),
            }
        }
        match seed {
            Some(seed) if done => Ok(HashBody { seed, mixes }),
            _ => Err(misplaced(spec)),
        }
    }

    fn dump(&self, spec: &MethodSpec) -> Result<DumpBody, EmitError> {
        let mut header = None;
        let mut fields = Vec::new();
        let mut done = false;
        for stmt in &spec.body {
            match stmt {
                _ if done => return Err(misplaced(spec)),
                Stmt::DumpOpen { header: h } if header.is_none() => header = Some(h.clone()),
                Stmt::DumpField { field, rule } if header.is_some() => {
                    fields.push((field.clone(), self.resolve(spec, field)?, *rule));
                }
                Stmt::DumpClose if header.is_some() => done = true,
                _ => return Err(misplaced(spec)),
            }
        }
        match header {
            Some(header) if done => Ok(DumpBody { header, fields }),
            _ => Err(misplaced(spec)),
        }
    }
}

fn misplaced(spec: &MethodSpec) -> EmitError {
    EmitError::MisplacedStatement {
        method: spec.name.clone(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
