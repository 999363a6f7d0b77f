//! Loaded types and their compiled method bodies.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use flat_ir::{Contract, FieldType};
use flat_synth::{LayoutKind, SlotRef, StorageSpec, ValueRule};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Process-unique identity of a loaded type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u64);

impl TypeId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        TypeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// A resolved field access.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Access {
    pub slot: SlotRef,
    /// Schema position; selects the field's monitor.
    pub field: usize,
    /// Storage takes the exclusive lock even for reads.
    pub guarded: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct StoreOp {
    pub access: Access,
    pub param: usize,
    pub locked: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct LoadOp {
    pub access: Access,
    pub locked: bool,
}

/// A compiled accessor.
#[derive(Clone, Debug)]
pub(crate) struct AccessorBody {
    pub params: SmallVec<[(String, FieldType); 2]>,
    pub stores: SmallVec<[StoreOp; 2]>,
    pub load: Option<LoadOp>,
}

#[derive(Clone, Debug)]
pub(crate) struct EqualsBody {
    pub same_instance: bool,
    pub compares: Vec<(Access, ValueRule)>,
    pub result: bool,
}

#[derive(Clone, Debug)]
pub(crate) struct HashBody {
    pub seed: i32,
    pub mixes: Vec<(Access, ValueRule)>,
}

#[derive(Clone, Debug)]
pub(crate) struct DumpBody {
    pub header: String,
    pub fields: Vec<(String, Access, ValueRule)>,
}

/// A specialized type, ready to instantiate.
///
/// Immutable once built. Holds the storage spec its instances are laid out
/// by and the compiled bodies of every synthesized method.
pub struct LoadedType {
    id: TypeId,
    name: String,
    contract: Arc<Contract>,
    storage: StorageSpec,
    pub(crate) accessors: FxHashMap<String, AccessorBody>,
    pub(crate) equals: EqualsBody,
    pub(crate) hash: HashBody,
    pub(crate) dump: DumpBody,
    listing: String,
}

impl LoadedType {
    #[expect(clippy::too_many_arguments, reason = "assembled in one place by the linker")]
    pub(crate) fn new(
        name: String,
        contract: Arc<Contract>,
        storage: StorageSpec,
        accessors: FxHashMap<String, AccessorBody>,
        equals: EqualsBody,
        hash: HashBody,
        dump: DumpBody,
        listing: String,
    ) -> Self {
        LoadedType {
            id: TypeId::fresh(),
            name,
            contract,
            storage,
            accessors,
            equals,
            hash,
            dump,
            listing,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Generated name, e.g. `Structure_of_Point2D`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    pub fn storage(&self) -> &StorageSpec {
        &self.storage
    }

    pub fn layout(&self) -> LayoutKind {
        self.storage.kind()
    }

    /// Whether `method` has a synthesized body.
    pub fn implements(&self, method: &str) -> bool {
        self.accessors.contains_key(method)
            || matches!(
                method,
                flat_synth::EQUALS | flat_synth::HASH_CODE | flat_synth::TO_STRING
            )
    }

    /// Pseudo-source of the storage and every synthesized method.
    pub fn listing(&self) -> &str {
        &self.listing
    }
}

impl fmt::Debug for LoadedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("contract", &self.contract.id())
            .field("layout", &self.storage.kind())
            .finish_non_exhaustive()
    }
}
