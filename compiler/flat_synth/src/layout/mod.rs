//! Storage layout strategies.
//!
//! A layout decides where field values live inside an instance and how a
//! field name resolves to that place. Both strategies expose the same
//! resolution interface, so synthesized bodies never depend on the layout.

use std::fmt;

use flat_check::FieldTable;
use flat_ir::{FieldModifiers, FieldType};
use rustc_hash::FxHashMap;

/// Which storage strategy a specialization uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// One slot per field, named and typed as declared.
    PerFieldSlot,
    /// One array per distinct field type, shared by all fields of that type.
    TypeGroupedArray,
}

impl LayoutKind {
    /// Prefix of generated type names: `Structure_of_Point`, `Array_of_Point`.
    pub fn factory_name(self) -> &'static str {
        match self {
            LayoutKind::PerFieldSlot => "Structure",
            LayoutKind::TypeGroupedArray => "Array",
        }
    }

    /// Number of constructor arguments instances of this layout take.
    pub fn constructor_arity(self) -> usize {
        match self {
            LayoutKind::PerFieldSlot => 0,
            LayoutKind::TypeGroupedArray => 1,
        }
    }
}

/// A dedicated storage slot for one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotSpec {
    pub name: String,
    pub ty: FieldType,
    pub modifiers: FieldModifiers,
}

/// A typed array holding every field of one declared type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupSpec {
    /// `_<type>_array`.
    pub name: String,
    pub ty: FieldType,
    /// Fields stored in this group, in schema order. The array length.
    pub members: Vec<String>,
    /// `VOLATILE` when any member is.
    pub modifiers: FieldModifiers,
}

impl GroupSpec {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Storage {
    Slots(Vec<SlotSpec>),
    Groups(Vec<GroupSpec>),
}

/// Where a field's value lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SlotRef {
    /// Dedicated slot `i`.
    Slot(usize),
    /// Element `index` of group `group`.
    Element { group: usize, index: usize },
}

/// A resolved field name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Resolved {
    pub slot: SlotRef,
    /// Schema position of the field; selects its monitor.
    pub field: usize,
}

/// The planned storage of a specialized type.
#[derive(Clone, Debug)]
pub struct StorageSpec {
    kind: LayoutKind,
    storage: Storage,
    fields: Vec<(String, FieldType)>,
    resolution: FxHashMap<String, Resolved>,
}

impl StorageSpec {
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Fields in schema order.
    pub fn fields(&self) -> &[(String, FieldType)] {
        &self.fields
    }

    /// Map a field name to its storage location.
    pub fn resolve(&self, name: &str) -> Option<Resolved> {
        self.resolution.get(name).copied()
    }

    /// Whether accesses to the storage behind `slot` take the exclusive lock.
    pub fn is_guarded(&self, slot: SlotRef) -> bool {
        let modifiers = match (&self.storage, slot) {
            (Storage::Slots(slots), SlotRef::Slot(i)) => slots.get(i).map(|s| s.modifiers),
            (Storage::Groups(groups), SlotRef::Element { group, .. }) => {
                groups.get(group).map(|g| g.modifiers)
            }
            _ => None,
        };
        modifiers.is_some_and(|m| m.contains(FieldModifiers::VOLATILE))
    }
}

impl fmt::Display for StorageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn modifiers(m: FieldModifiers) -> &'static str {
            if m.contains(FieldModifiers::VOLATILE) {
                "private volatile"
            } else {
                "private"
            }
        }

        match &self.storage {
            Storage::Slots(slots) => {
                for slot in slots {
                    writeln!(f, "{} {} {};", modifiers(slot.modifiers), slot.ty, slot.name)?;
                }
            }
            Storage::Groups(groups) => {
                for group in groups {
                    writeln!(
                        f,
                        "{} {}[{}] {}; // {}",
                        modifiers(group.modifiers),
                        group.ty,
                        group.len(),
                        group.name,
                        group.members.join(", ")
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Plan the storage of `table` under `kind`.
#[tracing::instrument(level = "debug", skip_all, fields(
    contract = %table.contract_name,
    layout = ?kind,
))]
pub fn plan(kind: LayoutKind, table: &FieldTable) -> StorageSpec {
    let fields: Vec<_> = table
        .fields
        .iter()
        .map(|f| (f.name.clone(), f.ty.clone()))
        .collect();
    let mut resolution = FxHashMap::default();

    let storage = match kind {
        LayoutKind::PerFieldSlot => {
            let slots = table
                .fields
                .iter()
                .map(|f| {
                    resolution.insert(
                        f.name.clone(),
                        Resolved {
                            slot: SlotRef::Slot(f.index),
                            field: f.index,
                        },
                    );
                    SlotSpec {
                        name: f.name.clone(),
                        ty: f.ty.clone(),
                        modifiers: f.modifiers,
                    }
                })
                .collect();
            Storage::Slots(slots)
        }
        LayoutKind::TypeGroupedArray => {
            let mut groups: Vec<GroupSpec> = Vec::new();
            for f in &table.fields {
                let group = if let Some(i) = groups.iter().position(|g| g.ty == f.ty) {
                    i
                } else {
                    groups.push(GroupSpec {
                        name: format!("_{}_array", f.ty.ident()),
                        ty: f.ty.clone(),
                        members: Vec::new(),
                        modifiers: FieldModifiers::PRIVATE,
                    });
                    groups.len() - 1
                };
                let spec = &mut groups[group];
                resolution.insert(
                    f.name.clone(),
                    Resolved {
                        slot: SlotRef::Element {
                            group,
                            index: spec.members.len(),
                        },
                        field: f.index,
                    },
                );
                spec.members.push(f.name.clone());
                spec.modifiers |= f.modifiers;
            }
            Storage::Groups(groups)
        }
    };

    let spec = StorageSpec {
        kind,
        storage,
        fields,
        resolution,
    };
    tracing::trace!(storage = %spec, "planned storage");
    spec
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
