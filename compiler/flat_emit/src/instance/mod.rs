//! Instances of loaded types.
//!
//! Each instance owns its storage cells. Cells are `RwLock`s so instances can
//! be shared across threads; guarded (volatile) cells take the write lock for
//! reads too. Every field additionally owns a monitor that `synchronized`
//! accessors hold for the duration of the access.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use flat_ir::{FieldType, ObjectRef, Value};
use flat_synth::{SlotRef, Storage, ValueRule, EQUALS, HASH_CODE, TO_STRING};
use parking_lot::{Mutex, RwLock};

use crate::error::{ConstructError, InvokeError};
use crate::loaded::{Access, LoadedType};

enum Cells {
    Slots(Box<[RwLock<Value>]>),
    Groups(Box<[RwLock<Vec<Value>>]>),
}

/// The observable shape of one storage cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellShape {
    pub name: String,
    pub ty: FieldType,
    /// Array length; `None` for a dedicated slot.
    pub len: Option<usize>,
    /// Allocated array capacity; `None` for a dedicated slot.
    pub capacity: Option<usize>,
}

/// A record of a specialized type.
pub struct Instance {
    ty: Arc<LoadedType>,
    cells: Cells,
    monitors: Box<[Mutex<()>]>,
}

impl Instance {
    /// Allocate an instance with every field at its default.
    ///
    /// `args` are the layout constructor's arguments: none for per-field
    /// storage, one capacity hint for grouped storage.
    pub fn construct(ty: &Arc<LoadedType>, args: &[usize]) -> Result<Instance, ConstructError> {
        let expected = ty.layout().constructor_arity();
        if args.len() != expected {
            return Err(ConstructError::Arity {
                expected,
                actual: args.len(),
            });
        }

        let cells = match ty.storage().storage() {
            Storage::Slots(slots) => Cells::Slots(
                slots
                    .iter()
                    .map(|s| RwLock::new(Value::default_for(&s.ty)))
                    .collect(),
            ),
            Storage::Groups(groups) => {
                let hint = args.first().copied().unwrap_or_default();
                Cells::Groups(
                    groups
                        .iter()
                        .map(|g| {
                            let mut values = Vec::with_capacity(hint.max(g.len()));
                            values.resize(g.len(), Value::default_for(&g.ty));
                            RwLock::new(values)
                        })
                        .collect(),
                )
            }
        };
        Ok(Instance::with_cells(Arc::clone(ty), cells))
    }

    fn with_cells(ty: Arc<LoadedType>, cells: Cells) -> Instance {
        let monitors = (0..ty.storage().fields().len())
            .map(|_| Mutex::new(()))
            .collect();
        Instance {
            ty,
            cells,
            monitors,
        }
    }

    pub fn loaded_type(&self) -> &Arc<LoadedType> {
        &self.ty
    }

    pub fn type_id(&self) -> crate::TypeId {
        self.ty.id()
    }

    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Call a contract method by name.
    ///
    /// `equals` takes one argument: another instance wrapped in
    /// [`Value::Object`]. `hashCode` and `toString` take none.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Option<Value>, InvokeError> {
        let Some(body) = self.ty.accessors.get(method) else {
            return self.invoke_intrinsic(method, args);
        };

        check_count(method, body.params.len(), args)?;
        for ((name, ty), arg) in body.params.iter().zip(args) {
            if !arg.conforms_to(ty) {
                return Err(InvokeError::ArgumentType {
                    method: method.to_owned(),
                    param: name.clone(),
                    expected: ty.clone(),
                    actual: arg.kind_name(),
                });
            }
        }

        for store in &body.stores {
            let value = args[store.param].clone();
            if store.locked {
                let _monitor = self.monitors[store.access.field].lock();
                self.store(store.access, value);
            } else {
                self.store(store.access, value);
            }
        }

        Ok(body.load.as_ref().map(|load| {
            if load.locked {
                let _monitor = self.monitors[load.access.field].lock();
                self.load(load.access)
            } else {
                self.load(load.access)
            }
        }))
    }

    fn invoke_intrinsic(&self, method: &str, args: &[Value]) -> Result<Option<Value>, InvokeError> {
        match method {
            EQUALS => {
                check_count(method, 1, args)?;
                let other = match &args[0] {
                    Value::Object(object) => object.as_any().downcast_ref::<Instance>(),
                    _ => None,
                };
                Ok(Some(Value::Bool(other.is_some_and(|o| self.equals(o)))))
            }
            HASH_CODE => {
                check_count(method, 0, args)?;
                Ok(Some(Value::I32(self.hash_code())))
            }
            TO_STRING => {
                check_count(method, 0, args)?;
                Ok(Some(Value::from(self.dump())))
            }
            _ if self.ty.contract().method(method).is_some() => {
                Err(InvokeError::AbstractMethod(method.to_owned()))
            }
            _ => Err(InvokeError::NoSuchMethod(method.to_owned())),
        }
    }

    /// Structural equality.
    pub fn equals(&self, other: &Instance) -> bool {
        let body = &self.ty.equals;
        if body.same_instance && std::ptr::eq(self, other) {
            return true;
        }
        if self.ty.id() != other.ty.id() {
            return false;
        }
        for &(access, rule) in &body.compares {
            let (a, b) = (self.load(access), other.load(access));
            let equal = match rule {
                ValueRule::Primitive => !a.primitive_ne(&b),
                ValueRule::Reference => a.reference_eq(&b),
            };
            if !equal {
                return false;
            }
        }
        body.result
    }

    /// Structural hash: `31 * result + c` per field, from the seed.
    pub fn hash_code(&self) -> i32 {
        let body = &self.ty.hash;
        body.mixes.iter().fold(body.seed, |result, &(access, rule)| {
            let value = self.load(access);
            let c = match rule {
                ValueRule::Primitive => value.primitive_hash(),
                ValueRule::Reference => value.reference_hash(),
            };
            result.wrapping_mul(31).wrapping_add(c)
        })
    }

    /// Textual dump. References print as `<hash>`, never by content.
    pub fn dump(&self) -> String {
        let body = &self.ty.dump;
        let mut out = format!("{} [\n", body.header);
        for (name, access, rule) in &body.fields {
            let value = self.load(*access);
            let shown = match (rule, &value) {
                (_, Value::Null) => "null".to_owned(),
                (ValueRule::Primitive, v) => v.to_string(),
                (ValueRule::Reference, v) => format!("<{}>", v.reference_hash()),
            };
            out.push_str("    ");
            out.push_str(name);
            out.push('=');
            out.push_str(&shown);
            out.push('\n');
        }
        out.push(']');
        out
    }

    /// Current value of field `name`, bypassing accessors.
    pub fn field(&self, name: &str) -> Option<Value> {
        let resolved = self.ty.storage().resolve(name)?;
        Some(self.load(Access {
            slot: resolved.slot,
            field: resolved.field,
            guarded: self.ty.storage().is_guarded(resolved.slot),
        }))
    }

    /// Names, lengths and capacities of the storage cells.
    pub fn storage_shape(&self) -> Vec<CellShape> {
        match (self.ty.storage().storage(), &self.cells) {
            (Storage::Slots(slots), _) => slots
                .iter()
                .map(|s| CellShape {
                    name: s.name.clone(),
                    ty: s.ty.clone(),
                    len: None,
                    capacity: None,
                })
                .collect(),
            (Storage::Groups(groups), Cells::Groups(cells)) => groups
                .iter()
                .zip(cells.iter())
                .map(|(g, cell)| {
                    let values = cell.read();
                    CellShape {
                        name: g.name.clone(),
                        ty: g.ty.clone(),
                        len: Some(values.len()),
                        capacity: Some(values.capacity()),
                    }
                })
                .collect(),
            (Storage::Groups(_), Cells::Slots(_)) => Vec::new(),
        }
    }

    fn load(&self, access: Access) -> Value {
        match (&self.cells, access.slot) {
            (Cells::Slots(slots), SlotRef::Slot(i)) => slots.get(i).map_or(Value::Null, |cell| {
                if access.guarded {
                    cell.write().clone()
                } else {
                    cell.read().clone()
                }
            }),
            (Cells::Groups(groups), SlotRef::Element { group, index }) => {
                let value = groups.get(group).and_then(|cell| {
                    if access.guarded {
                        cell.write().get(index).cloned()
                    } else {
                        cell.read().get(index).cloned()
                    }
                });
                value.unwrap_or(Value::Null)
            }
            _ => Value::Null,
        }
    }

    fn store(&self, access: Access, value: Value) {
        match (&self.cells, access.slot) {
            (Cells::Slots(slots), SlotRef::Slot(i)) => {
                if let Some(cell) = slots.get(i) {
                    *cell.write() = value;
                }
            }
            (Cells::Groups(groups), SlotRef::Element { group, index }) => {
                if let Some(cell) = groups.get(group) {
                    if let Some(element) = cell.write().get_mut(index) {
                        *element = value;
                    }
                }
            }
            _ => {}
        }
    }
}

fn check_count(method: &str, expected: usize, args: &[Value]) -> Result<(), InvokeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(InvokeError::ArgumentCount {
            method: method.to_owned(),
            expected,
            actual: args.len(),
        })
    }
}

impl Clone for Instance {
    fn clone(&self) -> Self {
        let cells = match &self.cells {
            Cells::Slots(slots) => Cells::Slots(
                slots
                    .iter()
                    .map(|cell| RwLock::new(cell.read().clone()))
                    .collect(),
            ),
            Cells::Groups(groups) => Cells::Groups(
                groups
                    .iter()
                    .map(|cell| {
                        let values = cell.read();
                        let mut copy = Vec::with_capacity(values.capacity());
                        copy.extend(values.iter().cloned());
                        RwLock::new(copy)
                    })
                    .collect(),
            ),
        };
        Instance::with_cells(Arc::clone(&self.ty), cells)
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Instance) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct(self.ty.name());
        for (name, _) in self.ty.storage().fields() {
            d.field(name, &self.field(name).unwrap_or(Value::Null));
        }
        d.finish()
    }
}

/// Instances can be stored in `object:<Contract>` fields of other records
/// and passed as the `equals` operand.
impl ObjectRef for Instance {
    fn type_name(&self) -> &str {
        self.ty.contract().name()
    }

    fn equals(&self, other: &dyn ObjectRef) -> bool {
        other
            .as_any()
            .downcast_ref::<Instance>()
            .is_some_and(|o| Instance::equals(self, o))
    }

    fn hash_code(&self) -> i32 {
        Instance::hash_code(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
