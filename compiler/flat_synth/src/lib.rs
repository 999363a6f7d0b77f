//! Storage layout planning and method synthesis.
//!
//! Given a validated [`flat_check::FieldTable`], [`plan`] decides where each
//! field lives and [`synthesize`] produces the method specs (accessors plus
//! `equals`, `hashCode` and `toString`) that an emitter links against that
//! storage. Method bodies refer to fields by name; the storage spec resolves
//! those names.

pub mod builder;
pub mod layout;
mod synth;

pub use builder::{
    MethodBuilder, MethodKind, MethodModifiers, MethodSpec, ParamSpec, Stmt, TypeRef, ValueRule,
};
pub use layout::{plan, GroupSpec, LayoutKind, Resolved, SlotRef, SlotSpec, Storage, StorageSpec};
pub use synth::{synthesize, EQUALS, HASH_CODE, TO_STRING};
