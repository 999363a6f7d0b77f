//! The emitter boundary and the default in-process backend.
//!
//! An [`Emitter`] turns a storage spec plus synthesized method specs into a
//! [`LoadedType`]. The default [`Linker`] resolves every field reference in
//! the specs against the storage spec and compiles the bodies into an op
//! table that [`Instance`] executes directly.

mod error;
mod instance;
mod linker;
mod loaded;

pub use error::{ConstructError, EmitError, InvokeError};
pub use instance::{CellShape, Instance};
pub use linker::{EmitRequest, Emitter, Linker};
pub use loaded::{LoadedType, TypeId};
