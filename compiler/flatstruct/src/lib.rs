//! Runtime specialization of value-semantic record types.
//!
//! Describe a record as a capability [`Contract`]: ordered, typed fields plus
//! methods bound to them by getter and setter directives. A factory
//! specializes a concrete type for the contract once, caches it, and hands
//! out [`Instance`]s with synthesized accessors, structural equality,
//! hashing and a textual dump.
//!
//! ```
//! use flatstruct::{Contract, FieldType, StructureFactory, Value};
//!
//! let point = Contract::builder("Point2D")
//!     .field("x", FieldType::I32)
//!     .field("y", FieldType::I32)
//!     .getter("getX", "x", FieldType::I32)
//!     .setter("setX", "x", FieldType::I32)
//!     .build();
//!
//! let p = StructureFactory::new().create(&point)?;
//! p.invoke("setX", &[Value::I32(5)])?;
//! assert_eq!(p.invoke("getX", &[])?, Some(Value::I32(5)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cache;
mod config;
mod error;
mod factory;

use std::sync::{Arc, Once};

pub use cache::{CacheKey, CacheStats, SpecializationCache};
pub use config::{EngineConfig, LOG_LISTINGS_VAR, MAX_ARRAY_CAPACITY_VAR};
pub use error::{
    CompilationError, ConfigError, CreateError, InstantiationError, LoadError, SpecializeError,
};
pub use factory::{ArrayFactory, Factory, StructureFactory};

pub use flat_check::ValidationError;
pub use flat_emit::{
    CellShape, EmitError, EmitRequest, Emitter, Instance, InvokeError, Linker, TypeId,
};
pub use flat_ir::{
    AccessorDirective, Contract, ContractBuilder, ContractDef, ContractId, ContractKind,
    FieldDirective, FieldType, MethodDecl, ObjectRef, PrimitiveKind, ReferenceKind, Value,
};
pub use flat_synth::LayoutKind;

/// A concrete type specialized from a contract.
pub type SpecializedType = flat_emit::LoadedType;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Load a contract from a JSON definition.
///
/// A `null` document is reported as [`ValidationError::NullContract`].
pub fn contract_from_json(text: &str) -> Result<Arc<Contract>, LoadError> {
    match ContractDef::from_json(text)? {
        Some(def) => Ok(def.into_contract()),
        None => Err(ValidationError::NullContract.into()),
    }
}
