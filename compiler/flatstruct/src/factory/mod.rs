//! Factories: the entry points that turn contracts into records.
//!
//! A factory runs extraction, layout planning, synthesis and emission once
//! per (contract, layout) through the specialization cache, then instantiates
//! the cached type with the layout's constructor.

use std::fmt;
use std::sync::Arc;

use flat_emit::{EmitRequest, Emitter, Instance, Linker};
use flat_ir::Contract;
use flat_synth::{plan, synthesize, LayoutKind};

use crate::cache::{CacheKey, SpecializationCache};
use crate::config::EngineConfig;
use crate::error::{CompilationError, CreateError, InstantiationError, SpecializeError};
use crate::SpecializedType;

/// Layout-independent factory core.
#[derive(Clone)]
pub struct Factory {
    layout: LayoutKind,
    cache: Arc<SpecializationCache>,
    emitter: Arc<dyn Emitter>,
    config: EngineConfig,
}

impl Factory {
    /// A factory for `layout` backed by the global cache and the default linker.
    pub fn new(layout: LayoutKind) -> Self {
        Factory {
            layout,
            cache: SpecializationCache::global(),
            emitter: Arc::new(Linker),
            config: EngineConfig::default(),
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SpecializationCache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitter = emitter;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn layout(&self) -> LayoutKind {
        self.layout
    }

    pub fn cache(&self) -> &Arc<SpecializationCache> {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generated name of the type specialized from `contract`.
    pub fn type_name(&self, contract: &Contract) -> String {
        format!("{}_of_{}", self.layout.factory_name(), contract.name())
    }

    /// The specialized type for `contract`, built on first request.
    #[tracing::instrument(level = "debug", skip_all, fields(
        contract = %contract.name(),
        layout = ?self.layout,
    ))]
    pub fn specialize(
        &self,
        contract: &Arc<Contract>,
    ) -> Result<Arc<SpecializedType>, SpecializeError> {
        let key = CacheKey {
            contract: contract.id(),
            layout: self.layout,
        };
        self.cache.get_or_create(key, || self.build(contract))
    }

    fn build(&self, contract: &Arc<Contract>) -> Result<SpecializedType, SpecializeError> {
        let table = flat_check::extract(contract)?;
        let type_name = self.type_name(contract);
        let request = EmitRequest {
            storage: plan(self.layout, &table),
            methods: synthesize(&table, &type_name),
            contract,
            type_name: &type_name,
        };
        let ty = self.emitter.emit(request).map_err(|source| CompilationError {
            type_name: type_name.clone(),
            source,
        })?;

        if self.config.log_method_listings {
            tracing::debug!(type_name = %ty.name(), "specialized\n{}", ty.listing());
        } else {
            tracing::debug!(type_name = %ty.name(), id = %ty.id(), "specialized");
        }
        Ok(ty)
    }

    /// Instantiate `ty` with the layout constructor's arguments.
    pub fn instantiate(
        &self,
        ty: &Arc<SpecializedType>,
        args: &[usize],
    ) -> Result<Instance, InstantiationError> {
        if self.layout == LayoutKind::TypeGroupedArray {
            if let Some(&requested) = args.first() {
                let max = self.config.max_array_capacity;
                if requested > max {
                    return Err(InstantiationError::CapacityExceeded { requested, max });
                }
            }
        }
        Ok(Instance::construct(ty, args)?)
    }

    fn create(&self, contract: &Arc<Contract>, args: &[usize]) -> Result<Instance, CreateError> {
        let ty = self.specialize(contract)?;
        Ok(self.instantiate(&ty, args)?)
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("layout", &self.layout)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

macro_rules! layout_factory {
    ($(#[$doc:meta])* $name:ident, $layout:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name {
            inner: Factory,
        }

        impl $name {
            pub fn new() -> Self {
                $name {
                    inner: Factory::new($layout),
                }
            }

            #[must_use]
            pub fn with_cache(self, cache: Arc<SpecializationCache>) -> Self {
                $name {
                    inner: self.inner.with_cache(cache),
                }
            }

            #[must_use]
            pub fn with_emitter(self, emitter: Arc<dyn Emitter>) -> Self {
                $name {
                    inner: self.inner.with_emitter(emitter),
                }
            }

            #[must_use]
            pub fn with_config(self, config: EngineConfig) -> Self {
                $name {
                    inner: self.inner.with_config(config),
                }
            }

            pub fn factory(&self) -> &Factory {
                &self.inner
            }

            /// The specialized type for `contract`, without instantiating it.
            pub fn specialize(
                &self,
                contract: &Arc<Contract>,
            ) -> Result<Arc<SpecializedType>, SpecializeError> {
                self.inner.specialize(contract)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::new()
            }
        }
    };
}

layout_factory! {
    /// Creates records with one storage slot per field.
    StructureFactory, LayoutKind::PerFieldSlot
}

layout_factory! {
    /// Creates records whose fields share one array per field type.
    ArrayFactory, LayoutKind::TypeGroupedArray
}

impl StructureFactory {
    /// A fresh record of `contract` with every field at its default.
    pub fn create(&self, contract: &Arc<Contract>) -> Result<Instance, CreateError> {
        self.inner.create(contract, &[])
    }
}

impl ArrayFactory {
    /// A fresh record of `contract`; `size` is the initial capacity of every
    /// group array and never changes array lengths.
    pub fn create(&self, contract: &Arc<Contract>, size: usize) -> Result<Instance, CreateError> {
        self.inner.create(contract, &[size])
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
