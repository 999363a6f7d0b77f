//! The specialization cache.
//!
//! Maps each (contract, layout) pair to at most one specialized type. A key
//! moves through claim → build → publish: the first requester inserts an
//! empty slot and builds while holding the slot's build lock, concurrent
//! requesters block on that lock and then read the published type. A failed
//! build abandons its slot, so the next request starts over.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use flat_ir::ContractId;
use flat_synth::LayoutKind;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;

use crate::error::SpecializeError;
use crate::SpecializedType;

/// Identity of a specialization.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub contract: ContractId,
    pub layout: LayoutKind,
}

#[derive(Debug, Default)]
struct Slot {
    built: OnceLock<Arc<SpecializedType>>,
    /// Held for the whole build. `true` once the build failed.
    abandoned: Mutex<bool>,
}

/// Counters since the cache was created.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered with an already published type.
    pub hits: u64,
    /// Requests that found no published type on arrival.
    pub misses: u64,
    /// Builds that published a type.
    pub builds: u64,
    /// Builds that failed.
    pub failures: u64,
}

#[derive(Debug, Default)]
pub struct SpecializationCache {
    slots: DashMap<CacheKey, Arc<Slot>, FxBuildHasher>,
    hits: AtomicU64,
    misses: AtomicU64,
    builds: AtomicU64,
    failures: AtomicU64,
}

impl SpecializationCache {
    pub fn new() -> Self {
        SpecializationCache::default()
    }

    /// The process-wide cache backing factories without a private one.
    pub fn global() -> Arc<SpecializationCache> {
        static GLOBAL: OnceLock<Arc<SpecializationCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(SpecializationCache::new())))
    }

    /// The published type for `key`, if any.
    pub fn get(&self, key: CacheKey) -> Option<Arc<SpecializedType>> {
        let slot = self.slots.get(&key)?;
        slot.built.get().cloned()
    }

    /// The published type for `key`, building it with `build` if needed.
    ///
    /// `build` runs at most once per call and only while this caller holds
    /// the key's build lock. Its error is returned to this caller alone;
    /// callers that were waiting on the lock retry with their own builds.
    pub fn get_or_create<F>(
        &self,
        key: CacheKey,
        build: F,
    ) -> Result<Arc<SpecializedType>, SpecializeError>
    where
        F: FnOnce() -> Result<SpecializedType, SpecializeError>,
    {
        if let Some(ty) = self.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(ty);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        loop {
            let slot = self.claim(key);
            let mut abandoned = slot.abandoned.lock();
            if *abandoned {
                // Its build failed and it left the map; claim a fresh one.
                drop(abandoned);
                std::thread::yield_now();
                continue;
            }
            if let Some(ty) = slot.built.get() {
                return Ok(Arc::clone(ty));
            }

            tracing::debug!(
                contract = %key.contract,
                layout = ?key.layout,
                "building specialization"
            );
            return match build() {
                Ok(ty) => {
                    let ty = Arc::clone(slot.built.get_or_init(|| Arc::new(ty)));
                    self.builds.fetch_add(1, Ordering::Relaxed);
                    Ok(ty)
                }
                Err(err) => {
                    self.slots.remove_if(&key, |_, current| Arc::ptr_eq(current, &slot));
                    *abandoned = true;
                    self.failures.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(
                        contract = %key.contract,
                        error = %err,
                        "specialization failed"
                    );
                    Err(err)
                }
            };
        }
    }

    /// The slot for `key`, inserting an empty one if absent.
    fn claim(&self, key: CacheKey) -> Arc<Slot> {
        if let Some(slot) = self.slots.get(&key) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(key).or_default().value())
    }

    /// Number of published specializations.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().built.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.get(key).is_some()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
