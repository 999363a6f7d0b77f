use std::sync::atomic::AtomicUsize;
use std::sync::Barrier;
use std::thread;

use flat_check::{extract, ValidationError};
use flat_emit::{EmitRequest, Emitter, Linker};
use flat_ir::{Contract, FieldType};
use flat_synth::{plan, synthesize};
use pretty_assertions::assert_eq;

use super::*;

fn point() -> Arc<Contract> {
    Contract::builder("Point")
        .field("x", FieldType::I32)
        .getter("getX", "x", FieldType::I32)
        .build()
}

fn key(contract: &Contract, layout: LayoutKind) -> CacheKey {
    CacheKey {
        contract: contract.id(),
        layout,
    }
}

fn build(contract: &Arc<Contract>) -> Result<SpecializedType, SpecializeError> {
    let table = extract(contract)?;
    Ok(Linker
        .emit(EmitRequest {
            storage: plan(LayoutKind::PerFieldSlot, &table),
            methods: synthesize(&table, "Structure_of_Point"),
            contract,
            type_name: "Structure_of_Point",
        })
        .unwrap())
}

#[test]
fn second_request_hits() {
    let cache = SpecializationCache::new();
    let contract = point();
    let k = key(&contract, LayoutKind::PerFieldSlot);

    let first = cache.get_or_create(k, || build(&contract)).unwrap();
    let second = cache
        .get_or_create(k, || panic!("must not rebuild a published key"))
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(k));
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            builds: 1,
            failures: 0,
        }
    );
}

#[test]
fn layouts_are_cached_separately() {
    let cache = SpecializationCache::new();
    let contract = point();
    let a = cache
        .get_or_create(key(&contract, LayoutKind::PerFieldSlot), || build(&contract))
        .unwrap();
    let b = cache
        .get_or_create(key(&contract, LayoutKind::TypeGroupedArray), || build(&contract))
        .unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(cache.len(), 2);
}

#[test]
fn failed_build_leaves_no_entry() {
    let cache = SpecializationCache::new();
    let contract = point();
    let k = key(&contract, LayoutKind::PerFieldSlot);

    let err = cache
        .get_or_create(k, || Err(ValidationError::NullContract.into()))
        .unwrap_err();
    assert!(matches!(err, SpecializeError::Validation(ValidationError::NullContract)));
    assert!(!cache.contains(k));
    assert!(cache.is_empty());
    assert!(cache.slots.is_empty());

    let ty = cache.get_or_create(k, || build(&contract)).unwrap();
    assert_eq!(ty.name(), "Structure_of_Point");
    assert_eq!(cache.stats().failures, 1);
    assert_eq!(cache.stats().builds, 1);
}

#[test]
fn concurrent_first_requests_build_once() {
    const THREADS: usize = 16;
    let cache = SpecializationCache::new();
    let contract = point();
    let k = key(&contract, LayoutKind::PerFieldSlot);
    let calls = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);

    let ids: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache
                        .get_or_create(k, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            build(&contract)
                        })
                        .unwrap()
                        .id()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(cache.len(), 1);
}

#[test]
fn waiters_retry_after_a_failed_build() {
    const THREADS: usize = 8;
    let cache = SpecializationCache::new();
    let contract = point();
    let k = key(&contract, LayoutKind::PerFieldSlot);
    let attempts = AtomicUsize::new(0);
    let barrier = Barrier::new(THREADS);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cache
                        .get_or_create(k, || {
                            // Only the very first attempt fails.
                            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                                thread::sleep(std::time::Duration::from_millis(20));
                                return Err(ValidationError::NullContract.into());
                            }
                            build(&contract)
                        })
                        .is_ok()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|ok| !**ok).count(), 1);
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(cache.contains(k));
}

#[test]
fn global_cache_is_shared() {
    assert!(Arc::ptr_eq(
        &SpecializationCache::global(),
        &SpecializationCache::global()
    ));
}
