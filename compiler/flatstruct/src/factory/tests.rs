use flat_check::ValidationError;
use flat_emit::EmitError;
use flat_ir::{FieldType, Value};
use pretty_assertions::assert_eq;

use super::*;

fn point() -> Arc<Contract> {
    Contract::builder("Point2D")
        .field("x", FieldType::I32)
        .field("y", FieldType::I32)
        .getter("getX", "x", FieldType::I32)
        .setter("setX", "x", FieldType::I32)
        .build()
}

fn private_cache() -> Arc<SpecializationCache> {
    Arc::new(SpecializationCache::new())
}

#[test]
fn type_names_carry_the_factory_name() {
    let contract = point();
    let cache = private_cache();
    let structure = StructureFactory::new().with_cache(Arc::clone(&cache));
    let array = ArrayFactory::new().with_cache(cache);

    assert_eq!(structure.specialize(&contract).unwrap().name(), "Structure_of_Point2D");
    assert_eq!(array.specialize(&contract).unwrap().name(), "Array_of_Point2D");
}

#[test]
fn specialization_is_cached_per_factory_layout() {
    let contract = point();
    let cache = private_cache();
    let factory = StructureFactory::new().with_cache(Arc::clone(&cache));

    let a = factory.specialize(&contract).unwrap();
    let b = factory.specialize(&contract).unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    let grouped = ArrayFactory::new()
        .with_cache(Arc::clone(&cache))
        .specialize(&contract)
        .unwrap();
    assert_ne!(a.id(), grouped.id());
    assert_eq!(cache.len(), 2);
}

#[test]
fn create_instantiates_fresh_records() {
    let contract = point();
    let factory = StructureFactory::new().with_cache(private_cache());
    let a = factory.create(&contract).unwrap();
    let b = factory.create(&contract).unwrap();
    a.invoke("setX", &[Value::I32(1)]).unwrap();
    assert_eq!(b.invoke("getX", &[]).unwrap(), Some(Value::I32(0)));
    assert_eq!(a.type_id(), b.type_id());
}

#[test]
fn validation_errors_surface_before_caching() {
    let contract = Contract::builder("Bad")
        .field("x", FieldType::I32)
        .field("x", FieldType::I32)
        .build();
    let cache = private_cache();
    let err = StructureFactory::new()
        .with_cache(Arc::clone(&cache))
        .create(&contract)
        .unwrap_err();
    assert!(matches!(
        err,
        CreateError::Validation(ValidationError::DuplicateField(ref f)) if f == "x"
    ));
    assert!(cache.is_empty());
}

#[test]
fn reserved_accessor_names_fail_validation() {
    let contract = Contract::builder("P")
        .field("h", FieldType::I32)
        .getter("hashCode", "h", FieldType::I32)
        .build();
    let cache = private_cache();
    let err = StructureFactory::new()
        .with_cache(Arc::clone(&cache))
        .create(&contract)
        .unwrap_err();
    assert!(matches!(
        err,
        CreateError::Validation(ValidationError::ReservedMethod(ref m)) if m == "hashCode"
    ));
    assert!(cache.is_empty());
    assert_eq!(cache.stats().builds, 0);
}

#[test]
fn capacity_above_the_configured_maximum_is_rejected() {
    let config = EngineConfig {
        max_array_capacity: 16,
        ..EngineConfig::default()
    };
    let factory = ArrayFactory::new()
        .with_cache(private_cache())
        .with_config(config);

    assert!(factory.create(&point(), 16).is_ok());
    let err = factory.create(&point(), 17).unwrap_err();
    assert!(matches!(
        err,
        CreateError::Instantiation(InstantiationError::CapacityExceeded {
            requested: 17,
            max: 16,
        })
    ));
}

#[test]
fn instantiate_checks_constructor_arity() {
    let factory = Factory::new(LayoutKind::PerFieldSlot).with_cache(private_cache());
    let ty = factory.specialize(&point()).unwrap();
    assert_eq!(
        factory.instantiate(&ty, &[3]).unwrap_err(),
        InstantiationError::ArityMismatch {
            expected: 0,
            actual: 1,
        }
    );
}

#[derive(Debug)]
struct Refusing;

impl Emitter for Refusing {
    fn emit(&self, _request: EmitRequest<'_>) -> Result<SpecializedType, EmitError> {
        Err(EmitError::MissingIntrinsic("equals"))
    }
}

#[test]
fn emitter_failures_become_compilation_errors() {
    let cache = private_cache();
    let factory = StructureFactory::new()
        .with_cache(Arc::clone(&cache))
        .with_emitter(Arc::new(Refusing));

    match factory.create(&point()).unwrap_err() {
        CreateError::Compilation(err) => {
            assert_eq!(err.type_name, "Structure_of_Point2D");
            assert!(matches!(err.source, EmitError::MissingIntrinsic("equals")));
        }
        other => panic!("expected a compilation error, got {other:?}"),
    }
    assert!(cache.is_empty());
}

#[test]
fn listings_can_be_logged() {
    let factory = StructureFactory::new()
        .with_cache(private_cache())
        .with_config(EngineConfig {
            log_method_listings: true,
            ..EngineConfig::default()
        });
    assert!(factory.factory().config().log_method_listings);
    let ty = factory.specialize(&point()).unwrap();
    assert!(ty.listing().contains("public void setX(i32 x) {"));
}
