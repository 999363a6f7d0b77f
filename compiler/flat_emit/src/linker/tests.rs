use flat_check::extract;
use flat_ir::FieldType;
use flat_synth::{plan, synthesize, LayoutKind, MethodBuilder, MethodModifiers, TypeRef, ValueRule};

use super::*;

fn point() -> Arc<Contract> {
    Contract::builder("Point2D")
        .field("x", FieldType::I32)
        .field("y", FieldType::I32)
        .getter("getX", "x", FieldType::I32)
        .setter("setX", "x", FieldType::I32)
        .build()
}

fn specs_for(contract: &Arc<Contract>, layout: LayoutKind) -> (StorageSpec, Vec<MethodSpec>) {
    let table = extract(contract).unwrap();
    let name = format!("{}_of_{}", layout.factory_name(), contract.name());
    (plan(layout, &table), synthesize(&table, &name))
}

fn link(
    contract: &Arc<Contract>,
    storage: StorageSpec,
    methods: Vec<MethodSpec>,
) -> Result<LoadedType, EmitError> {
    Linker.emit(EmitRequest {
        storage,
        methods,
        contract,
        type_name: "Structure_of_Point2D",
    })
}

#[test]
fn links_synthesized_specs() {
    let contract = point();
    let (storage, methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let ty = link(&contract, storage, methods).unwrap();

    assert_eq!(ty.name(), "Structure_of_Point2D");
    assert_eq!(ty.layout(), LayoutKind::PerFieldSlot);
    assert!(ty.implements("getX"));
    assert!(ty.implements("setX"));
    assert!(ty.implements("hashCode"));
    assert!(!ty.implements("getY"));
    assert_eq!(ty.contract().id(), contract.id());
    assert!(ty.listing().contains("public i32 getX() {"));
    assert!(ty.listing().starts_with("private i32 x;\n"));
}

#[test]
fn each_link_yields_a_new_type_id() {
    let contract = point();
    let (s1, m1) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let (s2, m2) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let a = link(&contract, s1, m1).unwrap();
    let b = link(&contract, s2, m2).unwrap();
    assert_ne!(a.id(), b.id());
}

#[test]
fn unresolved_fields_are_rejected() {
    let contract = point();
    let (storage, mut methods) = specs_for(&contract, LayoutKind::TypeGroupedArray);
    let hash = methods.iter_mut().find(|m| m.kind == MethodKind::HashCode).unwrap();
    hash.body.insert(
        1,
        Stmt::HashMix {
            field: "z".to_owned(),
            rule: ValueRule::Primitive,
        },
    );

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(
        err,
        EmitError::UnresolvedField { ref method, ref field } if method == "hashCode" && field == "z"
    ));
}

#[test]
fn accessors_must_be_declared() {
    let contract = point();
    let (storage, mut methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let mut mb = MethodBuilder::new("getY", MethodKind::Accessor);
    mb.add_modifier(MethodModifiers::PUBLIC);
    mb.set_return_type(TypeRef::Field(FieldType::I32));
    mb.add_stmt(Stmt::Return {
        field: "y".to_owned(),
        locked: false,
    });
    methods.push(mb.build());

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(err, EmitError::UnknownMethod(ref m) if m == "getY"));
}

#[test]
fn duplicate_specs_are_rejected() {
    let contract = point();
    let (storage, mut methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    methods.push(methods[0].clone());

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(err, EmitError::DuplicateMethod(ref m) if m == "getX"));
}

#[test]
fn arity_must_match_the_declaration() {
    let contract = point();
    let (storage, mut methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let set_x = methods.iter_mut().find(|m| m.name == "setX").unwrap();
    set_x.params.push(flat_synth::ParamSpec {
        name: "extra".to_owned(),
        ty: TypeRef::Field(FieldType::I32),
    });

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(
        err,
        EmitError::ArityMismatch {
            declared: 1,
            synthesized: 2,
            ..
        }
    ));
}

#[test]
fn value_methods_are_required() {
    let contract = point();
    let (storage, methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let methods = methods
        .into_iter()
        .filter(|m| m.kind != MethodKind::Dump)
        .collect();

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(err, EmitError::MissingIntrinsic("toString")));
}

#[test]
fn compares_before_the_type_check_are_misplaced() {
    let contract = point();
    let (storage, mut methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let equals = methods.iter_mut().find(|m| m.kind == MethodKind::Equals).unwrap();
    equals.body.retain(|s| *s != Stmt::SameType);

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(err, EmitError::MisplacedStatement { ref method } if method == "equals"));
}

#[test]
fn statements_after_return_are_misplaced() {
    let contract = point();
    let (storage, mut methods) = specs_for(&contract, LayoutKind::PerFieldSlot);
    let get_x = methods.iter_mut().find(|m| m.name == "getX").unwrap();
    get_x.body.push(Stmt::Return {
        field: "y".to_owned(),
        locked: false,
    });

    let err = link(&contract, storage, methods).unwrap_err();
    assert!(matches!(err, EmitError::MisplacedStatement { .. }));
}

#[test]
fn backend_errors_wrap_any_error() {
    let err = EmitError::from(Box::<dyn std::error::Error + Send + Sync>::from("disk full"));
    assert_eq!(err.to_string(), "emitter backend failed: disk full");
}
