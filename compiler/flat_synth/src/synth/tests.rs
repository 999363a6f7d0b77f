use flat_check::extract;
use flat_ir::{AccessorDirective, Contract, FieldType, MethodDecl};
use pretty_assertions::assert_eq;

use super::*;

fn person() -> FieldTable {
    extract(
        &Contract::builder("Person")
            .field("age", FieldType::I32)
            .field("name", FieldType::STR)
            .synchronized_getter("getAge", "age", FieldType::I32)
            .setter("setName", "name", FieldType::STR)
            .method(MethodDecl::builder("greet").returns(FieldType::STR).build())
            .build(),
    )
    .unwrap()
}

fn names(specs: &[MethodSpec]) -> Vec<&str> {
    specs.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn accessors_then_value_methods() {
    let specs = synthesize(&person(), "Structure_of_Person");
    assert_eq!(
        names(&specs),
        ["getAge", "setName", "equals", "hashCode", "toString"]
    );
}

#[test]
fn getter_body_reads_under_lock() {
    let specs = synthesize(&person(), "Structure_of_Person");
    assert_eq!(
        specs[0].body,
        vec![Stmt::Return {
            field: "age".to_owned(),
            locked: true,
        }]
    );
    assert_eq!(specs[0].returns, Some(TypeRef::Field(FieldType::I32)));
}

#[test]
fn multi_field_setter_stores_in_parameter_order() {
    let table = extract(
        &Contract::builder("P")
            .field("x", FieldType::I32)
            .field("y", FieldType::I32)
            .method(
                MethodDecl::builder("moveTo")
                    .setter_param("y", FieldType::I32, AccessorDirective::new("y"))
                    .setter_param("x", FieldType::I32, AccessorDirective::new("x"))
                    .build(),
            )
            .build(),
    )
    .unwrap();
    let specs = synthesize(&table, "Structure_of_P");
    assert_eq!(
        specs[0].body,
        vec![
            Stmt::Store {
                field: "y".to_owned(),
                param: 0,
                locked: false,
            },
            Stmt::Store {
                field: "x".to_owned(),
                param: 1,
                locked: false,
            },
        ]
    );
}

#[test]
fn equals_listing() {
    let specs = synthesize(&person(), "Structure_of_Person");
    let expected = "\
public bool equals(any other) {
    if (this == other) return true;
    if (type(other) != type(this)) return false;
    if (this.age != other.age) return false;
    if (!eq(this.name, other.name)) return false;
    return true;
}";
    assert_eq!(specs[2].to_string(), expected);
}

#[test]
fn hash_starts_at_one_and_mixes_every_field() {
    let specs = synthesize(&person(), "Structure_of_Person");
    assert_eq!(
        specs[3].body,
        vec![
            Stmt::HashSeed(1),
            Stmt::HashMix {
                field: "age".to_owned(),
                rule: ValueRule::Primitive,
            },
            Stmt::HashMix {
                field: "name".to_owned(),
                rule: ValueRule::Reference,
            },
            Stmt::ReturnHash,
        ]
    );
}

#[test]
fn dump_header_is_the_type_name() {
    let specs = synthesize(&person(), "Array_of_Person");
    assert_eq!(
        specs[4].body.first(),
        Some(&Stmt::DumpOpen {
            header: "Array_of_Person".to_owned(),
        })
    );
    assert_eq!(specs[4].body.last(), Some(&Stmt::DumpClose));
}

#[test]
fn empty_contract_still_gets_value_methods() {
    let table = extract(&Contract::builder("Empty").build()).unwrap();
    let specs = synthesize(&table, "Structure_of_Empty");
    assert_eq!(names(&specs), ["equals", "hashCode", "toString"]);
    assert_eq!(specs[1].body, vec![Stmt::HashSeed(1), Stmt::ReturnHash]);
}
