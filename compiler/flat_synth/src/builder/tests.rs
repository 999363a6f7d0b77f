use pretty_assertions::assert_eq;

use super::*;

#[test]
fn builder_assigns_parameter_positions() {
    let mut mb = MethodBuilder::new("moveTo", MethodKind::Accessor);
    assert_eq!(mb.add_param("x", TypeRef::Field(FieldType::I32)), 0);
    assert_eq!(mb.add_param("y", TypeRef::Field(FieldType::I32)), 1);
    let spec = mb.build();
    assert_eq!(spec.arity(), 2);
    assert_eq!(spec.returns, None);
    assert!(spec.modifiers.is_empty());
}

#[test]
fn setter_listing() {
    let mut mb = MethodBuilder::new("setX", MethodKind::Accessor);
    mb.add_modifier(MethodModifiers::PUBLIC);
    let param = mb.add_param("x", TypeRef::Field(FieldType::I32));
    mb.add_stmt(Stmt::Store {
        field: "x".to_owned(),
        param,
        locked: true,
    });

    assert_eq!(
        mb.build().to_string(),
        "public void setX(i32 x) {\n    synchronized (x) { this.x = x; }\n}"
    );
}

#[test]
fn hash_listing() {
    let mut mb = MethodBuilder::new("hashCode", MethodKind::HashCode);
    mb.add_modifier(MethodModifiers::PUBLIC);
    mb.set_return_type(TypeRef::Int);
    mb.add_stmt(Stmt::HashSeed(1));
    mb.add_stmt(Stmt::HashMix {
        field: "x".to_owned(),
        rule: ValueRule::Primitive,
    });
    mb.add_stmt(Stmt::HashMix {
        field: "name".to_owned(),
        rule: ValueRule::Reference,
    });
    mb.add_stmt(Stmt::ReturnHash);

    let expected = "\
public int hashCode() {
    int result = 1;
    result = 31 * result + (int) this.x;
    result = 31 * result + hash(this.name);
    return result;
}";
    assert_eq!(mb.build().to_string(), expected);
}

#[test]
fn field_refs_follow_statement_order() {
    let mut mb = MethodBuilder::new("equals", MethodKind::Equals);
    mb.add_param("other", TypeRef::Instance);
    mb.add_stmt(Stmt::SameInstance);
    mb.add_stmt(Stmt::Compare {
        field: "b".to_owned(),
        rule: ValueRule::Primitive,
    });
    mb.add_stmt(Stmt::Compare {
        field: "a".to_owned(),
        rule: ValueRule::Reference,
    });
    mb.add_stmt(Stmt::ReturnBool(true));

    let spec = mb.build();
    assert_eq!(spec.field_refs().collect::<Vec<_>>(), ["b", "a"]);
}

#[test]
fn value_rule_follows_the_type_split() {
    assert_eq!(ValueRule::for_type(&FieldType::F32), ValueRule::Primitive);
    assert_eq!(ValueRule::for_type(&FieldType::BYTES), ValueRule::Reference);
    assert_eq!(
        ValueRule::for_type(&FieldType::object("Point")),
        ValueRule::Reference
    );
}
