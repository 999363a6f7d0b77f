use super::*;

#[test]
fn parses_every_primitive_spelling() {
    for kind in [
        PrimitiveKind::Bool,
        PrimitiveKind::I8,
        PrimitiveKind::I16,
        PrimitiveKind::I32,
        PrimitiveKind::I64,
        PrimitiveKind::F32,
        PrimitiveKind::F64,
        PrimitiveKind::Char,
    ] {
        assert_eq!(kind.as_str().parse::<FieldType>(), Ok(FieldType::Primitive(kind)));
    }
}

#[test]
fn parses_reference_spellings() {
    assert_eq!("str".parse::<FieldType>(), Ok(FieldType::STR));
    assert_eq!("bytes".parse::<FieldType>(), Ok(FieldType::BYTES));
    assert_eq!("object:Point".parse::<FieldType>(), Ok(FieldType::object("Point")));
}

#[test]
fn rejects_unknown_spellings() {
    assert_eq!(
        "int".parse::<FieldType>(),
        Err(ParseTypeError("int".to_owned()))
    );
    assert!("object:".parse::<FieldType>().is_err());
}

#[test]
fn display_round_trips_through_parse() {
    let ty = FieldType::object("Color");
    assert_eq!(ty.to_string(), "object:Color");
    assert_eq!(ty.to_string().parse::<FieldType>(), Ok(ty));
}

#[test]
fn ident_is_identifier_safe() {
    assert_eq!(FieldType::I32.ident(), "i32");
    assert_eq!(FieldType::object("Color").ident(), "object_Color");
}

#[test]
fn classifies_primitive_and_reference() {
    assert!(FieldType::F64.is_primitive());
    assert!(!FieldType::F64.is_reference());
    assert!(FieldType::STR.is_reference());
    assert!(FieldType::object("X").is_reference());
}
