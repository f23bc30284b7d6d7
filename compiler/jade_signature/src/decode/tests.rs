#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

fn decode(signature: &str) -> GenType {
    try_parse_signature(signature, None, None).unwrap()
}

#[test]
fn list_of_string() {
    let ty = decode("Ljava/util/List<Ljava/lang/String;>;");
    let list = ty.as_class().unwrap();
    assert_eq!(list.name(), "java.util.List");
    let args = list.args.as_ref().unwrap();
    assert_eq!(args.len(), 1);
    let arg = args[0].as_class().unwrap();
    assert_eq!(arg.name(), "java.lang.String");
    assert!(arg.is_raw());
    assert_eq!(ty.to_string(), "java.util.List<java.lang.String>");
}

#[test]
fn primitives_and_arrays() {
    assert_eq!(decode("I"), GenType::Primitive(PrimitiveKind::Int));
    assert_eq!(decode("Z"), GenType::Primitive(PrimitiveKind::Boolean));
    assert_eq!(decode("[[J").to_string(), "long[][]");
    assert_eq!(decode("[Ljava/lang/Object;").to_string(), "java.lang.Object[]");
}

#[test]
fn wildcards() {
    let ty = decode("Ljava/util/Map<*+Ljava/lang/Number;>;");
    assert_eq!(ty.to_string(), "java.util.Map<?, ? extends java.lang.Number>");
    let ty = decode("Ljava/util/Comparator<-TT;>;");
    assert_eq!(ty.to_string(), "java.util.Comparator<? super T>");
}

#[test]
fn type_parameters_are_substituted_from_the_map() {
    let mut map = TypeParamMap::default();
    map.insert("E".into(), decode("Ljava/lang/String;"));
    let ty = try_parse_signature("Ljava/util/List<TE;>;", Some(&map), None).unwrap();
    assert_eq!(ty.to_string(), "java.util.List<java.lang.String>");

    let ty = try_parse_signature("TK;", Some(&map), None).unwrap();
    assert_eq!(ty, GenType::TypeParam("K".into()));
}

#[test]
fn inner_class_of_a_generic_outer() {
    let ty = decode("Ljava/util/Map<TK;TV;>.Entry<TK;TV;>;");
    let entry = ty.as_class().unwrap();
    assert_eq!(entry.name(), "java.util.Map$Entry");
    assert_eq!(entry.outer.as_ref().unwrap().name(), "java.util.Map");
    assert_eq!(ty.to_string(), "java.util.Map<K, V>.Entry<K, V>");
}

#[test]
fn class_references_are_deferred_to_the_context() {
    use crate::lookup::{ClassDef, ClassLookup, ClassTable};

    let mut table = ClassTable::new();
    let from = table.add(ClassDef::new("p.Main"));
    let ty = try_parse_signature("Lp/Helper;", None, Some(from)).unwrap();
    let reflective = &ty.as_class().unwrap().reflective;
    assert!(!reflective.is_loaded());
    let helper = table.add(ClassDef::new("p.Helper"));
    assert_eq!(reflective.resolve(&table), Some(helper));
    assert_eq!(table.class_name(helper), Some("p.Helper"));
}

#[test]
fn errors_report_the_position() {
    assert_eq!(
        try_parse_signature("Ljava/util/List<Q>;", None, None),
        Err(SignatureError::Unexpected {
            found: 'Q',
            at: 16,
            expected: "a type"
        })
    );
    assert_eq!(
        try_parse_signature("Ljava/util/List<", None, None),
        Err(SignatureError::UnexpectedEnd { at: 16 })
    );
    assert_eq!(
        try_parse_signature("II", None, None),
        Err(SignatureError::Trailing { at: 1 })
    );
    assert_eq!(
        try_parse_signature("L;", None, None),
        Err(SignatureError::EmptyName { at: 1 })
    );
    assert!(matches!(
        try_parse_signature("Ljava/lang/String", None, None),
        Err(SignatureError::UnexpectedEnd { .. })
    ));
}

#[test]
fn malformed_signatures_degrade_to_an_unbounded_wildcard() {
    let decoded = parse_signature("Ljava/util/List<Q>;", None, None);
    assert!(decoded.degraded);
    assert_eq!(decoded.value, GenType::Wildcard(Wildcard::Unbounded));

    let decoded = parse_signature("I", None, None);
    assert!(!decoded.degraded);
}

#[test]
fn nesting_is_limited() {
    let deepest = format!("{}I", "[".repeat(MAX_NESTING - 1));
    assert!(decode(&deepest).to_string().ends_with("[][]"));

    let too_deep = format!("{}I", "[".repeat(MAX_NESTING));
    assert_eq!(
        try_parse_signature(&too_deep, None, None),
        Err(SignatureError::TooDeep { at: MAX_NESTING })
    );

    let nested_args = format!(
        "{}Ljava/lang/Object;{}",
        "Ljava/util/List<".repeat(MAX_NESTING),
        ">;".repeat(MAX_NESTING)
    );
    assert!(matches!(
        try_parse_signature(&nested_args, None, None),
        Err(SignatureError::TooDeep { .. })
    ));
}

#[test]
fn runaway_nesting_degrades_instead_of_overflowing() {
    let decoded = parse_signature(&format!("{}I", "[".repeat(20_000)), None, None);
    assert!(decoded.degraded);
    assert_eq!(decoded.value, GenType::Wildcard(Wildcard::Unbounded));

    let decoded = parse_signature(&format!("{}*", "+".repeat(20_000)), None, None);
    assert!(decoded.degraded);
}

#[test]
fn class_signature_with_bounds() {
    let parsed = parse_class_signature(
        "<K:Ljava/lang/Object;V::Ljava/lang/Comparable<TV;>;:Ljava/io/Serializable;>\
         Ljava/util/AbstractMap<TK;TV;>;Ljava/util/Map<TK;TV;>;",
        None,
    )
    .unwrap();
    let params: Vec<String> = parsed.params.iter().map(ToString::to_string).collect();
    assert_eq!(
        params,
        vec![
            "K extends java.lang.Object",
            "V extends java.lang.Comparable<V>"
        ]
    );
    let supers: Vec<String> = parsed.supertypes.iter().map(ToString::to_string).collect();
    assert_eq!(
        supers,
        vec!["java.util.AbstractMap<K, V>", "java.util.Map<K, V>"]
    );
}

#[test]
fn class_signature_without_parameters() {
    let parsed = parse_class_signature("Ljava/util/ArrayList<Ljava/lang/String;>;", None).unwrap();
    assert!(parsed.params.is_empty());
    assert_eq!(parsed.supertypes[0].to_string(), "java.util.ArrayList<java.lang.String>");

    assert!(parse_class_signature("<T:>I", None).is_err());
}

#[test]
fn non_ascii_names() {
    let ty = decode("Lp/Ärger<Lp/Öl;>;");
    assert_eq!(ty.to_string(), "p.Ärger<p.Öl>");
    assert!(matches!(
        try_parse_signature("Lp/X<é>;", None, None),
        Err(SignatureError::Unexpected { found: 'é', at: 5, .. })
    ));
}

#[test]
fn decoded_helpers() {
    let value = Decoded::exact(1).map(|n| n + 1);
    assert_eq!(value, Decoded::exact(2));
    assert!(value.degrade_if(true).degraded);
    assert_eq!(Decoded::degraded(3).degrade_if(false).into_value(), 3);
}
