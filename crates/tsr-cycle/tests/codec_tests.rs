//! End-to-end behavior of decycle/retrocycle on shared and cyclic graphs.

use tsr_cycle::{
    CodecOptions, CycleError, Decycler, PathStep, Primitive, Value, decycle, format_path,
    parse_path, retrocycle, structurally_eq,
};

type V = Value;

fn round_trip(value: &V) -> V {
    let encoded = decycle(value).expect("decycle");
    retrocycle(encoded).expect("retrocycle")
}

#[test]
fn acyclic_value_round_trips_to_an_equal_tree() {
    let value = V::object([
        ("kind", V::Number(20.0)),
        ("name", V::string("Point")),
        (
            "properties",
            V::object([("x", V::Number(3.0)), ("y", V::Null)]),
        ),
        ("flags", V::array(vec![V::Bool(true), V::Bool(false)])),
    ]);
    let out = round_trip(&value);
    assert!(structurally_eq(&value, &out));
    assert!(!out.same_instance(&value));
}

/// Graphs carrying an opaque payload, as the literal generator builds them.
type Tagged = Value<String>;

#[test]
fn round_trip_table() {
    // (name, input, expected after decycle then retrocycle; `None` means the input)
    let cases: &[(&str, fn() -> Tagged, Option<fn() -> Tagged>)] = &[
        (
            "scalars",
            || {
                Tagged::array(vec![
                    Tagged::Undefined,
                    Tagged::Null,
                    Tagged::Bool(false),
                    Tagged::Number(-0.5),
                    Tagged::BigInt("12345678901234567890".into()),
                ])
            },
            None,
        ),
        (
            "empty containers",
            || Tagged::object([("a", Tagged::empty_array()), ("o", Tagged::empty_object())]),
            None,
        ),
        (
            "nested arrays",
            || {
                let inner = Tagged::array(vec![Tagged::array(vec![Tagged::Number(1.0)])]);
                Tagged::array(vec![inner, Tagged::empty_array()])
            },
            None,
        ),
        (
            "leaf objects",
            || {
                Tagged::object([
                    ("when", Tagged::Date(0.0)),
                    (
                        "re",
                        Tagged::RegExp {
                            source: "a+".into(),
                            flags: "gi".into(),
                        },
                    ),
                    ("boxed", Tagged::Boxed(Primitive::String("s".into()))),
                ])
            },
            None,
        ),
        (
            "opaque payload",
            || Tagged::object([("type", Tagged::Extern("Array".into()))]),
            None,
        ),
        (
            "ref-shaped data that is not a path",
            || Tagged::object([("x", Tagged::ref_token("not-a-path"))]),
            None,
        ),
        (
            "exempt is unwrapped",
            || Tagged::array(vec![Tagged::exempt(Tagged::object([("kind", Tagged::Number(5.0))]))]),
            Some(|| Tagged::array(vec![Tagged::object([("kind", Tagged::Number(5.0))])])),
        ),
        (
            "set and map",
            || {
                Tagged::object([
                    ("s", Tagged::set(vec![Tagged::Number(1.0)])),
                    ("m", Tagged::map(vec![(Tagged::Number(2.0), Tagged::string("two"))])),
                ])
            },
            Some(|| {
                Tagged::object([
                    ("s", Tagged::array(vec![Tagged::Number(1.0)])),
                    ("m", Tagged::object([("2", Tagged::string("two"))])),
                ])
            }),
        ),
    ];

    for &(name, input, expected) in cases {
        let encoded = decycle(&input()).unwrap_or_else(|e| panic!("{name}: {e}"));
        let decoded = retrocycle(encoded).unwrap_or_else(|e| panic!("{name}: {e}"));
        let expected = expected.unwrap_or(input)();
        assert!(structurally_eq(&decoded, &expected), "{name}: got {decoded:?}");
    }
}

#[test]
fn encoded_forms_survive_decode_then_encode() {
    let cases: &[(&str, fn() -> Tagged)] = &[
        ("sibling reference", || {
            Tagged::array(vec![
                Tagged::object([("v", Tagged::Number(1.0))]),
                Tagged::ref_token("$[0]"),
            ])
        }),
        ("root reference", || Tagged::object([("me", Tagged::ref_token("$"))])),
        ("quoted key reference", || {
            let inner = Tagged::object([("back", Tagged::ref_token(r#"$["a b"]"#))]);
            Tagged::object([("a b", inner)])
        }),
        ("no references", || {
            Tagged::object([("k", Tagged::Extern("x".into())), ("n", Tagged::Null)])
        }),
    ];

    for &(name, encoded) in cases {
        let decoded = retrocycle(encoded()).unwrap_or_else(|e| panic!("{name}: {e}"));
        let again = decycle(&decoded).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(structurally_eq(&again, &encoded()), "{name}: got {again:?}");
    }
}

#[test]
fn self_reference_encodes_as_root_token() {
    let o = V::empty_object();
    o.insert("self", o.clone());

    let encoded = decycle(&o).unwrap();
    assert_eq!(encoded.get("self").unwrap().ref_path().as_deref(), Some("$"));

    let decoded = retrocycle(encoded).unwrap();
    assert!(decoded.get("self").unwrap().same_instance(&decoded));
}

#[test]
fn shared_container_becomes_one_instance_again() {
    let shared = V::object([("v", V::Number(1.0))]);
    let root = V::array(vec![shared.clone(), shared]);

    let encoded = decycle(&root).unwrap();
    assert!(encoded.at(0).unwrap().ref_path().is_none());
    assert_eq!(encoded.at(1).unwrap().ref_path().as_deref(), Some("$[0]"));

    let decoded = retrocycle(encoded).unwrap();
    assert!(decoded.at(0).unwrap().same_instance(&decoded.at(1).unwrap()));
    assert!(structurally_eq(&decoded, &root));
}

#[test]
fn reference_paths_use_json_quoted_keys() {
    let target = V::empty_object();
    let root = V::object([
        ("a \"quoted\" key", target.clone()),
        ("again", target),
    ]);
    let encoded = decycle(&root).unwrap();
    let path = encoded.get("again").unwrap().ref_path().unwrap();
    assert_eq!(path, r#"$["a \"quoted\" key"]"#);

    let steps = parse_path(&path).unwrap();
    assert_eq!(steps.as_slice(), &[PathStep::Key("a \"quoted\" key".into())]);
    assert_eq!(format_path(&steps), path);
}

#[test]
fn nested_cycle_points_at_first_visit() {
    // root.properties.model.properties.a === root.properties.model
    let model = V::empty_object();
    let model_props = V::empty_object();
    model_props.insert("a", model.clone());
    model.insert("kind", V::Number(20.0));
    model.insert("properties", model_props);
    let root = V::object([("properties", V::object([("model", model)]))]);

    let encoded = decycle(&root).unwrap();
    let a = encoded
        .get("properties")
        .and_then(|p| p.get("model"))
        .and_then(|m| m.get("properties"))
        .and_then(|p| p.get("a"))
        .unwrap();
    assert_eq!(
        a.ref_path().as_deref(),
        Some(r#"$["properties"]["model"]"#)
    );

    let decoded = retrocycle(encoded).unwrap();
    let model = decoded.get("properties").unwrap().get("model").unwrap();
    let a = model.get("properties").unwrap().get("a").unwrap();
    assert!(a.same_instance(&model));
}

#[test]
fn exempt_values_are_copied_verbatim_each_time() {
    let payload = V::object([("kind", V::Number(5.0)), ("value", V::string("x"))]);
    let root = V::array(vec![V::exempt(payload.clone()), V::exempt(payload)]);

    let encoded = decycle(&root).unwrap();
    for i in 0..2 {
        let item = encoded.at(i).unwrap();
        assert!(item.ref_path().is_none());
        assert_eq!(item.get("value").unwrap().as_str(), Some("x"));
    }
}

#[test]
fn maps_and_sets_are_encoded_as_objects_and_arrays() {
    let set = V::set(vec![V::Number(1.0), V::Number(2.0)]);
    let map = V::map(vec![(V::Number(1.0), set.clone()), (V::string("b"), set)]);

    let encoded = decycle(&map).unwrap();
    assert!(matches!(encoded, V::Object(_)));
    assert!(matches!(encoded.get("1").unwrap(), V::Array(_)));
    assert_eq!(encoded.get("b").unwrap().ref_path().as_deref(), Some(r#"$["1"]"#));

    let decoded = retrocycle(encoded).unwrap();
    assert!(decoded.get("1").unwrap().same_instance(&decoded.get("b").unwrap()));
}

#[test]
fn malformed_reference_tokens_survive_decoding() {
    let root = V::object([
        ("evil", V::ref_token("$;alert(1)")),
        ("prefix", V::ref_token("$[0")),
        ("ok", V::ref_token("$")),
    ]);
    let decoded = retrocycle(root).unwrap();
    assert_eq!(
        decoded.get("evil").unwrap().ref_path().as_deref(),
        Some("$;alert(1)")
    );
    assert_eq!(decoded.get("prefix").unwrap().ref_path().as_deref(), Some("$[0"));
    assert!(decoded.get("ok").unwrap().same_instance(&decoded));
}

#[test]
fn oversized_index_does_not_resolve_against_an_array() {
    let path = "$[\"items\"][99999999999999999999999]";
    let root = V::object([
        ("items", V::array(vec![V::Number(1.0)])),
        ("back", V::ref_token(path)),
    ]);
    let err = retrocycle(root).unwrap_err();
    assert_eq!(
        err,
        CycleError::UnresolvedReference {
            path: path.to_owned()
        }
    );
}

#[test]
fn decycle_does_not_mutate_input() {
    let o = V::empty_object();
    o.insert("self", o.clone());
    let _ = decycle(&o).unwrap();
    assert!(o.get("self").unwrap().same_instance(&o));
    assert_eq!(o.len(), Some(1));
}

#[test]
fn runaway_nesting_is_bounded() {
    let mut value = V::Null;
    for _ in 0..64 {
        value = V::object([("next", value)]);
    }
    let err = Decycler::new(CodecOptions { max_depth: 16 })
        .decycle(&value)
        .unwrap_err();
    assert_eq!(err, CycleError::DepthExceeded { limit: 16 });
}
