//! Literal generation over reflected fixture types.

use serde_json::json;
use tsr_common::{Expr, ModifierFlags, ScopeId, SourceLocation, TypeId};
use tsr_cycle::{CycleError, structurally_eq};
use tsr_literal::{
    LiteralError, LiteralGenerator, LiteralNode, LiteralOptions, Position, make_literal,
    print_literal,
};
use tsr_reflect::{FixtureHost, ReflectContext, Reflector, TypeRef};

fn host(fixture: serde_json::Value) -> FixtureHost {
    FixtureHost::from_json(fixture).expect("valid fixture")
}

fn reflect_class(host: &FixtureHost, id: u32) -> TypeRef {
    let mut warnings = Vec::new();
    let mut ctx = ReflectContext::new(
        ScopeId::FILE,
        SourceLocation::new("src/app.ts", 1, 0, "@Reflective"),
        &mut warnings,
    );
    let node = Reflector::new(host)
        .reflect_class(&mut ctx, &TypeId(id))
        .expect("class reflects");
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    node
}

fn class_literal(fixture: serde_json::Value, id: u32) -> LiteralNode {
    let host = host(fixture);
    let class = reflect_class(&host, id);
    make_literal(&class, None).expect("literal")
}

fn num(node: &LiteralNode, keys: &[&str]) -> Option<f64> {
    node.lookup(keys).and_then(LiteralNode::as_f64)
}

// =============================================================================
// Cycles
// =============================================================================

#[test]
fn recursive_class_becomes_back_references() {
    let literal = class_literal(
        json!({
            "types": [
                { "id": 10, "kind": "class", "symbol": "Recursive",
                  "properties": ["Recursive.prop", "Recursive.model"] },
                { "id": 11, "kind": "class", "interface": true, "symbol": "StatsModel",
                  "properties": ["StatsModel.a"] }
            ],
            "symbols": {
                "Recursive": { "kind": "class" },
                "Recursive.prop": { "kind": "property", "type": 10 },
                "Recursive.model": { "kind": "property", "type": 11 },
                "StatsModel": { "kind": "interface" },
                "StatsModel.a": { "kind": "property", "type": 11 }
            }
        }),
        10,
    );

    assert_eq!(literal.keys(), ["kind", "name", "properties", "constructors"]);
    assert_eq!(num(&literal, &["kind"]), Some(21.0));
    assert_eq!(literal.get("name").and_then(LiteralNode::as_str), Some("Recursive"));

    let prop = literal.lookup(&["properties", "prop"]).expect("prop");
    assert_eq!(prop.ref_path(), Some("$"));

    let model = literal.lookup(&["properties", "model"]).expect("model");
    assert_eq!(num(model, &["kind"]), Some(20.0));
    assert_eq!(num(model, &["modifiers"]), Some(0.0));
    assert_eq!(model.get("name").and_then(LiteralNode::as_str), Some("StatsModel"));
    assert_eq!(
        model.lookup(&["properties", "a"]).and_then(LiteralNode::ref_path),
        Some(r#"$["properties"]["model"]"#)
    );

    let constructors = literal.get("constructors").expect("constructors");
    assert_eq!(
        print_literal(constructors),
        "[{ modifiers: 0, parameters: [] }]"
    );
}

#[test]
fn shared_types_are_referenced_after_first_use() {
    let literal = class_literal(
        json!({
            "types": [
                { "id": 1, "kind": "number" },
                { "id": 10, "kind": "class", "symbol": "Pair",
                  "properties": ["Pair.left", "Pair.right"] }
            ],
            "symbols": {
                "Pair": { "kind": "class" },
                "Pair.left": { "kind": "property", "type": 1, "modifiers": ["readonly"] },
                "Pair.right": { "kind": "property", "type": 1 }
            }
        }),
        10,
    );

    let left = literal.lookup(&["properties", "left"]).expect("left");
    assert_eq!(num(left, &["kind"]), Some(3.0));
    assert_eq!(num(left, &["modifiers"]), Some(8.0));
    assert_eq!(
        literal.lookup(&["properties", "right"]).and_then(LiteralNode::ref_path),
        Some(r#"$["properties"]["left"]"#)
    );
}

#[test]
fn literal_kinds_are_inlined_every_time() {
    let literal = class_literal(
        json!({
            "types": [
                { "id": 1, "kind": "stringLiteral", "value": "on" },
                { "id": 2, "kind": "numberLiteral", "value": 7 },
                { "id": 3, "kind": "union", "types": [1, 2] },
                { "id": 10, "kind": "class", "symbol": "Switch",
                  "properties": ["Switch.first", "Switch.second", "Switch.either"] }
            ],
            "symbols": {
                "Switch": { "kind": "class" },
                "Switch.first": { "kind": "property", "type": 1 },
                "Switch.second": { "kind": "property", "type": 1 },
                "Switch.either": { "kind": "property", "type": 3 }
            }
        }),
        10,
    );

    let first = literal.lookup(&["properties", "first"]).expect("first");
    let second = literal.lookup(&["properties", "second"]).expect("second");
    assert_eq!(first.ref_path(), None);
    assert_eq!(second.ref_path(), None);
    assert_eq!(first, second);
    assert_eq!(print_literal(first), r#"{ kind: 5, modifiers: 0, value: "on" }"#);

    let either = literal.lookup(&["properties", "either", "types"]).expect("types");
    assert_eq!(either.at(0), Some(first));
    assert_eq!(num(either.at(1).expect("number literal"), &["value"]), Some(7.0));
}

#[test]
fn scalar_cache_hits_are_exempt_copies() {
    let host = host(json!({
        "types": [{ "id": 1, "kind": "stringLiteral", "value": "x" }]
    }));
    let mut warnings = Vec::new();
    let mut ctx = ReflectContext::new(ScopeId::FILE, SourceLocation::default(), &mut warnings);
    let node = Reflector::new(&host)
        .reflect_type(&mut ctx, &TypeId(1))
        .expect("literal type");

    let mut generator = LiteralGenerator::new(LiteralOptions::default());
    let first = generator.literal_data(&node, Position::default()).unwrap();
    let second = generator.literal_data(&node, Position::default()).unwrap();

    let (Some(a), Some(b)) = (first.as_exempt(), second.as_exempt()) else {
        panic!("literal kinds are exempt: {first:?} {second:?}");
    };
    assert!(structurally_eq(a, b));
}

// =============================================================================
// Verbatim expressions
// =============================================================================

#[test]
fn references_emit_their_name_verbatim() {
    let literal = class_literal(
        json!({
            "types": [
                { "id": 1, "kind": "string" },
                { "id": 2, "kind": "class", "symbol": "Array" },
                { "id": 3, "kind": "reference", "target": 2, "arguments": [1] },
                { "id": 10, "kind": "class", "symbol": "Holder", "properties": ["Holder.items"] }
            ],
            "symbols": {
                "Array": { "kind": "class" },
                "Holder": { "kind": "class" },
                "Holder.items": { "kind": "property", "type": 3 }
            }
        }),
        10,
    );

    let items = literal.lookup(&["properties", "items"]).expect("items");
    assert_eq!(
        items.get("type"),
        Some(&LiteralNode::Verbatim(Expr::id("Array", ScopeId::FILE)))
    );
    assert_eq!(
        print_literal(items),
        "{ kind: 19, modifiers: 0, type: Array, arguments: [{ kind: 2 }] }"
    );
}

#[test]
fn class_members_initializers_and_constructors() {
    let literal = class_literal(
        json!({
            "types": [
                { "id": 1, "kind": "string" },
                { "id": 2, "kind": "number" },
                { "id": 3, "kind": "boolean" },
                { "id": 9, "kind": "class", "symbol": "Shape" },
                { "id": 10, "kind": "class", "symbol": "Point", "bases": [9],
                  "properties": ["Point.x", "Point.label"] }
            ],
            "symbols": {
                "Shape": { "kind": "class" },
                "Point": {
                    "kind": "class",
                    "constructors": [
                        { "modifiers": ["public"], "parameters": ["Point.new.x", "Point.new.visible"] }
                    ]
                },
                "Point.x": { "kind": "property", "type": 2, "modifiers": ["private", "readonly"] },
                "Point.label": { "kind": "property", "type": 1, "initializer": "\"origin\"" },
                "Point.new.x": { "kind": "parameter", "type": 2 },
                "Point.new.visible": { "kind": "parameter", "type": 3, "modifiers": ["readonly"],
                                       "initializer": "true" }
            }
        }),
        10,
    );

    assert_eq!(
        literal.keys(),
        ["kind", "name", "properties", "constructors", "extends"]
    );
    assert_eq!(num(&literal, &["properties", "x", "modifiers"]), Some(10.0));

    let label = literal.lookup(&["properties", "label"]).expect("label");
    assert_eq!(
        label.get("initializer").map(print_literal),
        Some("() => \"origin\"".to_owned())
    );
    assert_eq!(label.keys(), ["kind", "modifiers", "initializer"]);

    let constructor = literal
        .get("constructors")
        .and_then(|c| c.at(0))
        .expect("constructor");
    assert_eq!(num(constructor, &["modifiers"]), Some(1.0));
    let params = constructor.get("parameters").expect("parameters");

    let x = params.at(0).expect("x");
    assert_eq!(x.get("name").and_then(LiteralNode::as_str), Some("x"));
    assert_eq!(
        x.get("type").and_then(LiteralNode::ref_path),
        Some(r#"$["properties"]["x"]"#)
    );

    let visible = params.at(1).expect("visible");
    assert_eq!(num(visible, &["modifiers"]), Some(8.0));
    assert_eq!(
        print_literal(visible.get("type").expect("type")),
        "{ kind: 4, initializer: () => true }"
    );

    assert_eq!(
        print_literal(literal.get("extends").expect("extends")),
        "{ kind: 19, type: Shape, arguments: [] }"
    );
}

#[test]
fn top_level_modifiers_are_emitted_when_given() {
    let host = host(json!({
        "types": [{ "id": 1, "kind": "null" }]
    }));
    let mut warnings = Vec::new();
    let mut ctx = ReflectContext::new(ScopeId::FILE, SourceLocation::default(), &mut warnings);
    let node = Reflector::new(&host).reflect_type(&mut ctx, &TypeId(1)).unwrap();

    let literal = make_literal(&node, Some(ModifierFlags::STATIC)).unwrap();
    assert_eq!(print_literal(&literal), "{ kind: 11, modifiers: 256 }");
    assert_eq!(
        serde_json::to_value(&literal).unwrap(),
        json!({ "kind": 11, "modifiers": 256 })
    );
}

// =============================================================================
// Limits
// =============================================================================

#[test]
fn generation_depth_is_bounded() {
    let host = host(json!({
        "types": [
            { "id": 1, "kind": "string" },
            { "id": 2, "kind": "object", "anonymous": true, "symbol": "__type",
              "properties": ["inner.value"] },
            { "id": 10, "kind": "class", "symbol": "Outer", "properties": ["Outer.inner"] }
        ],
        "symbols": {
            "Outer": { "kind": "class" },
            "Outer.inner": { "kind": "property", "type": 2 },
            "__type": { "kind": "typeLiteral" },
            "inner.value": { "kind": "property", "type": 1 }
        }
    }));
    let class = reflect_class(&host, 10);

    let generator = LiteralGenerator::new(LiteralOptions {
        max_depth: 2,
        ..LiteralOptions::default()
    });
    let err = generator.make_literal(&class, None).unwrap_err();
    assert_eq!(err, LiteralError::DepthExceeded { limit: 2 });
}

#[test]
fn codec_depth_errors_are_reported() {
    let host = host(json!({
        "types": [
            { "id": 1, "kind": "string" },
            { "id": 10, "kind": "class", "symbol": "Flat", "properties": ["Flat.name"] }
        ],
        "symbols": {
            "Flat": { "kind": "class" },
            "Flat.name": { "kind": "property", "type": 1 }
        }
    }));
    let class = reflect_class(&host, 10);

    let mut options = LiteralOptions::default();
    options.codec.max_depth = 1;
    let err = LiteralGenerator::new(options)
        .make_literal(&class, None)
        .unwrap_err();
    assert!(matches!(err, LiteralError::Codec(CycleError::DepthExceeded { .. })));
}
