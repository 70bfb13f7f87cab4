use serde_json::json;
use tsr_cycle::{Value, decycle, from_json, retrocycle, to_json};

type V = Value;

#[test]
fn decycled_graph_serializes_with_ref_objects() {
    let node = V::object([("name", V::string("node"))]);
    node.insert("parent", node.clone());
    let root = V::array(vec![node.clone(), node]);

    let json = to_json(&decycle(&root).unwrap()).unwrap();
    assert_eq!(
        json,
        json!([
            { "name": "node", "parent": { "$ref": "$[0]" } },
            { "$ref": "$[0]" }
        ])
    );
}

#[test]
fn parsed_json_retrocycles_into_shared_graph() {
    let text = r#"{"a":{"v":1},"b":{"$ref":"$[\"a\"]"},"c":[{"$ref":"$"}]}"#;
    let parsed: serde_json::Value = serde_json::from_str(text).unwrap();

    let root = retrocycle(from_json::<std::convert::Infallible>(&parsed)).unwrap();
    assert!(root.get("a").unwrap().same_instance(&root.get("b").unwrap()));
    assert!(root.get("c").unwrap().at(0).unwrap().same_instance(&root));
}

#[test]
fn json_text_survives_a_full_cycle() {
    let text = r#"{"kind":21,"properties":{"next":{"$ref":"$"}},"name":"List"}"#;
    let parsed: serde_json::Value = serde_json::from_str(text).unwrap();

    let graph = retrocycle(from_json::<std::convert::Infallible>(&parsed)).unwrap();
    let back = to_json(&decycle(&graph).unwrap()).unwrap();
    assert_eq!(back, parsed);
    assert_eq!(back.to_string(), text);
}
