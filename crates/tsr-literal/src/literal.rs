//! The output literal tree.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use tsr_common::Expr;
use tsr_cycle::REF_KEY;

/// 2^53: integral numbers below this serialize without a fraction.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A plain-data expression: what gets embedded as a constant.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralNode {
    String(String),
    Number(f64),
    Boolean(bool),
    Undefined,
    Null,
    /// Decimal digits, printed with the `n` suffix
    BigInt(String),
    Array(Vec<LiteralNode>),
    /// Property assignments in order
    Object(Vec<(String, LiteralNode)>),
    /// Pre-built expression reproduced as written
    Verbatim(Expr),
}

impl LiteralNode {
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Object(props) => props.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn at(&self, index: usize) -> Option<&Self> {
        match self {
            Self::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Follow a chain of property names.
    pub fn lookup(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Object(props) => props.iter().map(|(k, _)| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Path of a `{ $ref: "..." }` back-reference token.
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            Self::Object(props) if props.len() == 1 && props[0].0 == REF_KEY => props[0].1.as_str(),
            _ => None,
        }
    }
}

/// JSON view: `undefined` becomes `null`, big integers and verbatim
/// expressions become their source text.
impl Serialize for LiteralNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::String(s) | Self::BigInt(s) => serializer.serialize_str(s),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Undefined | Self::Null => serializer.serialize_unit(),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(props) => {
                let mut map = serializer.serialize_map(Some(props.len()))?;
                for (key, value) in props {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Self::Verbatim(expr) => serializer.collect_str(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ref_path_requires_a_lone_ref_key() {
        let token = LiteralNode::Object(vec![("$ref".into(), LiteralNode::String("$".into()))]);
        assert_eq!(token.ref_path(), Some("$"));

        let not_token = LiteralNode::Object(vec![
            ("$ref".into(), LiteralNode::String("$".into())),
            ("kind".into(), LiteralNode::Number(1.0)),
        ]);
        assert_eq!(not_token.ref_path(), None);
    }

    #[test]
    fn serializes_to_json() {
        let node = LiteralNode::Object(vec![
            ("kind".into(), LiteralNode::Number(19.0)),
            ("type".into(), LiteralNode::Verbatim(Expr::id("Foo", Default::default()))),
            ("arguments".into(), LiteralNode::Array(vec![LiteralNode::Undefined])),
        ]);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({ "kind": 19, "type": "Foo", "arguments": [null] })
        );
    }
}
