//! Encoding: cyclic graph to acyclic, path-referenced tree.
//!
//! The walk is depth-first and never mutates its input. Each container is
//! registered under its identity *before* its children are visited, so a
//! container reached again (through sharing or through a cycle) is emitted as
//! `{ $ref: <path where it was first seen> }` and the walk terminates on any
//! finite graph.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;
use tsr_common::{DepthCounter, RecursionProfile};

use crate::error::CycleError;
use crate::path::{self, ROOT};
use crate::value::Value;

/// Limits for codec traversals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecOptions {
    pub max_depth: u32,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: RecursionProfile::CycleCodec.max_depth(),
        }
    }
}

/// Encode `root` with default limits.
pub fn decycle<X: Clone>(root: &Value<X>) -> Result<Value<X>, CycleError> {
    Decycler::new(CodecOptions::default()).decycle(root)
}

/// One encoding pass. The identity map lives exactly as long as the pass.
pub struct Decycler {
    /// container identity -> path of first visit
    seen: FxHashMap<usize, String>,
    depth: DepthCounter,
}

impl Decycler {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            seen: FxHashMap::default(),
            depth: DepthCounter::new(options.max_depth),
        }
    }

    pub fn decycle<X: Clone>(mut self, root: &Value<X>) -> Result<Value<X>, CycleError> {
        self.derez(root, ROOT)
    }

    fn derez<X: Clone>(&mut self, value: &Value<X>, path: &str) -> Result<Value<X>, CycleError> {
        if let Value::Exempt(inner) = value {
            return Ok((**inner).clone());
        }
        let Some(identity) = value.identity() else {
            return Ok(value.clone());
        };

        if let Some(first) = self.seen.get(&identity) {
            trace!(path, first = %first, "decycle: repeated container");
            return Ok(Value::ref_token(first));
        }
        self.seen.insert(identity, path.to_owned());

        if !self.depth.enter() {
            return Err(CycleError::DepthExceeded {
                limit: self.depth.max_depth(),
            });
        }
        let result = self.derez_children(value, path);
        self.depth.leave();
        result
    }

    fn derez_children<X: Clone>(
        &mut self,
        value: &Value<X>,
        path: &str,
    ) -> Result<Value<X>, CycleError> {
        match value {
            Value::Array(items) | Value::Set(items) => {
                let items = items.borrow();
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.derez(item, &path::index_step(path, i))?);
                }
                Ok(Value::array(out))
            }
            Value::Object(props) => {
                let out = Value::empty_object();
                for (key, item) in props.borrow().iter() {
                    let encoded = self.derez(item, &path::key_step(path, key))?;
                    out.insert(key.clone(), encoded);
                }
                Ok(out)
            }
            Value::Map(entries) => {
                let out = Value::empty_object();
                for (key, item) in entries.borrow().iter() {
                    let key = key.property_key();
                    let encoded = self.derez(item, &path::key_step(path, &key))?;
                    out.insert(key, encoded);
                }
                Ok(out)
            }
            other => Ok(other.clone()),
        }
    }
}

/// Normalize `Map`/`Set` containers into object/array shape without encoding
/// references. Sharing is preserved: a container reached twice becomes the
/// same normalized container.
pub fn normalize<X: Clone>(root: &Value<X>) -> Result<Value<X>, CycleError> {
    let mut normalizer = Normalizer {
        done: FxHashMap::default(),
        depth: DepthCounter::with_profile(RecursionProfile::CycleCodec),
    };
    normalizer.normalize(root)
}

struct Normalizer<X> {
    done: FxHashMap<usize, Value<X>>,
    depth: DepthCounter,
}

impl<X: Clone> Normalizer<X> {
    fn normalize(&mut self, value: &Value<X>) -> Result<Value<X>, CycleError> {
        let Some(identity) = value.identity() else {
            return Ok(value.clone());
        };
        if let Some(done) = self.done.get(&identity) {
            return Ok(done.clone());
        }

        let out = match value {
            Value::Array(_) | Value::Set(_) => Value::Array(Rc::new(RefCell::new(Vec::new()))),
            _ => Value::empty_object(),
        };
        self.done.insert(identity, out.clone());

        if !self.depth.enter() {
            return Err(CycleError::DepthExceeded {
                limit: self.depth.max_depth(),
            });
        }
        let result = self.fill(value, &out);
        self.depth.leave();
        result.map(|()| out)
    }

    fn fill(&mut self, value: &Value<X>, out: &Value<X>) -> Result<(), CycleError> {
        match value {
            Value::Array(items) | Value::Set(items) => {
                for item in items.borrow().iter() {
                    let item = self.normalize(item)?;
                    out.push(item);
                }
            }
            Value::Object(props) => {
                for (key, item) in props.borrow().iter() {
                    let item = self.normalize(item)?;
                    out.insert(key.clone(), item);
                }
            }
            Value::Map(entries) => {
                for (key, item) in entries.borrow().iter() {
                    let item = self.normalize(item)?;
                    out.insert(key.property_key(), item);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type V = Value;

    #[test]
    fn scalars_pass_through() {
        let out = decycle(&V::string("a")).unwrap();
        assert_eq!(out.as_str(), Some("a"));
        let out = decycle(&V::Date(5.0)).unwrap();
        assert!(matches!(out, V::Date(ms) if ms == 5.0));
    }

    #[test]
    fn output_is_a_fresh_tree() {
        let input = V::object([("a", V::Number(1.0))]);
        let out = decycle(&input).unwrap();
        assert!(!out.same_instance(&input));
        assert_eq!(out.get("a").and_then(|v| v.as_f64()), Some(1.0));
    }

    #[test]
    fn exempt_is_unwrapped_without_traversal() {
        let shared = V::object([("x", V::Number(1.0))]);
        let input = V::array(vec![shared.clone(), V::exempt(shared.clone())]);
        let out = decycle(&input).unwrap();
        // The exempt copy is the original container, not a $ref.
        assert!(out.at(1).unwrap().same_instance(&shared));
        assert_eq!(out.at(1).unwrap().ref_path(), None);
    }

    #[test]
    fn depth_limit_is_reported() {
        let mut value = V::Null;
        for _ in 0..10 {
            value = V::array(vec![value]);
        }
        let err = Decycler::new(CodecOptions { max_depth: 4 })
            .decycle(&value)
            .unwrap_err();
        assert_eq!(err, CycleError::DepthExceeded { limit: 4 });
    }

    #[test]
    fn normalize_preserves_sharing() {
        let inner = V::set(vec![V::Number(1.0)]);
        let input = V::map(vec![
            (V::string("a"), inner.clone()),
            (V::Number(2.0), inner),
        ]);
        let out = normalize(&input).unwrap();
        let a = out.get("a").unwrap();
        let b = out.get("2").unwrap();
        assert!(a.same_instance(&b));
        assert!(matches!(a, V::Array(_)));
    }
}
