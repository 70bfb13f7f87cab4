//! Decoding: replace back-reference tokens with the values they point at.
//!
//! The walk mutates containers in place. Every array element, object property
//! value or map value that is an object of the form `{ $ref: <path> }` with a
//! grammar-valid path is replaced by the value found by following that path
//! from the root. Tokens with malformed paths are ordinary objects and are
//! walked like any other.

use rustc_hash::FxHashSet;
use tracing::trace;
use tsr_common::DepthCounter;

use crate::decycle::CodecOptions;
use crate::error::CycleError;
use crate::path::{PathStep, parse_path};
use crate::value::Value;

/// Decode `root` in place with default limits and return it.
pub fn retrocycle<X: Clone>(root: Value<X>) -> Result<Value<X>, CycleError> {
    Retrocycler::new(CodecOptions::default()).retrocycle(root)
}

/// Follow `steps` from `root` with plain lookups.
///
/// Index steps also address object keys (`obj[0]` is `obj["0"]`) and key
/// steps holding a decimal number address array elements.
pub fn resolve_path<X: Clone>(root: &Value<X>, steps: &[PathStep]) -> Option<Value<X>> {
    let mut current = root.clone();
    for step in steps {
        let next = match (step, &current) {
            (PathStep::Index(i), Value::Array(items) | Value::Set(items)) => {
                items.borrow().get(*i).cloned()
            }
            (PathStep::Index(i), Value::Object(props)) => props.borrow().get(&i.to_string()).cloned(),
            (PathStep::Key(key), Value::Object(props)) => props.borrow().get(key).cloned(),
            (PathStep::Key(key), Value::Array(items) | Value::Set(items)) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.borrow().get(i).cloned()),
            (step, Value::Map(entries)) => {
                let key = match step {
                    PathStep::Index(i) => i.to_string(),
                    PathStep::Key(key) => key.clone(),
                };
                entries
                    .borrow()
                    .iter()
                    .rev()
                    .find(|(k, _)| k.property_key() == key)
                    .map(|(_, v)| v.clone())
            }
            _ => None,
        };
        current = next?;
    }
    Some(current)
}

/// One decoding pass.
pub struct Retrocycler {
    visited: FxHashSet<usize>,
    depth: DepthCounter,
}

impl Retrocycler {
    pub fn new(options: CodecOptions) -> Self {
        Self {
            visited: FxHashSet::default(),
            depth: DepthCounter::new(options.max_depth),
        }
    }

    pub fn retrocycle<X: Clone>(mut self, root: Value<X>) -> Result<Value<X>, CycleError> {
        self.rez(&root, &root)?;
        Ok(root)
    }

    fn rez<X: Clone>(&mut self, root: &Value<X>, value: &Value<X>) -> Result<(), CycleError> {
        if let Value::Exempt(inner) = value {
            return self.rez(root, inner);
        }
        let Some(identity) = value.identity() else {
            return Ok(());
        };
        if !self.visited.insert(identity) {
            return Ok(());
        }

        if !self.depth.enter() {
            return Err(CycleError::DepthExceeded {
                limit: self.depth.max_depth(),
            });
        }
        let result = self.rez_children(root, value);
        self.depth.leave();
        result
    }

    fn rez_children<X: Clone>(&mut self, root: &Value<X>, value: &Value<X>) -> Result<(), CycleError> {
        match value {
            Value::Array(items) | Value::Set(items) => {
                let len = items.borrow().len();
                for i in 0..len {
                    let element = items.borrow()[i].clone();
                    if let Some(target) = self.dereference(root, &element)? {
                        items.borrow_mut()[i] = target;
                    } else {
                        self.rez(root, &element)?;
                    }
                }
            }
            Value::Object(props) => {
                let keys: Vec<String> = props.borrow().keys().cloned().collect();
                for key in keys {
                    let Some(item) = props.borrow().get(&key).cloned() else {
                        continue;
                    };
                    if let Some(target) = self.dereference(root, &item)? {
                        props.borrow_mut().insert(key, target);
                    } else {
                        self.rez(root, &item)?;
                    }
                }
            }
            Value::Map(entries) => {
                let len = entries.borrow().len();
                for i in 0..len {
                    let item = entries.borrow()[i].1.clone();
                    if let Some(target) = self.dereference(root, &item)? {
                        entries.borrow_mut()[i].1 = target;
                    } else {
                        self.rez(root, &item)?;
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// `Some(target)` if `item` is a well-formed reference token.
    fn dereference<X: Clone>(
        &self,
        root: &Value<X>,
        item: &Value<X>,
    ) -> Result<Option<Value<X>>, CycleError> {
        let Some(path) = item.ref_path() else {
            return Ok(None);
        };
        let Some(steps) = parse_path(&path) else {
            trace!(path = %path, "retrocycle: not a reference path");
            return Ok(None);
        };
        resolve_path(root, &steps)
            .map(Some)
            .ok_or(CycleError::UnresolvedReference { path })
    }
}
