//! Structural equality over possibly cyclic graphs.

use rustc_hash::FxHashSet;
use tsr_common::{DepthCounter, RecursionProfile};

use crate::value::Value;

/// Compare two graphs by shape and content.
///
/// Co-inductive: a pair of containers already under comparison is assumed
/// equal, so two cyclic graphs with the same shape compare equal. Instance
/// identity is never required. Graphs nesting deeper than the codec limit
/// compare unequal.
pub fn structurally_eq<X: PartialEq>(a: &Value<X>, b: &Value<X>) -> bool {
    let mut cmp = Comparer {
        assumed: FxHashSet::default(),
        depth: DepthCounter::with_profile(RecursionProfile::CycleCodec),
    };
    cmp.eq(a, b)
}

struct Comparer {
    assumed: FxHashSet<(usize, usize)>,
    depth: DepthCounter,
}

impl Comparer {
    fn eq<X: PartialEq>(&mut self, a: &Value<X>, b: &Value<X>) -> bool {
        match (a, b) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            (Value::Number(x), Value::Number(y)) | (Value::Date(x), Value::Date(y)) => {
                x == y || (x.is_nan() && y.is_nan())
            }
            (Value::BigInt(x), Value::BigInt(y)) | (Value::String(x), Value::String(y)) => x == y,
            (Value::Boxed(x), Value::Boxed(y)) => x == y,
            (
                Value::RegExp { source, flags },
                Value::RegExp {
                    source: other_source,
                    flags: other_flags,
                },
            ) => source == other_source && flags == other_flags,
            (Value::Exempt(x), Value::Exempt(y)) => self.eq(x, y),
            (Value::Extern(x), Value::Extern(y)) => x == y,
            (Value::Array(_), Value::Array(_))
            | (Value::Set(_), Value::Set(_))
            | (Value::Object(_), Value::Object(_))
            | (Value::Map(_), Value::Map(_)) => self.containers_eq(a, b),
            _ => false,
        }
    }

    fn containers_eq<X: PartialEq>(&mut self, a: &Value<X>, b: &Value<X>) -> bool {
        let (Some(ia), Some(ib)) = (a.identity(), b.identity()) else {
            return false;
        };
        if ia == ib || !self.assumed.insert((ia, ib)) {
            return true;
        }
        if !self.depth.enter() {
            return false;
        }
        let result = self.children_eq(a, b);
        self.depth.leave();
        result
    }

    fn children_eq<X: PartialEq>(&mut self, a: &Value<X>, b: &Value<X>) -> bool {
        match (a, b) {
            (Value::Array(x), Value::Array(y)) | (Value::Set(x), Value::Set(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len() && x.iter().zip(y.iter()).all(|(p, q)| self.eq(p, q))
            }
            (Value::Object(x), Value::Object(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len()
                    && x.iter()
                        .all(|(key, p)| y.get(key).is_some_and(|q| self.eq(p, q)))
            }
            (Value::Map(x), Value::Map(y)) => {
                let (x, y) = (x.borrow(), y.borrow());
                x.len() == y.len()
                    && x.iter()
                        .zip(y.iter())
                        .all(|((pk, pv), (qk, qv))| self.eq(pk, qk) && self.eq(pv, qv))
            }
            _ => false,
        }
    }
}
