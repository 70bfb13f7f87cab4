//! The graph model the codec traverses.
//!
//! A [`Value`] is a dynamically shaped node: a scalar, one of four container
//! flavors, or one of two control markers. Containers are reference-counted
//! cells, so the same container can be reachable from several places (shared)
//! or from inside itself (cyclic). Container *identity* is the allocation
//! address of its cell, which is what the codec keys on.
//!
//! The container flavors form a closed set:
//!
//! | Variant  | Shape      | Traversed as |
//! |----------|------------|--------------|
//! | `Array`  | ordered    | array        |
//! | `Object` | keyed      | object       |
//! | `Map`    | keyed      | object (keys coerced to property names) |
//! | `Set`    | ordered    | array        |
//!
//! External collection kinds are adapted into one of these before encoding.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::rc::Rc;
use tsr_common::{DepthCounter, RecursionProfile};

pub type ArrayRef<X> = Rc<RefCell<Vec<Value<X>>>>;
pub type ObjectRef<X> = Rc<RefCell<IndexMap<String, Value<X>>>>;
pub type MapRef<X> = Rc<RefCell<Vec<(Value<X>, Value<X>)>>>;
pub type SetRef<X> = Rc<RefCell<Vec<Value<X>>>>;

/// Property name of a back-reference token.
pub const REF_KEY: &str = "$ref";

/// Boxed primitive (`new Number(1)`, `new String("a")`).
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Number(f64),
    String(String),
}

/// A node of a possibly cyclic object graph.
///
/// `X` is an opaque leaf payload the codec never inspects. The literal
/// generator uses it for verbatim expressions; plain data uses the default.
#[derive(Clone)]
pub enum Value<X = Infallible> {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Arbitrary precision integer, decimal digits
    BigInt(String),
    String(String),
    Boxed(Primitive),
    /// Milliseconds since the epoch
    Date(f64),
    RegExp {
        source: String,
        flags: String,
    },
    Array(ArrayRef<X>),
    Object(ObjectRef<X>),
    Map(MapRef<X>),
    Set(SetRef<X>),
    /// Use the wrapped value verbatim; never replace it with a back-reference.
    Exempt(Box<Value<X>>),
    /// Opaque payload passed through untouched.
    Extern(X),
}

impl<X> Value<X> {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn array(items: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(items)))
    }

    pub fn empty_array() -> Self {
        Self::array(Vec::new())
    }

    pub fn object<K: Into<String>>(props: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Object(Rc::new(RefCell::new(
            props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    pub fn empty_object() -> Self {
        Self::Object(Rc::new(RefCell::new(IndexMap::new())))
    }

    pub fn map(entries: Vec<(Self, Self)>) -> Self {
        Self::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn set(items: Vec<Self>) -> Self {
        Self::Set(Rc::new(RefCell::new(items)))
    }

    /// Wrap `value` so the codec reproduces it verbatim.
    pub fn exempt(value: Self) -> Self {
        Self::Exempt(Box::new(value))
    }

    /// `{ $ref: path }`
    pub fn ref_token(path: &str) -> Self {
        Self::object([(REF_KEY, Self::String(path.to_owned()))])
    }

    /// Identity of a container node; `None` for scalars and markers.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Array(items) | Self::Set(items) => Some(Rc::as_ptr(items).cast::<()>() as usize),
            Self::Object(props) => Some(Rc::as_ptr(props).cast::<()>() as usize),
            Self::Map(entries) => Some(Rc::as_ptr(entries).cast::<()>() as usize),
            _ => None,
        }
    }

    /// `true` if both values are the same container instance.
    pub fn same_instance(&self, other: &Self) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Self::Array(_) | Self::Object(_) | Self::Map(_) | Self::Set(_)
        )
    }

    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
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

    /// Unwrap a cycle-exempt marker.
    pub fn as_exempt(&self) -> Option<&Self> {
        match self {
            Self::Exempt(inner) => Some(inner),
            _ => None,
        }
    }

    /// The path of a `{ $ref: "<string>" }` object, grammar not checked.
    pub fn ref_path(&self) -> Option<String> {
        match self {
            Self::Object(props) => props
                .borrow()
                .get(REF_KEY)
                .and_then(|v| v.as_str().map(str::to_owned)),
            _ => None,
        }
    }

    /// Property lookup on an object-shaped value.
    pub fn get(&self, key: &str) -> Option<Self>
    where
        X: Clone,
    {
        match self {
            Self::Object(props) => props.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Element lookup on an array-shaped value.
    pub fn at(&self, index: usize) -> Option<Self>
    where
        X: Clone,
    {
        match self {
            Self::Array(items) | Self::Set(items) => items.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Number of elements or properties of a container.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Array(items) | Self::Set(items) => Some(items.borrow().len()),
            Self::Object(props) => Some(props.borrow().len()),
            Self::Map(entries) => Some(entries.borrow().len()),
            _ => None,
        }
    }

    /// Insert or replace a property on an object-shaped value.
    ///
    /// Returns `false` (and drops `value`) if `self` is not an object.
    pub fn insert(&self, key: impl Into<String>, value: Self) -> bool {
        match self {
            Self::Object(props) => {
                props.borrow_mut().insert(key.into(), value);
                true
            }
            _ => false,
        }
    }

    /// Append to an array-shaped value.
    pub fn push(&self, value: Self) -> bool {
        match self {
            Self::Array(items) | Self::Set(items) => {
                items.borrow_mut().push(value);
                true
            }
            _ => false,
        }
    }

    /// Coerce a map key into a property name.
    ///
    /// An array nested inside itself contributes an empty string where it
    /// recurs, and so does anything past the codec depth limit.
    pub fn property_key(&self) -> String {
        let mut depth = DepthCounter::with_profile(RecursionProfile::CycleCodec);
        let mut joining = FxHashSet::default();
        self.property_key_in(&mut depth, &mut joining)
    }

    fn property_key_in(&self, depth: &mut DepthCounter, joining: &mut FxHashSet<usize>) -> String {
        match self {
            Self::Undefined => "undefined".to_owned(),
            Self::Null => "null".to_owned(),
            Self::Bool(b) | Self::Boxed(Primitive::Bool(b)) => b.to_string(),
            Self::Number(n) | Self::Boxed(Primitive::Number(n)) => format_number(*n),
            Self::BigInt(digits) => digits.clone(),
            Self::String(s) | Self::Boxed(Primitive::String(s)) => s.clone(),
            Self::Exempt(inner) => {
                if !depth.enter() {
                    return String::new();
                }
                let key = inner.property_key_in(depth, joining);
                depth.leave();
                key
            }
            Self::Array(items) | Self::Set(items) => {
                let id = Rc::as_ptr(items).cast::<()>() as usize;
                if !joining.insert(id) {
                    return String::new();
                }
                if !depth.enter() {
                    joining.remove(&id);
                    return String::new();
                }
                let key = items
                    .borrow()
                    .iter()
                    .map(|item| match item {
                        Self::Undefined | Self::Null => String::new(),
                        other => other.property_key_in(depth, joining),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                depth.leave();
                joining.remove(&id);
                key
            }
            Self::Date(_) | Self::RegExp { .. } | Self::Object(_) | Self::Map(_) => {
                "[object Object]".to_owned()
            }
            Self::Extern(_) => "[object Object]".to_owned(),
        }
    }
}

/// Render a number the way the host language prints it.
///
/// Integers print without a fraction, magnitudes outside `[1e-6, 1e21)` use
/// exponent notation with an explicit sign, and `-0` prints as `0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{n:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => formatted,
        };
    }
    format!("{n}")
}

// =============================================================================
// Debug
// =============================================================================

const DEBUG_DEPTH: u32 = 6;

struct DebugValue<'a, X>(&'a Value<X>, u32);

impl<X: fmt::Debug> fmt::Debug for DebugValue<'_, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, depth) = (self.0, self.1);
        if value.is_container() && depth >= DEBUG_DEPTH {
            return f.write_str("…");
        }
        match value {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::BigInt(digits) => write!(f, "{digits}n"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Boxed(p) => write!(f, "Boxed({p:?})"),
            Value::Date(ms) => write!(f, "Date({})", format_number(*ms)),
            Value::RegExp { source, flags } => write!(f, "/{source}/{flags}"),
            Value::Array(items) => f
                .debug_list()
                .entries(items.borrow().iter().map(|v| DebugValue(v, depth + 1)))
                .finish(),
            Value::Set(items) => {
                f.write_str("Set")?;
                f.debug_list()
                    .entries(items.borrow().iter().map(|v| DebugValue(v, depth + 1)))
                    .finish()
            }
            Value::Object(props) => f
                .debug_map()
                .entries(
                    props
                        .borrow()
                        .iter()
                        .map(|(k, v)| (k.clone(), DebugValue(v, depth + 1))),
                )
                .finish(),
            Value::Map(entries) => {
                f.write_str("Map")?;
                f.debug_map()
                    .entries(
                        entries
                            .borrow()
                            .iter()
                            .map(|(k, v)| (DebugValue(k, depth + 1), DebugValue(v, depth + 1))),
                    )
                    .finish()
            }
            Value::Exempt(inner) => f
                .debug_tuple("Exempt")
                .field(&DebugValue(&**inner, depth))
                .finish(),
            Value::Extern(x) => f.debug_tuple("Extern").field(x).finish(),
        }
    }
}

/// Depth-limited, so printing a cyclic graph terminates.
impl<X: fmt::Debug> fmt::Debug for Value<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        DebugValue(self, 0).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type V = Value;

    #[test]
    fn format_number_matches_host_rendering() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-12.25), "-12.25");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn identity_is_per_container_instance() {
        let a = V::empty_object();
        let b = V::empty_object();
        assert!(a.same_instance(&a.clone()));
        assert!(!a.same_instance(&b));
        assert_eq!(V::Number(1.0).identity(), None);
    }

    #[test]
    fn property_key_coercion() {
        assert_eq!(V::Number(3.0).property_key(), "3");
        assert_eq!(V::Bool(true).property_key(), "true");
        assert_eq!(V::Null.property_key(), "null");
        assert_eq!(
            V::array(vec![V::Number(1.0), V::Null, V::string("x")]).property_key(),
            "1,,x"
        );
        assert_eq!(V::empty_object().property_key(), "[object Object]");
    }

    #[test]
    fn property_key_of_self_containing_array_terminates() {
        let outer = V::array(vec![V::Number(1.0)]);
        if let V::Array(items) = &outer {
            items.borrow_mut().push(outer.clone());
            items.borrow_mut().push(V::string("z"));
        }
        assert_eq!(outer.property_key(), "1,,z");

        let mut nested = V::Number(0.0);
        for _ in 0..(tsr_common::limits::MAX_CODEC_DEPTH + 8) {
            nested = V::array(vec![nested]);
        }
        assert_eq!(nested.property_key(), "");
    }

    #[test]
    fn ref_path_reads_string_ref_only() {
        assert_eq!(V::ref_token("$[0]").ref_path().as_deref(), Some("$[0]"));
        let numeric = V::object([(REF_KEY, V::Number(1.0))]);
        assert_eq!(numeric.ref_path(), None);
    }

    #[test]
    fn debug_of_cyclic_graph_terminates() {
        let node = V::empty_object();
        node.insert("self", node.clone());
        let rendered = format!("{node:?}");
        assert!(rendered.contains('…'));
    }
}
