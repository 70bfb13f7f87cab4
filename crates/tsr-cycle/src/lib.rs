//! Cycle-safe encoding of object graphs.
//!
//! [`decycle`] turns a graph that may contain shared or self-referential
//! containers into an acyclic tree in which every repeated container is
//! replaced by a `{ "$ref": <path> }` token naming where it was first seen.
//! [`retrocycle`] inverts that in place. Paths use a small grammar:
//!
//! ```text
//! path := "$" step*
//! step := "[" digits "]" | "[" json-string "]"
//! ```
//!
//! Values wrapped in [`Value::Exempt`] are emitted verbatim and never become
//! back-references, even when they are reached twice.

pub mod decycle;
pub mod equality;
pub mod error;
pub mod json;
pub mod path;
pub mod retrocycle;
pub mod value;

pub use decycle::{CodecOptions, Decycler, decycle, normalize};
pub use equality::structurally_eq;
pub use error::CycleError;
pub use json::{from_json, to_json, to_json_with};
pub use path::{PathStep, PathSteps, ROOT, format_path, is_path, parse_path};
pub use retrocycle::{Retrocycler, resolve_path, retrocycle};
pub use value::{Primitive, REF_KEY, Value, format_number};
