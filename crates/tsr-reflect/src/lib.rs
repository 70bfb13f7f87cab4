//! Reflection of a host type graph into a canonical, shared node tree.
//!
//! The host type checker is abstracted by [`TypeHost`]. A [`Reflector`]
//! walks host types and produces [`ReflectedType`] nodes, deduplicated by the
//! host's type identity. Recursive types come out as genuinely cyclic
//! `Rc` graphs rather than infinite trees.
//!
//! Shapes the reflector does not understand never fail a pass: they become
//! `Unknown2` nodes and a warning goes to the context's sink.

pub mod context;
pub mod error;
pub mod fixture;
pub mod host;
pub mod normalize;
pub mod reflect;
pub mod types;

pub use context::ReflectContext;
pub use error::ReflectError;
pub use fixture::{Fixture, FixtureError, FixtureHost, SymbolId};
pub use host::{ConstructSignature, ObjectFlags, SymbolFlags, TypeFlags, TypeHost};
pub use normalize::normalize_union;
pub use reflect::{ReflectOptions, Reflector};
pub use types::{
    ClassData, Constructor, Parameter, Property, ReflectedType, TypeData, TypeKind, TypeRef,
};
