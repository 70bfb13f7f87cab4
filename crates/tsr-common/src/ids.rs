//! Identities assigned by the host compiler.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric type identity assigned by the host type checker.
///
/// Stable for one physical type within a single compilation pass. Two types
/// with the same structure but different ids are distinct; two occurrences
/// with the same id are the same type and must reflect to the same node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Identity used for nodes the pipeline synthesizes itself (for example
    /// the `boolean` produced when `true | false` collapses). Never cached.
    pub const SYNTHETIC: Self = Self(u32::MAX);

    pub const fn is_synthetic(self) -> bool {
        self.0 == Self::SYNTHETIC.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            f.write_str("<synthetic>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Lexical scope that generated identifiers are bound to.
///
/// The host hands this in with each reflection request; identifiers created
/// for type references resolve against it when the literal is embedded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The source-file (module) scope.
    pub const FILE: Self = Self(0);
}
