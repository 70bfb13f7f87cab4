use thiserror::Error;

/// Errors raised by the cycle codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    /// The graph nests deeper than the configured limit.
    #[error("graph nesting exceeds the maximum depth of {limit}")]
    DepthExceeded { limit: u32 },

    /// A well-formed reference path does not lead to a value.
    #[error("reference path `{path}` does not resolve against the root")]
    UnresolvedReference { path: String },

    /// A value with no JSON representation.
    #[error("{what} cannot be represented as JSON")]
    NotSerializable { what: &'static str },
}
