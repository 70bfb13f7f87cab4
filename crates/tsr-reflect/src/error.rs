use thiserror::Error;
use tsr_common::TypeId;

/// Fatal reflection failures. Unsupported type shapes are not errors; they
/// degrade to `Unknown2` and produce a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    /// The host could not supply data every checked program has.
    #[error("host has no {what} for type {type_id}")]
    MissingHostData { what: &'static str, type_id: TypeId },

    #[error("type nesting exceeds the maximum reflection depth of {limit}")]
    DepthExceeded { limit: u32 },
}
