use thiserror::Error;
use tsr_common::TypeId;
use tsr_cycle::CycleError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// A node whose reflection never finished.
    #[error("type {type_id} was never fully reflected")]
    IncompleteType { type_id: TypeId },

    #[error("type nesting exceeds the maximum literal depth of {limit}")]
    DepthExceeded { limit: u32 },

    #[error(transparent)]
    Codec(#[from] CycleError),
}
