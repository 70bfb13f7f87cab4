//! Common types and utilities for the tsr reflection pipeline.
//!
//! This crate provides foundational types used across all tsr crates:
//! - Type identities and syntactic scopes (`TypeId`, `ScopeId`)
//! - The verbatim expression IR handed through the pipeline (`Expr`)
//! - Declaration modifier flags (`ModifierFlags`)
//! - Warnings and warning sinks for non-fatal diagnostics
//! - Centralized recursion limits and the depth counter that enforces them

// Host-assigned identities
pub mod ids;
pub use ids::{ScopeId, TypeId};

// Verbatim expressions (initializers, symbolic identifiers)
pub mod expr;
pub use expr::Expr;

// Declaration modifiers
pub mod modifiers;
pub use modifiers::ModifierFlags;

// Non-fatal diagnostics
pub mod diagnostics;
pub use diagnostics::{SourceLocation, TracingSink, Warning, WarningSink};

// Centralized limits and thresholds
pub mod limits;

// Depth bounding for recursive walks
pub mod recursion;
pub use recursion::{DepthCounter, RecursionProfile};
