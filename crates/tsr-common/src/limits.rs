//! Centralized limits for the reflection pipeline.
//!
//! Every stage walks a graph with ordinary call-stack recursion. These
//! constants bound that recursion so a pathologically deep input is reported
//! as an error instead of exhausting the stack. Per-call overrides live in the
//! options structs of each stage; the profiles in
//! [`crate::recursion::RecursionProfile`] read their defaults from here.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting depth when reflecting a host type.
///
/// Depth grows with each property, type argument, union member, base class
/// and constructor parameter that leads to a type not yet in the identity
/// cache. Recursive types stop growing the stack as soon as the cached shell
/// is reused.
///
/// # TypeScript example
///
/// ```typescript
/// // Each level is a distinct anonymous type, so nothing is reused:
/// interface Deep {
///   a: { b: { c: { d: { /* ... hundreds of levels ... */ } } } };
/// }
/// ```
pub const MAX_REFLECT_DEPTH: u32 = 256;

/// Maximum nesting depth when building the literal data for a reflected tree.
///
/// Each literal level adds a property object and the literal of its type, so
/// this is roughly twice [`MAX_REFLECT_DEPTH`].
pub const MAX_LITERAL_DEPTH: u32 = 512;

/// Maximum nesting depth for the cycle codec (decycle, retrocycle, JSON
/// conversion and structural comparison).
///
/// Codec graphs are the literal data of a type, which nests about twice as
/// deep as the type itself.
pub const MAX_CODEC_DEPTH: u32 = 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_and_codec_limits_cover_reflection_depth() {
        assert!(MAX_LITERAL_DEPTH >= 2 * MAX_REFLECT_DEPTH);
        assert!(MAX_CODEC_DEPTH >= 2 * MAX_LITERAL_DEPTH);
    }
}
