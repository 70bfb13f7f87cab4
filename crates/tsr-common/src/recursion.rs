//! Depth bounding for recursive walks.
//!
//! The reflector, the literal generator and the cycle codec all recurse over
//! graphs supplied by the caller. Cycles are broken by identity caches, but an
//! acyclic graph can still be arbitrarily deep. `DepthCounter` turns "deep
//! enough to overflow the stack" into an ordinary, reportable condition.
//!
//! # Profiles
//!
//! [`RecursionProfile`] names the limit for each stage so call sites read as
//! intent rather than magic numbers:
//!
//! ```
//! use tsr_common::{DepthCounter, RecursionProfile};
//!
//! let mut depth = DepthCounter::with_profile(RecursionProfile::Reflection);
//! assert!(depth.enter());
//! depth.leave();
//! ```

use crate::limits;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Walking host types into reflected nodes.
    ///
    /// depth = [`limits::MAX_REFLECT_DEPTH`]
    Reflection,

    /// Building literal data from a reflected tree.
    ///
    /// depth = [`limits::MAX_LITERAL_DEPTH`]
    LiteralGeneration,

    /// Cycle codec traversals.
    ///
    /// depth = [`limits::MAX_CODEC_DEPTH`]
    CycleCodec,

    /// Custom limit for one-off or test scenarios.
    Custom { max_depth: u32 },
}

impl RecursionProfile {
    /// Maximum recursion depth for this profile.
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Reflection => limits::MAX_REFLECT_DEPTH,
            Self::LiteralGeneration => limits::MAX_LITERAL_DEPTH,
            Self::CycleCodec => limits::MAX_CODEC_DEPTH,
            Self::Custom { max_depth } => max_depth,
        }
    }
}

// ---------------------------------------------------------------------------
// DepthCounter
// ---------------------------------------------------------------------------

/// Nesting depth of one walk, checked against a fixed limit.
///
/// Only depth is bounded here. Revisits of a node already on the walk are
/// caught by the walk's own identity map before `enter` is reached.
///
/// Each successful [`enter`](Self::enter) is paired with one
/// [`leave`](Self::leave), including on the error path:
///
/// ```ignore
/// if !self.depth.enter() {
///     return Err(ReflectError::DepthExceeded { limit: self.depth.max_depth() });
/// }
/// let data = self.type_data(ctx, ty);
/// self.depth.leave();
/// let data = data?;
/// ```
///
/// Debug builds check the pairing: `leave` at depth zero and dropping the
/// counter while levels are still open both panic.
#[derive(Debug)]
pub struct DepthCounter {
    depth: u32,
    max_depth: u32,
    exceeded: bool,
}

impl DepthCounter {
    pub fn new(max_depth: u32) -> Self {
        Self {
            depth: 0,
            max_depth,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth())
    }

    /// Open one more level. At the limit this records the overflow and
    /// returns `false` without opening a level, so there is nothing to leave.
    #[inline]
    pub fn enter(&mut self) -> bool {
        if self.depth < self.max_depth {
            self.depth += 1;
            true
        } else {
            self.exceeded = true;
            false
        }
    }

    /// Close the level opened by the matching [`enter`](Self::enter).
    #[inline]
    pub fn leave(&mut self) {
        debug_assert!(self.depth > 0, "depth counter: leave without enter");
        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Whether any `enter` has hit the limit since creation or the last
    /// [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Start a fresh walk with the same limit.
    pub fn reset(&mut self) {
        self.depth = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl Drop for DepthCounter {
    fn drop(&mut self) {
        if self.depth > 0 && !std::thread::panicking() {
            panic!("depth counter dropped with {} open level(s)", self.depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_limits_come_from_limits_module() {
        assert_eq!(
            RecursionProfile::Reflection.max_depth(),
            limits::MAX_REFLECT_DEPTH
        );
        assert_eq!(
            RecursionProfile::CycleCodec.max_depth(),
            limits::MAX_CODEC_DEPTH
        );
        assert_eq!(RecursionProfile::Custom { max_depth: 7 }.max_depth(), 7);
    }

    #[test]
    fn enter_until_limit() {
        let mut counter = DepthCounter::new(2);
        assert!(counter.enter());
        assert!(counter.enter());
        assert!(!counter.enter());
        assert!(counter.is_exceeded());
        assert_eq!(counter.depth(), 2);

        counter.leave();
        counter.leave();
        assert_eq!(counter.depth(), 0);
        // exceeded is sticky
        assert!(counter.is_exceeded());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "leave without enter")]
    fn unmatched_leave_panics_in_debug() {
        let mut counter = DepthCounter::new(1);
        counter.leave();
    }

    #[test]
    fn reset_clears_exceeded() {
        let mut counter = DepthCounter::new(0);
        assert!(!counter.enter());
        counter.reset();
        assert!(!counter.is_exceeded());
        assert_eq!(counter.max_depth(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "open level(s)")]
    fn drop_with_active_depth_panics_in_debug() {
        let mut counter = DepthCounter::new(4);
        assert!(counter.enter());
        drop(counter);
    }
}
