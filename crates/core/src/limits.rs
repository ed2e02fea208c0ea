//! Decode limits
//!
//! The property-tree format is recursive and its depth is chosen by whoever
//! wrote the file. `Limits` bounds that recursion; both the sizing and the
//! decoding walk check the same limit, so they reject the same inputs.

/// Limits applied while walking untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum container nesting depth (default: 128)
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_depth: 128 }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits { max_depth: 4 }
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// True when `depth` is within the nesting limit
    #[inline]
    pub fn allows_depth(&self, depth: usize) -> bool {
        depth <= self.max_depth
    }
}
