//! Core timer types.

use serde::{Deserialize, Serialize};

/// Unique identifier for a named timer within one log.
///
/// Id 0 is reserved as the registration sentinel in the log framing and
/// never names a timer. Real ids are assigned densely in first-use order
/// starting at 1.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct TimerId(pub u32);

impl TimerId {
    /// The reserved sentinel id.
    pub const SENTINEL: Self = Self(0);

    /// First id handed out to a registered timer.
    pub const FIRST: Self = Self(1);

    /// Returns true if this is the reserved sentinel.
    #[inline]
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        self.0 == 0
    }

    /// Raw index for array-based per-id storage.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
