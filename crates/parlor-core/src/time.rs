//! Millisecond timestamps
//!
//! The engines never read the system clock directly; they ask
//! [`crate::effects::ClockEffects`] for a [`Timestamp`]. Keeping the
//! representation a plain millisecond count makes deterministic tests and
//! ordering trivial; there is no calendar math anywhere in the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Milliseconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Create from a millisecond count
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Get the millisecond count
    pub const fn millis(&self) -> u64 {
        self.0
    }

    /// Offset by a number of milliseconds, saturating at the maximum.
    pub const fn saturating_add_millis(&self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Whole milliseconds elapsed since `earlier`, zero if `earlier` is
    /// in the future.
    pub const fn since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Timestamp {
    type Output = Timestamp;

    fn add(self, ms: u64) -> Timestamp {
        self.saturating_add_millis(ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}
