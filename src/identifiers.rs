//! Type-safe identifiers.
//!
//! Newtype wrappers keep connection-attempt counters from being mixed up
//! with other integers.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

// ============================================================================
// Generation
// ============================================================================

/// Identifier of one connection attempt.
///
/// Every attempt made by a [`ConnectionManager`](crate::ConnectionManager)
/// gets a strictly greater generation than the previous one. Timers and
/// queued messages carry the generation they were created for, so work
/// belonging to a superseded connection can be recognised and discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Generation before any attempt has been made.
    pub const ZERO: Self = Self(0);

    /// Creates a generation from a raw counter value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the generation following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Returns the raw counter value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
