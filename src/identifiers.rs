//! Type-safe identifiers for request correlation.
//!
//! Request ids are drawn from a monotonically-advancing [`IdSequence`]
//! owned by the dispatcher that issues them. Uniqueness is only required
//! within one SDK instance's lifetime; ids are never persisted.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Unique identifier correlating one request to its responses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(u64);

impl RequestId {
    /// Creates a request id from a raw value.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

// ============================================================================
// IdSequence
// ============================================================================

/// Monotonically-advancing source of request ids.
///
/// Each dispatcher owns one sequence, so ids are unique per SDK instance
/// without any process-global state. The starting value is injectable,
/// which is mainly useful for deterministic tests.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// Creates a sequence starting at 1.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a sequence whose first issued id is `first`.
    #[inline]
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Issues the next id.
    #[inline]
    pub fn next(&self) -> RequestId {
        RequestId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let sequence = IdSequence::new();
        let first = sequence.next();
        let second = sequence.next();
        let third = sequence.next();

        assert!(first < second);
        assert!(second < third);
    }

    #[test]
    fn test_sequence_starting_at() {
        let sequence = IdSequence::starting_at(999);
        assert_eq!(sequence.next(), RequestId::new(999));
        assert_eq!(sequence.next(), RequestId::new(1000));
    }

    #[test]
    fn test_display() {
        assert_eq!(RequestId::new(42).to_string(), "42");
    }

    #[test]
    fn test_serde_as_plain_number() {
        let id = RequestId::new(7);
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "7");

        let parsed: RequestId = serde_json::from_str("7").expect("parse");
        assert_eq!(parsed, id);
    }
}
