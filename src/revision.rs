//! # Revision tokens and the revision allocator.
//!
//! A [`Revision`] is the opaque version token handed to long-poll callers.
//! On the wire it is the decimal ASCII rendering of a u64; callers treat it
//! as opaque and hand it back unchanged. [`Revision::decode`] surfaces
//! malformed tokens as [`OrchestratorError::BadRevision`].
//!
//! [`RevisionAllocator`] mints strictly increasing revision numbers shared
//! by the task list and every task's own `rev`. Callers hold the registry
//! mutex while allocating, so the allocator itself carries no synchronization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// Opaque monotonic version token identifying the state of a long-pollable
/// resource.
///
/// Registry revisions always decode to a u64; topology revisions are the
/// upstream source's token passed through verbatim and are never decoded
/// by this crate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Encodes a revision number as its decimal ASCII token.
    pub fn encode(num: u64) -> Self {
        Self(num.to_string())
    }

    /// Wraps an upstream token without interpreting it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Decodes the token back to a revision number.
    ///
    /// # Errors
    /// Returns [`OrchestratorError::BadRevision`] when the token is not a
    /// plain decimal u64 (`"0x2a"`, `""`, `"-1"`, ...).
    pub fn decode(&self) -> Result<u64, OrchestratorError> {
        self.0
            .parse::<u64>()
            .map_err(|_| OrchestratorError::BadRevision {
                rev: self.0.clone(),
            })
    }

    /// The raw token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is empty. Empty tokens mean "no revision" wherever
    /// the protocol allows omitting one.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints strictly increasing revision numbers within a process lifetime.
///
/// `alloc(prev)` returns a value strictly greater than both `prev` and any
/// previously returned value, then advances past it.
#[derive(Debug)]
pub(crate) struct RevisionAllocator {
    next: u64,
}

impl RevisionAllocator {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns `max(prev + 1, next)` and advances `next` past it.
    pub(crate) fn alloc(&mut self, prev: u64) -> u64 {
        let rv = (prev + 1).max(self.next);
        self.next = rv + 1;
        rv
    }
}

#[cfg(test)]
mod tests {
    use super::{Revision, RevisionAllocator};
    use crate::error::OrchestratorError;

    #[test]
    fn encode_decode_round_trip() {
        for n in [0u64, 1, 42, 1_000_000, u64::MAX] {
            assert_eq!(Revision::encode(n).decode().unwrap(), n);
        }
    }

    #[test]
    fn encode_is_decimal_ascii() {
        assert_eq!(Revision::encode(42).as_str(), "42");
        assert_eq!(Revision::from_raw("42").decode().unwrap(), 42);
    }

    #[test]
    fn decode_rejects_malformed_tokens() {
        for raw in ["0x2a", "", "forty-two", "-1", "1.5"] {
            let err = Revision::from_raw(raw).decode().unwrap_err();
            assert!(matches!(err, OrchestratorError::BadRevision { .. }), "{raw}");
        }
    }

    #[test]
    fn alloc_is_strictly_increasing() {
        let mut alloc = RevisionAllocator::new();
        let mut prev = 0;
        for _ in 0..100 {
            let rv = alloc.alloc(0);
            assert!(rv > prev);
            prev = rv;
        }
    }

    #[test]
    fn alloc_exceeds_caller_supplied_prev() {
        let mut alloc = RevisionAllocator::new();
        let rv = alloc.alloc(40);
        assert_eq!(rv, 41);
        // Later allocations never fall back below what was handed out.
        let rv2 = alloc.alloc(0);
        assert_eq!(rv2, 42);
    }
}
