//! Error types for tally-core

use crate::tag::TagId;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`FormulaBuffer`](crate::FormulaBuffer) operations
///
/// These are caller-contract violations. The buffer is never partially
/// modified when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Offset outside `0..=max`
    ///
    /// `max` is the text length, or for the start of a reversed range, its end.
    #[error("Offset {offset} out of range (0..={max})")]
    OutOfRange { offset: usize, max: usize },

    /// Tag id already present in the buffer
    #[error("Tag id already in use: {0}")]
    DuplicateId(TagId),

    /// No tag with this id
    #[error("Tag not found: {0}")]
    NotFound(TagId),

    /// Edit would cut through the span of an existing tag
    #[error("Offset {offset} falls inside tag {id}")]
    SplitsTag { offset: usize, id: TagId },

    /// Tags need at least one character of text
    #[error("Tag name must not be empty")]
    EmptyTagName,
}

impl Error {
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Error::OutOfRange { .. })
    }
}

/// A broken buffer invariant, as reported by
/// [`FormulaBuffer::check_invariants`](crate::FormulaBuffer::check_invariants)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Tag {id} span {start}..{end} exceeds text length {len}")]
    SpanOutOfBounds {
        id: TagId,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Tag {id} drifted from its text: expected {expected:?}, found {found:?}")]
    Drift {
        id: TagId,
        expected: String,
        found: String,
    },

    #[error("Tags {first} and {second} overlap")]
    Overlap { first: TagId, second: TagId },

    #[error("Tag {found} stored under id {key}")]
    KeyMismatch { key: TagId, found: TagId },

    #[error("Cursor {cursor} beyond text length {len}")]
    CursorOutOfBounds { cursor: usize, len: usize },

    #[error("Active tag {0} is not in the buffer")]
    DanglingActiveTag(TagId),
}
