//! # tally-core
//!
//! Core data structures for tally formulas.
//!
//! This crate provides the text model the rest of tally builds on:
//! - [`FormulaBuffer`] - The formula text, its embedded tags and the cursor
//! - [`Tag`] and [`Suggestion`] - Named variables placed in the text
//! - [`Segment`] - Ordered text/tag runs for rendering
//!
//! All offsets are character offsets into the formula text.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::{FormulaBuffer, Suggestion, TagId};
//!
//! let mut buffer = FormulaBuffer::new();
//! buffer.insert_tag(Suggestion::new(1, "Revenue", 1000.0), 0).unwrap();
//! buffer.insert_text(buffer.cursor(), " - ").unwrap();
//! buffer.set_cursor(buffer.len()).unwrap();
//! buffer.insert_tag(Suggestion::new(2, "Expenses", 500.0), buffer.cursor()).unwrap();
//!
//! assert_eq!(buffer.text(), "Revenue - Expenses");
//! assert_eq!(buffer.tag(TagId(2)).unwrap().position, 10);
//! ```

pub mod buffer;
pub mod error;
pub mod render;
pub mod tag;

// Re-exports for convenience
pub use buffer::FormulaBuffer;
pub use error::{Error, InvariantViolation, Result};
pub use render::{Segment, Segments};
pub use tag::{Suggestion, Tag, TagId};

/// Single-character operators recognized by the editing policy
pub const OPERATORS: [char; 7] = ['+', '-', '*', '/', '(', ')', '^'];

/// Check whether `c` is one of the recognized [`OPERATORS`]
pub fn is_operator(c: char) -> bool {
    OPERATORS.contains(&c)
}
