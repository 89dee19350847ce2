//! Tag types
//!
//! A tag is a named variable embedded in the formula text. Its name is
//! inserted into the text verbatim, and its value is snapshotted when the
//! tag is created.

use std::fmt;
use std::ops::Range;

/// Unique tag identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagId(pub u64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for TagId {
    fn from(id: u64) -> Self {
        TagId(id)
    }
}

/// A candidate variable, as offered by a suggestion source
///
/// This is a [`Tag`] without a position. Choosing a suggestion places it in
/// the buffer with [`FormulaBuffer::insert_tag`](crate::FormulaBuffer::insert_tag).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Suggestion {
    pub id: TagId,
    pub name: String,
    pub value: f64,
}

impl Suggestion {
    /// Create a new suggestion
    pub fn new(id: impl Into<TagId>, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            value,
        }
    }

    /// Place this suggestion at `position`
    pub fn at(self, position: usize) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            value: self.value,
            position,
        }
    }
}

/// A variable placed in the formula text
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tag {
    /// Stable identifier
    pub id: TagId,
    /// Text occupying the tag's span
    pub name: String,
    /// Value captured at insertion
    pub value: f64,
    /// Character offset where the name begins
    pub position: usize,
}

impl Tag {
    /// Create a new tag
    pub fn new(id: impl Into<TagId>, name: impl Into<String>, value: f64, position: usize) -> Self {
        Suggestion::new(id, name, value).at(position)
    }

    /// Length of the span in characters
    pub fn len(&self) -> usize {
        self.name.chars().count()
    }

    /// Whether the name is empty
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Offset one past the last character of the span
    pub fn end(&self) -> usize {
        self.position + self.len()
    }

    /// The character range `[position, end)`
    pub fn span(&self) -> Range<usize> {
        self.position..self.end()
    }

    /// Whether `offset` lies strictly between the first and last character,
    /// i.e. an insertion there would split the name
    pub fn splits_at(&self, offset: usize) -> bool {
        self.position < offset && offset < self.end()
    }

    /// Whether the span shares at least one character with `[from, to)`
    pub fn overlaps(&self, from: usize, to: usize) -> bool {
        self.position < to && from < self.end()
    }

    /// Whether the span lies entirely within `[from, to)`
    pub fn within(&self, from: usize, to: usize) -> bool {
        from <= self.position && self.end() <= to
    }

    /// The suggestion this tag was created from
    pub fn to_suggestion(&self) -> Suggestion {
        Suggestion::new(self.id, self.name.clone(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_uses_characters() {
        let tag = Tag::new(1, "Größe", 2.0, 3);
        assert_eq!(tag.len(), 5);
        assert_eq!(tag.span(), 3..8);
    }

    #[test]
    fn test_splits_at() {
        let tag = Tag::new(1, "abc", 0.0, 2);
        assert!(!tag.splits_at(2));
        assert!(tag.splits_at(3));
        assert!(tag.splits_at(4));
        assert!(!tag.splits_at(5));
    }

    #[test]
    fn test_overlaps_and_within() {
        let tag = Tag::new(1, "abc", 0.0, 2);
        assert!(tag.overlaps(0, 3));
        assert!(!tag.overlaps(0, 2));
        assert!(!tag.overlaps(5, 7));
        assert!(tag.within(2, 5));
        assert!(tag.within(0, 9));
        assert!(!tag.within(3, 9));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(TagId(7).to_string(), "#7");
    }
}
