//! Formula buffer
//!
//! [`FormulaBuffer`] owns the formula text, the tags anchored in it and the
//! cursor. Every edit keeps tag positions aligned with the text:
//!
//! - each tag's span `[position, position + len(name))` lies inside the text
//! - the text under each span equals the tag's name
//! - spans never overlap, ids are unique
//! - `0 <= cursor <= len(text)`
//!
//! Operations validate their arguments before touching anything, so an
//! `Err` always leaves the buffer as it was.

use crate::error::{Error, InvariantViolation, Result};
use crate::render::Segments;
use crate::tag::{Suggestion, Tag, TagId};
use ahash::AHashMap;
use std::fmt;

type TagTable = AHashMap<TagId, Tag>;

/// Formula text with embedded, position-consistent tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormulaBuffer {
    text: String,
    /// Length of `text` in characters
    len: usize,
    tags: TagTable,
    cursor: usize,
    active_tag: Option<TagId>,
}

impl FormulaBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    // === Accessors ===

    /// The full formula text, tag names included
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in characters
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the text is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current cursor offset
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// All tags, in no particular order
    pub fn tags(&self) -> impl Iterator<Item = &Tag> + '_ {
        self.tags.values()
    }

    /// Number of tags
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Look up a tag by id
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    /// All tags sorted by ascending position
    pub fn sorted_tags(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.values().collect();
        tags.sort_by_key(|t| t.position);
        tags
    }

    /// The tag currently opened for inspection, if any
    pub fn active_tag(&self) -> Option<&Tag> {
        self.active_tag.and_then(|id| self.tags.get(&id))
    }

    /// The character just left of the cursor
    pub fn char_before_cursor(&self) -> Option<char> {
        if self.cursor == 0 {
            return None;
        }
        self.text.chars().nth(self.cursor - 1)
    }

    // === Edits ===

    /// Insert `s` at character offset `at`
    ///
    /// Tags at or after `at` move right by the length of `s`. The cursor is
    /// left where it is.
    ///
    /// Callers must not insert strictly inside a tag span: such a tag keeps
    /// its position and its span no longer matches its name.
    pub fn insert_text(&mut self, at: usize, s: &str) -> Result<()> {
        self.check_offset(at)?;
        if s.is_empty() {
            return Ok(());
        }

        if let Some(tag) = self.tags.values().find(|t| t.splits_at(at)) {
            tracing::warn!(at, tag = %tag.id, "text inserted inside a tag span");
        }

        let inserted = self.splice_in(at, s);
        tracing::debug!(at, inserted, "inserted text");
        Ok(())
    }

    /// Remove the characters in `[from, to)`
    ///
    /// Tags at or after `to` move left by `to - from`. Tags lying wholly
    /// inside the range are deleted along with their text; a range that cuts
    /// through part of a tag is rejected. A cursor past the new end is
    /// pulled back to it.
    pub fn delete_range(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_offset(to)?;
        if from > to {
            return Err(Error::OutOfRange {
                offset: from,
                max: to,
            });
        }
        if from == to {
            return Ok(());
        }

        if let Some(tag) = self
            .tags
            .values()
            .find(|t| t.overlaps(from, to) && !t.within(from, to))
        {
            let offset = if tag.splits_at(from) { from } else { to };
            return Err(Error::SplitsTag {
                offset,
                id: tag.id,
            });
        }

        let swallowed: Vec<TagId> = self
            .tags
            .values()
            .filter(|t| t.within(from, to))
            .map(|t| t.id)
            .collect();
        for id in &swallowed {
            self.tags.remove(id);
            if self.active_tag == Some(*id) {
                self.active_tag = None;
            }
        }

        self.splice_out(from, to);
        self.cursor = self.cursor.min(self.len);

        tracing::debug!(from, to, dropped_tags = swallowed.len(), "deleted range");
        Ok(())
    }

    /// Insert a tag for `suggestion` at character offset `at`
    ///
    /// The name is inserted as text (shifting later tags as
    /// [`insert_text`](Self::insert_text) does), the tag is recorded at `at`
    /// and the cursor moves to the end of the new span.
    pub fn insert_tag(&mut self, suggestion: Suggestion, at: usize) -> Result<&Tag> {
        self.check_offset(at)?;
        if suggestion.name.is_empty() {
            return Err(Error::EmptyTagName);
        }
        if self.tags.contains_key(&suggestion.id) {
            return Err(Error::DuplicateId(suggestion.id));
        }
        if let Some(tag) = self.tags.values().find(|t| t.splits_at(at)) {
            return Err(Error::SplitsTag {
                offset: at,
                id: tag.id,
            });
        }

        let width = self.splice_in(at, &suggestion.name);
        self.cursor = at + width;

        let tag = suggestion.at(at);
        tracing::debug!(id = %tag.id, name = %tag.name, at, "inserted tag");
        Ok(self.tags.entry(tag.id).or_insert(tag))
    }

    /// Remove the tag `id` together with the text of its span
    ///
    /// Later tags move left by the span length and the cursor is placed
    /// where the tag started. Returns the removed tag.
    pub fn remove_tag_with_span(&mut self, id: TagId) -> Result<Tag> {
        let tag = self.tags.remove(&id).ok_or(Error::NotFound(id))?;

        self.splice_out(tag.position, tag.end());
        self.cursor = tag.position;
        if self.active_tag == Some(id) {
            self.active_tag = None;
        }

        tracing::debug!(%id, name = %tag.name, at = tag.position, "removed tag");
        Ok(tag)
    }

    /// Move the cursor to `offset`
    pub fn set_cursor(&mut self, offset: usize) -> Result<()> {
        self.check_offset(offset)?;
        self.cursor = offset;
        Ok(())
    }

    /// Move the cursor past the last character
    pub fn cursor_to_end(&mut self) {
        self.cursor = self.len;
    }

    /// The tag whose span ends exactly at the cursor
    ///
    /// Should several qualify, the one starting furthest right wins.
    pub fn tag_immediately_before_cursor(&self) -> Option<&Tag> {
        self.tags
            .values()
            .filter(|t| t.end() == self.cursor)
            .max_by_key(|t| t.position)
    }

    /// Open `id` for inspection, or close the inspector with `None`
    pub fn set_active_tag(&mut self, id: Option<TagId>) -> Result<()> {
        if let Some(id) = id {
            if !self.tags.contains_key(&id) {
                return Err(Error::NotFound(id));
            }
        }
        self.active_tag = id;
        Ok(())
    }

    /// Open `id` if it is closed, close it if it is open
    ///
    /// Returns the id that is active afterwards.
    pub fn toggle_active_tag(&mut self, id: TagId) -> Result<Option<TagId>> {
        let next = if self.active_tag == Some(id) {
            None
        } else {
            Some(id)
        };
        self.set_active_tag(next)?;
        Ok(self.active_tag)
    }

    /// Reset to an empty buffer
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Iterate over the buffer as alternating text runs and tags, left to right
    ///
    /// The iterator borrows the buffer; clone it (or call this again) to
    /// start over.
    pub fn ordered_render(&self) -> Segments<'_> {
        Segments::new(&self.text, self.sorted_tags())
    }

    /// Verify every buffer invariant, returning the first one that fails
    pub fn check_invariants(&self) -> std::result::Result<(), InvariantViolation> {
        if self.cursor > self.len {
            return Err(InvariantViolation::CursorOutOfBounds {
                cursor: self.cursor,
                len: self.len,
            });
        }

        for (key, tag) in &self.tags {
            if *key != tag.id {
                return Err(InvariantViolation::KeyMismatch {
                    key: *key,
                    found: tag.id,
                });
            }
            if tag.end() > self.len {
                return Err(InvariantViolation::SpanOutOfBounds {
                    id: tag.id,
                    start: tag.position,
                    end: tag.end(),
                    len: self.len,
                });
            }
            let found: String = self
                .text
                .chars()
                .skip(tag.position)
                .take(tag.len())
                .collect();
            if found != tag.name {
                return Err(InvariantViolation::Drift {
                    id: tag.id,
                    expected: tag.name.clone(),
                    found,
                });
            }
        }

        let sorted = self.sorted_tags();
        for pair in sorted.windows(2) {
            if pair[1].position < pair[0].end() {
                return Err(InvariantViolation::Overlap {
                    first: pair[0].id,
                    second: pair[1].id,
                });
            }
        }

        if let Some(id) = self.active_tag {
            if !self.tags.contains_key(&id) {
                return Err(InvariantViolation::DanglingActiveTag(id));
            }
        }

        Ok(())
    }

    // === Helpers ===

    fn check_offset(&self, offset: usize) -> Result<()> {
        if offset > self.len {
            return Err(Error::OutOfRange {
                offset,
                max: self.len,
            });
        }
        Ok(())
    }

    /// Byte index of character offset `offset` (clamped to the end)
    fn byte_offset(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Insert `s` at `at` and shift tags at or after `at`. Returns the
    /// number of characters inserted.
    fn splice_in(&mut self, at: usize, s: &str) -> usize {
        let width = s.chars().count();
        let byte = self.byte_offset(at);
        self.text.insert_str(byte, s);
        self.len += width;

        for tag in self.tags.values_mut() {
            if tag.position >= at {
                tag.position += width;
            }
        }
        width
    }

    /// Remove `[from, to)` and shift tags at or after `to`
    fn splice_out(&mut self, from: usize, to: usize) {
        let width = to - from;
        let start = self.byte_offset(from);
        let end = self.byte_offset(to);
        self.text.replace_range(start..end, "");
        self.len -= width;

        for tag in self.tags.values_mut() {
            if tag.position >= to {
                tag.position -= width;
            }
        }
    }
}

impl fmt::Display for FormulaBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
