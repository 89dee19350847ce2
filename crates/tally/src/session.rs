//! Editing session
//!
//! A [`Session`] applies keystrokes to a [`FormulaBuffer`] the way a
//! formula input field does:
//!
//! - digits and operators go straight into the formula at the cursor
//! - other characters accumulate in a pending search input that drives
//!   suggestions; choosing one inserts it as a tag
//! - Backspace on an empty search input removes a whole tag when one ends
//!   at the cursor, and removes single operators or digits otherwise
//! - the arrow keys step over tags as a unit, so the cursor never rests
//!   inside a tag span

use crate::outcome::Outcome;
use crate::suggest::SuggestionSource;
use crate::{
    is_operator, Error, EvaluationOptions, FormulaBuffer, Result, Suggestion, Tag, TagId,
};

/// Options for an editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum number of suggestions offered at once (default: 10)
    pub max_suggestions: usize,
    /// Options used by [`Session::evaluate`]
    pub evaluation: EvaluationOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_suggestions: 10,
            evaluation: EvaluationOptions::default(),
        }
    }
}

/// A classified keystroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `0`-`9`
    Digit(char),
    /// One of `+ - * / ( ) ^`
    Operator(char),
    /// Any other printable character, fed to the search input
    Char(char),
    Backspace,
    Left,
    Right,
    Enter,
    Escape,
}

impl Key {
    /// Classify a typed character
    pub fn from_char(c: char) -> Self {
        if c.is_ascii_digit() {
            Key::Digit(c)
        } else if is_operator(c) {
            Key::Operator(c)
        } else {
            Key::Char(c)
        }
    }
}

/// Formula buffer plus the input state around it
#[derive(Debug, Clone)]
pub struct Session<S> {
    buffer: FormulaBuffer,
    source: S,
    input: String,
    show_suggestions: bool,
    options: SessionOptions,
}

impl<S: SuggestionSource> Session<S> {
    /// Create a session drawing suggestions from `source`
    pub fn new(source: S) -> Self {
        Self::with_options(source, SessionOptions::default())
    }

    /// Create a session with explicit options
    pub fn with_options(source: S, options: SessionOptions) -> Self {
        Self {
            buffer: FormulaBuffer::new(),
            source,
            input: String::new(),
            show_suggestions: false,
            options,
        }
    }

    pub fn buffer(&self) -> &FormulaBuffer {
        &self.buffer
    }

    /// Direct access to the buffer primitives
    pub fn buffer_mut(&mut self) -> &mut FormulaBuffer {
        &mut self.buffer
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// The pending search input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Whether the suggestion list is open
    pub fn suggestions_visible(&self) -> bool {
        self.show_suggestions
    }

    /// Suggestions for the pending input, capped at `max_suggestions`
    pub fn suggestions(&self) -> Vec<Suggestion> {
        if !self.show_suggestions || self.input.trim().is_empty() {
            return Vec::new();
        }
        let mut found = self.source.suggest(&self.input);
        found.truncate(self.options.max_suggestions);
        found
    }

    /// Apply one keystroke
    ///
    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: Key) -> Result<bool> {
        match key {
            Key::Backspace => self.backspace(),
            Key::Operator(c) => {
                self.type_into_formula(c)?;
                self.input.clear();
                self.show_suggestions = true;
                Ok(true)
            }
            Key::Digit(c) => {
                self.type_into_formula(c)?;
                Ok(true)
            }
            Key::Char(c) => {
                self.input.push(c);
                self.refresh_suggestions();
                Ok(true)
            }
            Key::Left => Ok(self.move_left()),
            Key::Right => Ok(self.move_right()),
            Key::Enter => {
                let first = self.suggestions().into_iter().next();
                match first {
                    Some(suggestion) => {
                        self.select(suggestion)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            Key::Escape => {
                let was_open = self.show_suggestions;
                self.show_suggestions = false;
                Ok(was_open)
            }
        }
    }

    /// Insert `suggestion` as a tag at the cursor
    ///
    /// A variable that is already in the formula gets a fresh tag id, so
    /// the same variable can appear more than once.
    pub fn select(&mut self, mut suggestion: Suggestion) -> Result<&Tag> {
        if self.buffer.tag(suggestion.id).is_some() {
            let fresh = self
                .unused_tag_id(suggestion.id)
                .ok_or(Error::DuplicateId(suggestion.id))?;
            tracing::debug!(from = %suggestion.id, to = %fresh, "reassigned repeated tag id");
            suggestion.id = fresh;
        }

        self.input.clear();
        self.show_suggestions = false;
        let at = self.buffer.cursor();
        self.buffer.insert_tag(suggestion, at)
    }

    /// Input field gained focus: a cursor parked at the start of a
    /// non-empty formula jumps to the end
    pub fn focus(&mut self) {
        if self.buffer.cursor() == 0 && !self.buffer.is_empty() {
            self.move_to_end();
        }
    }

    /// Click on empty space after the formula
    pub fn click_end(&mut self) {
        self.move_to_end();
    }

    /// Click at `offset` in the rendered text; clicks inside a tag land
    /// after it
    pub fn click_text(&mut self, offset: usize) -> Result<()> {
        let target = self
            .buffer
            .tags()
            .find(|t| t.splits_at(offset))
            .map_or(offset, |t| t.end());
        self.buffer.set_cursor(target)
    }

    /// Open or close the inspector for tag `id`
    pub fn toggle_tag(&mut self, id: TagId) -> Result<Option<TagId>> {
        self.buffer.toggle_active_tag(id)
    }

    /// Remove the tag open in the inspector, if any
    pub fn remove_active_tag(&mut self) -> Result<Option<Tag>> {
        match self.buffer.active_tag().map(|t| t.id) {
            Some(id) => self.buffer.remove_tag_with_span(id).map(Some),
            None => Ok(None),
        }
    }

    /// Evaluate the current formula for display
    pub fn evaluate(&self) -> Outcome {
        let outcome: Outcome = tally_formula::evaluate_with_options(
            self.buffer.text(),
            self.buffer.tags(),
            &self.options.evaluation,
        )
        .into();
        tracing::debug!(formula = self.buffer.text(), %outcome, "evaluated session");
        outcome
    }

    /// Start over with an empty formula
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.input.clear();
        self.show_suggestions = false;
    }

    // === Helpers ===

    fn type_into_formula(&mut self, c: char) -> Result<()> {
        let at = self.buffer.cursor();
        let mut encoded = [0; 4];
        self.buffer.insert_text(at, c.encode_utf8(&mut encoded))?;
        self.buffer.set_cursor(at + 1)
    }

    fn backspace(&mut self) -> Result<bool> {
        if self.input.is_empty() {
            if let Some(id) = self.buffer.tag_immediately_before_cursor().map(|t| t.id) {
                self.buffer.remove_tag_with_span(id)?;
                return Ok(true);
            }
        }

        let previous = self.buffer.char_before_cursor();
        if previous.map_or(false, is_operator) {
            self.delete_before_cursor()?;
            return Ok(true);
        }

        if self.input.pop().is_some() {
            self.refresh_suggestions();
            return Ok(true);
        }

        if previous.map_or(false, |c| c.is_ascii_digit() || c == '.') {
            self.delete_before_cursor()?;
            return Ok(true);
        }

        Ok(false)
    }

    fn delete_before_cursor(&mut self) -> Result<()> {
        let cursor = self.buffer.cursor();
        self.buffer.delete_range(cursor - 1, cursor)?;
        self.buffer.set_cursor(cursor - 1)
    }

    fn move_left(&mut self) -> bool {
        let cursor = self.buffer.cursor();
        if cursor == 0 {
            return false;
        }
        let target = self
            .buffer
            .tag_immediately_before_cursor()
            .map_or(cursor - 1, |t| t.position);
        self.buffer.set_cursor(target).is_ok()
    }

    fn move_right(&mut self) -> bool {
        let cursor = self.buffer.cursor();
        if cursor == self.buffer.len() {
            return false;
        }
        let target = self
            .buffer
            .tags()
            .find(|t| t.position == cursor)
            .map_or(cursor + 1, |t| t.end());
        self.buffer.set_cursor(target).is_ok()
    }

    fn move_to_end(&mut self) {
        self.buffer.cursor_to_end();
    }

    /// One past the largest id in use, or the smallest free id once the
    /// id space is exhausted at the top
    fn unused_tag_id(&self, taken: TagId) -> Option<TagId> {
        let max = self
            .buffer
            .tags()
            .map(|t| t.id.0)
            .fold(taken.0, u64::max);
        max.checked_add(1)
            .or_else(|| (0..u64::MAX).find(|&id| self.buffer.tag(TagId(id)).is_none()))
            .map(TagId)
    }

    fn refresh_suggestions(&mut self) {
        self.show_suggestions = !self.input.trim().is_empty();
    }
}
