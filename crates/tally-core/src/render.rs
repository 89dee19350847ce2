//! Ordered rendering of a formula buffer
//!
//! [`Segments`] walks the text left to right, yielding plain text runs and
//! tag references in order. It is what a presentation layer needs to draw
//! the formula; it never mutates the buffer.

use crate::tag::Tag;

/// One run of the rendered formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment<'a> {
    /// Plain text starting at character offset `start`
    Text { start: usize, text: &'a str },
    /// A tag, covering `tag.span()`
    Tag(&'a Tag),
}

impl<'a> Segment<'a> {
    /// Character offset where this segment begins
    pub fn start(&self) -> usize {
        match self {
            Segment::Text { start, .. } => *start,
            Segment::Tag(tag) => tag.position,
        }
    }

    /// The text this segment covers
    pub fn as_str(&self) -> &'a str {
        match self {
            Segment::Text { text, .. } => text,
            Segment::Tag(tag) => &tag.name,
        }
    }
}

/// Iterator over the [`Segment`]s of a buffer
///
/// Created by [`FormulaBuffer::ordered_render`](crate::FormulaBuffer::ordered_render).
/// Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    tags: std::vec::IntoIter<&'a Tag>,
    next_tag: Option<&'a Tag>,
    /// Characters consumed so far
    offset: usize,
    /// Bytes consumed so far
    byte: usize,
}

impl<'a> Segments<'a> {
    /// `tags` must be sorted by ascending position
    pub(crate) fn new(text: &'a str, tags: Vec<&'a Tag>) -> Self {
        let mut tags = tags.into_iter();
        let next_tag = tags.next();
        Self {
            text,
            tags,
            next_tag,
            offset: 0,
            byte: 0,
        }
    }

    /// Advance over `chars` characters, returning the text skipped
    fn take_chars(&mut self, chars: usize) -> &'a str {
        let rest = &self.text[self.byte..];
        let bytes = rest
            .char_indices()
            .nth(chars)
            .map_or(rest.len(), |(i, _)| i);
        self.byte += bytes;
        self.offset += chars;
        &rest[..bytes]
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_tag {
            Some(tag) if tag.position > self.offset => {
                let start = self.offset;
                let text = self.take_chars(tag.position - start);
                Some(Segment::Text { start, text })
            }
            Some(tag) => {
                // Skip only the part of the span not already consumed
                let remaining = tag.end().saturating_sub(self.offset);
                self.take_chars(remaining);
                self.next_tag = self.tags.next();
                Some(Segment::Tag(tag))
            }
            None if self.byte < self.text.len() => {
                let start = self.offset;
                let text = &self.text[self.byte..];
                self.byte = self.text.len();
                self.offset += text.chars().count();
                Some(Segment::Text { start, text })
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{FormulaBuffer, Segment, Suggestion};
    use pretty_assertions::assert_eq;

    fn strings(buffer: &FormulaBuffer) -> Vec<String> {
        buffer
            .ordered_render()
            .map(|s| match s {
                Segment::Text { start, text } => format!("text@{start}:{text}"),
                Segment::Tag(tag) => format!("tag@{}:{}", tag.position, tag.name),
            })
            .collect()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(FormulaBuffer::new().ordered_render().count(), 0);
    }

    #[test]
    fn test_render_text_only() {
        let mut buffer = FormulaBuffer::new();
        buffer.insert_text(0, "1+2").unwrap();
        assert_eq!(strings(&buffer), vec!["text@0:1+2"]);
    }

    #[test]
    fn test_render_interleaves_in_position_order() {
        let mut buffer = FormulaBuffer::new();
        buffer.insert_text(0, "(+)*2").unwrap();
        buffer
            .insert_tag(Suggestion::new(2, "Expenses", 500.0), 2)
            .unwrap();
        buffer
            .insert_tag(Suggestion::new(1, "Revenue", 1000.0), 1)
            .unwrap();

        assert_eq!(buffer.text(), "(Revenue+Expenses)*2");
        assert_eq!(
            strings(&buffer),
            vec![
                "text@0:(",
                "tag@1:Revenue",
                "text@8:+",
                "tag@9:Expenses",
                "text@17:)*2",
            ]
        );
    }

    #[test]
    fn test_render_adjacent_tags() {
        let mut buffer = FormulaBuffer::new();
        buffer.insert_tag(Suggestion::new(1, "Größe", 1.0), 0).unwrap();
        buffer.insert_tag(Suggestion::new(2, "B", 2.0), 5).unwrap();
        assert_eq!(strings(&buffer), vec!["tag@0:Größe", "tag@5:B"]);
    }

    #[test]
    fn test_render_is_restartable() {
        let mut buffer = FormulaBuffer::new();
        buffer.insert_text(0, "2*").unwrap();
        buffer.insert_tag(Suggestion::new(1, "X", 1.0), 2).unwrap();

        let segments = buffer.ordered_render();
        let first: Vec<_> = segments.clone().collect();
        let second: Vec<_> = segments.collect();
        assert_eq!(first, second);

        let joined: String = buffer.ordered_render().map(|s| s.as_str()).collect();
        assert_eq!(joined, buffer.text());
    }
}
