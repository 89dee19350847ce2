//! Turning buffer text into plain arithmetic
//!
//! Before a formula reaches the parser, tags are replaced by their values
//! and the result is screened: parentheses must balance, a single dangling
//! operator is dropped, and only arithmetic characters may remain.

use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex_is_match;
use tally_core::Tag;

/// Operators that may dangle at the end of a formula being typed
const TRAILING_OPERATORS: [char; 5] = ['+', '-', '*', '/', '^'];

/// Replace every tag span in `text` with the decimal form of its value
///
/// Tags are processed right to left so earlier replacements never move the
/// offsets of the ones still to come. Spans reaching past the end of `text`
/// are clamped to it.
pub fn substitute_tags<'a, I>(text: &str, tags: I) -> String
where
    I: IntoIterator<Item = &'a Tag>,
{
    let mut tags: Vec<&Tag> = tags.into_iter().collect();
    tags.sort_by(|a, b| b.position.cmp(&a.position));

    let mut out = text.to_string();
    for tag in tags {
        let start = byte_offset(&out, tag.position);
        let end = byte_offset(&out, tag.end());
        out.replace_range(start..end, &tag.value.to_string());
    }
    out
}

/// Check that every `)` closes an earlier `(` and nothing is left open
pub fn check_parentheses(s: &str) -> FormulaResult<()> {
    let mut depth: usize = 0;
    for c in s.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(FormulaError::UnbalancedParentheses)?;
            }
            _ => {}
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(FormulaError::UnbalancedParentheses)
    }
}

/// Drop one operator if it is the very last character of `s`
///
/// ```rust
/// use tally_formula::strip_trailing_operator;
///
/// assert_eq!(strip_trailing_operator("3 +"), "3 ");
/// assert_eq!(strip_trailing_operator("3 ++"), "3 +");
/// assert_eq!(strip_trailing_operator("3 + "), "3 + ");
/// ```
pub fn strip_trailing_operator(s: &str) -> &str {
    s.strip_suffix(|c: char| TRAILING_OPERATORS.contains(&c))
        .unwrap_or(s)
}

/// Check that `s` consists only of digits, `+ - * / ( ) ^`, `.` and spaces
pub fn validate_characters(s: &str) -> FormulaResult<()> {
    if regex_is_match!(r"^[0-9+\-*/().^ ]+$", s) {
        return Ok(());
    }

    match s.chars().find(|c| !is_arithmetic(*c)) {
        Some(c) => Err(FormulaError::InvalidCharacters(c)),
        None => Err(FormulaError::malformed("empty expression")),
    }
}

fn is_arithmetic(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '*' | '/' | '(' | ')' | '^' | '.' | ' ')
}

/// Byte index of character offset `offset` in `s` (clamped to the end)
fn byte_offset(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_substitute_tags() {
        let tags = vec![
            Tag::new(1, "Revenue", 1000.0, 0),
            Tag::new(2, "GrowthRate", 0.1, 10),
        ];
        assert_eq!(substitute_tags("Revenue * GrowthRate", &tags), "1000 * 0.1");
    }

    #[test]
    fn test_substitute_order_independent() {
        let forward = vec![Tag::new(1, "A", 5.0, 0), Tag::new(2, "Bee", -2.5, 2)];
        let backward: Vec<Tag> = forward.iter().rev().cloned().collect();
        assert_eq!(substitute_tags("A+Bee", &forward), "5+-2.5");
        assert_eq!(substitute_tags("A+Bee", &backward), "5+-2.5");
    }

    #[test]
    fn test_substitute_multibyte() {
        let tags = vec![Tag::new(1, "Größe", 3.0, 2)];
        assert_eq!(substitute_tags("2*Größe", &tags), "2*3");
    }

    #[test]
    fn test_substitute_never_uses_exponent_notation() {
        let tags = vec![Tag::new(1, "Big", 1e21, 0), Tag::new(2, "Tiny", 1e-7, 4)];
        assert_eq!(
            substitute_tags("Big+Tiny", &tags),
            "1000000000000000000000+0.0000001"
        );
    }

    #[test]
    fn test_substitute_clamps_spans() {
        let tags = vec![Tag::new(1, "Revenue", 1.0, 2)];
        assert_eq!(substitute_tags("2*Rev", &tags), "2*1");
    }

    #[test]
    fn test_check_parentheses() {
        assert!(check_parentheses("(1+(2))").is_ok());
        assert!(check_parentheses("no parens").is_ok());
        assert_eq!(
            check_parentheses("(3 + 4"),
            Err(FormulaError::UnbalancedParentheses)
        );
        assert_eq!(
            check_parentheses(")("),
            Err(FormulaError::UnbalancedParentheses)
        );
        assert_eq!(
            check_parentheses("(1))+(2"),
            Err(FormulaError::UnbalancedParentheses)
        );
    }

    #[test]
    fn test_strip_trailing_operator() {
        assert_eq!(strip_trailing_operator("3^"), "3");
        assert_eq!(strip_trailing_operator("3*"), "3");
        assert_eq!(strip_trailing_operator("3)"), "3)");
        assert_eq!(strip_trailing_operator(""), "");
    }

    #[test]
    fn test_validate_characters() {
        assert!(validate_characters("(1.5 + 2) * 3 ^ 2 / 4 - 1").is_ok());
        assert_eq!(
            validate_characters("3 + x"),
            Err(FormulaError::InvalidCharacters('x'))
        );
        assert_eq!(
            validate_characters("1\t+2"),
            Err(FormulaError::InvalidCharacters('\t'))
        );
        assert!(matches!(
            validate_characters(""),
            Err(FormulaError::MalformedExpression(_))
        ));
    }
}
