//! Position-tracking traversal over raw command input.
//!
//! Every consuming operation skips the whitespace that follows what it
//! consumed, so `position` always sits on the next meaningful character (or
//! the end). Failed operations never move the cursor. Backtracking is done
//! by the caller through [`Cursor::position`] and [`Cursor::restore`].

use crate::error::FormatError;
use regex::Regex;

/// Cursor over a borrowed input string.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    content: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor, skipping any leading whitespace.
    pub fn new(content: &'a str) -> Self {
        let mut cursor = Self {
            content,
            position: 0,
        };
        cursor.skip_whitespace();
        cursor
    }

    pub fn content(&self) -> &'a str {
        self.content
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move back (or forward) to a position previously returned by [`Cursor::position`].
    pub fn restore(&mut self, position: usize) {
        debug_assert!(self.content.is_char_boundary(position));
        self.position = position.min(self.content.len());
    }

    /// Unread input, without consuming it.
    pub fn rest(&self) -> &'a str {
        &self.content[self.position..]
    }

    pub fn has_next(&self) -> bool {
        self.position < self.content.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Next whitespace-delimited word.
    pub fn next_word(&mut self) -> Result<&'a str, FormatError> {
        if !self.has_next() {
            return Err(self.exhausted("another word"));
        }
        let rest = self.rest();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.advance(end);
        Ok(&rest[..end])
    }

    /// Text up to `delimiter`. With `step_past` the delimiter is consumed too.
    pub fn next_until(&mut self, delimiter: char, step_past: bool) -> Result<&'a str, FormatError> {
        let rest = self.rest();
        let end = rest.find(delimiter).ok_or_else(|| {
            FormatError::new(format!("Missing the expected '{}'", delimiter), rest)
        })?;
        let consumed = if step_past {
            end + delimiter.len_utf8()
        } else {
            end
        };
        self.advance(consumed);
        Ok(rest[..end].trim_end())
    }

    /// Text matched by `pattern` at the very start of the unread input.
    pub fn next_matching(&mut self, pattern: &Regex) -> Result<&'a str, FormatError> {
        let end = self.match_start(pattern)?;
        let rest = self.rest();
        self.advance(end);
        Ok(&rest[..end])
    }

    /// Like [`Cursor::next_matching`], but the match must also end on a token
    /// boundary: the end of input, whitespace, `)` or `]`.
    pub fn next_matching_token(&mut self, pattern: &Regex) -> Result<&'a str, FormatError> {
        let end = self.match_start(pattern)?;
        let rest = self.rest();
        if !is_token_boundary(rest[end..].chars().next()) {
            return Err(self.mismatch());
        }
        self.advance(end);
        Ok(&rest[..end])
    }

    /// Content between a balanced `start`/`stop` pair. Nested pairs are
    /// included in the result. With `step_past` the closing `stop` is consumed,
    /// otherwise the cursor is left on it.
    pub fn next_surrounded(
        &mut self,
        start: char,
        stop: char,
        step_past: bool,
    ) -> Result<&'a str, FormatError> {
        let rest = self.rest();
        if !rest.starts_with(start) {
            return Err(FormatError::new(
                format!("Expected '{}'", start),
                self.fragment(),
            ));
        }

        let mut depth = 0usize;
        let mut end = None;
        for (index, c) in rest.char_indices() {
            if index == 0 {
                depth = 1;
            } else if c == stop {
                depth -= 1;
                if depth == 0 {
                    end = Some(index);
                    break;
                }
            } else if c == start {
                depth += 1;
            }
        }

        let end = end.ok_or_else(|| {
            FormatError::new(format!("Missing the ending '{}'", stop), rest)
        })?;
        let consumed = if step_past { end + stop.len_utf8() } else { end };
        self.advance(consumed);
        Ok(&rest[start.len_utf8()..end])
    }

    /// Whether the next character is `c`, consuming it when `step_past` is set.
    pub fn is_next(&mut self, c: char, step_past: bool) -> bool {
        if self.peek() != Some(c) {
            return false;
        }
        if step_past {
            self.advance(c.len_utf8());
        }
        true
    }

    /// Consume `c` or fail.
    pub fn assert_next(&mut self, c: char) -> Result<(), FormatError> {
        if self.is_next(c, true) {
            Ok(())
        } else {
            Err(FormatError::new(
                format!("Expected '{}'", c),
                self.fragment(),
            ))
        }
    }

    /// Consume `text` if the unread input starts with it as a whole word.
    pub fn next_literal(&mut self, text: &str, case_insensitive: bool) -> bool {
        let rest = self.rest();
        let Some(candidate) = rest.get(..text.len()) else {
            return false;
        };
        let matched = if case_insensitive {
            candidate.to_lowercase() == text.to_lowercase()
        } else {
            candidate == text
        };
        let boundary = rest[text.len()..]
            .chars()
            .next()
            .map_or(true, char::is_whitespace);

        if matched && boundary {
            self.advance(text.len());
            true
        } else {
            false
        }
    }

    /// Consume everything left. Fails when nothing is left.
    pub fn remaining(&mut self) -> Result<&'a str, FormatError> {
        if !self.has_next() {
            return Err(self.exhausted("more input"));
        }
        let rest = self.rest();
        self.position = self.content.len();
        Ok(rest.trim_end())
    }

    /// The next word, for error messages. Does not consume anything.
    pub fn fragment(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        &rest[..end]
    }

    fn match_start(&self, pattern: &Regex) -> Result<usize, FormatError> {
        match pattern.find(self.rest()) {
            Some(m) if m.start() == 0 && !m.is_empty() => Ok(m.end()),
            _ => Err(self.mismatch()),
        }
    }

    fn mismatch(&self) -> FormatError {
        if self.has_next() {
            let fragment = self.fragment();
            FormatError::new(
                format!("'{}' doesn't match the expected format", fragment),
                fragment,
            )
        } else {
            self.exhausted("another token")
        }
    }

    fn exhausted(&self, what: &str) -> FormatError {
        FormatError::new(format!("Expected {} but reached the end", what), "")
    }

    fn advance(&mut self, len: usize) {
        self.position += len;
        self.skip_whitespace();
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }
}

fn is_token_boundary(next: Option<char>) -> bool {
    match next {
        None => true,
        Some(c) => c.is_whitespace() || c == ')' || c == ']',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn integer() -> Regex {
        Regex::new(r"^[-+]?\d+").unwrap()
    }

    #[test]
    fn test_next_word_skips_whitespace() {
        let mut cursor = Cursor::new("  hello   world ");
        assert_eq!(cursor.next_word().unwrap(), "hello");
        assert_eq!(cursor.next_word().unwrap(), "world");
        assert!(!cursor.has_next());
        assert!(cursor.next_word().is_err());
    }

    #[test]
    fn test_next_until() {
        let mut cursor = Cursor::new("Vector3(1 2 3)");
        assert_eq!(cursor.next_until('(', true).unwrap(), "Vector3");
        assert_eq!(cursor.rest(), "1 2 3)");

        let mut cursor = Cursor::new("abc");
        assert!(cursor.next_until('(', false).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_next_matching_is_anchored() {
        let mut cursor = Cursor::new("a 12");
        assert!(cursor.next_matching(&integer()).is_err());
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new("12abc");
        assert_eq!(cursor.next_matching(&integer()).unwrap(), "12");
        assert_eq!(cursor.rest(), "abc");
    }

    #[test]
    fn test_next_matching_token_requires_boundary() {
        let mut cursor = Cursor::new("12abc");
        assert!(cursor.next_matching_token(&integer()).is_err());
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new("3] 4");
        assert_eq!(cursor.next_matching_token(&integer()).unwrap(), "3");
        assert_eq!(cursor.rest(), "] 4");
    }

    #[test]
    fn test_next_surrounded_is_nesting_aware() {
        let mut cursor = Cursor::new("[a [b c] d] tail");
        assert_eq!(cursor.next_surrounded('[', ']', true).unwrap(), "a [b c] d");
        assert_eq!(cursor.rest(), "tail");

        let mut cursor = Cursor::new("\"quoted text\" next");
        assert_eq!(cursor.next_surrounded('"', '"', true).unwrap(), "quoted text");
        assert_eq!(cursor.rest(), "next");
    }

    #[test]
    fn test_next_surrounded_unbalanced() {
        let mut cursor = Cursor::new("[1 2 3");
        let err = cursor.next_surrounded('[', ']', true).unwrap_err();
        assert!(err.message.contains("Missing the ending"));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_is_next_and_assert_next() {
        let mut cursor = Cursor::new("( x");
        assert!(cursor.is_next('(', false));
        assert_eq!(cursor.position(), 0);
        assert!(cursor.is_next('(', true));
        assert_eq!(cursor.rest(), "x");
        assert!(cursor.assert_next(')').is_err());
    }

    #[test]
    fn test_next_literal() {
        let mut cursor = Cursor::new("TO the moon");
        assert!(!cursor.next_literal("to", false));
        assert!(cursor.next_literal("to the", true));
        assert_eq!(cursor.rest(), "moon");
        assert!(!cursor.next_literal("moo", true));
    }

    #[test]
    fn test_remaining_fails_when_empty() {
        let mut cursor = Cursor::new("all of this  ");
        assert_eq!(cursor.remaining().unwrap(), "all of this");
        assert!(cursor.remaining().is_err());
    }

    proptest! {
        #[test]
        fn prop_restore_is_position_exact(input in "[a-z0-9 \\[\\]()]{0,40}", steps in 0usize..6) {
            let mut cursor = Cursor::new(&input);
            let saved = cursor.position();
            let before = cursor.rest().to_string();
            for _ in 0..steps {
                let _ = cursor.next_word();
            }
            cursor.restore(saved);
            prop_assert_eq!(cursor.rest(), before.as_str());
        }

        #[test]
        fn prop_position_never_exceeds_content(input in "\\PC{0,40}") {
            let mut cursor = Cursor::new(&input);
            while cursor.next_word().is_ok() {}
            let _ = cursor.next_surrounded('[', ']', true);
            let _ = cursor.remaining();
            prop_assert!(cursor.position() <= input.len());
        }
    }
}
