//! Regex-driven tokeniser over a borrowed text buffer.
//!
//! The cursor only moves forward. Every match attempt first skips leading
//! whitespace, then requires the pattern to match exactly at the cursor. A
//! failed match is an ordinary `None`/`false`; deciding whether that is an
//! error is left to the parser.

#[cfg(test)]
#[path = "tokeniser_test.rs"]
mod tokeniser_test;

use regex::Regex;

/// Cursor over an input string, matched piecewise against regex patterns.
#[derive(Debug, Clone)]
pub struct Tokeniser<'a> {
    input: &'a str,
    cursor: usize,
}

impl<'a> Tokeniser<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self { input, cursor: 0 }
    }

    /// Whether unconsumed characters remain (whitespace included).
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.cursor < self.input.len()
    }

    /// Byte offset of the cursor into the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// The unconsumed tail of the input.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.cursor..]
    }

    /// Advance past any run of whitespace at the cursor.
    pub fn skip_whitespace(&mut self) {
        self.cursor = self.whitespace_end();
    }

    /// Skip whitespace, then consume `pattern` if it matches at the cursor,
    /// returning the whole match.
    pub fn next(&mut self, pattern: &Regex) -> Option<&'a str> {
        self.next_group(pattern, 0)
    }

    /// Like [`Tokeniser::next`], but returns capture group `group`. Falls back
    /// to the whole match when that group did not participate.
    ///
    /// On failure the cursor is left where it was.
    pub fn next_group(&mut self, pattern: &Regex, group: usize) -> Option<&'a str> {
        let (value, end) = self.match_at_cursor(pattern, group)?;
        self.cursor = end;
        Some(value)
    }

    /// Lookahead: whether `pattern` would match after skipping whitespace.
    /// Never moves the cursor.
    #[must_use]
    pub fn has(&self, pattern: &Regex) -> bool {
        self.match_at_cursor(pattern, 0).is_some()
    }

    fn whitespace_end(&self) -> usize {
        let rest = self.remaining();
        self.cursor + (rest.len() - rest.trim_start().len())
    }

    /// Returns the selected capture and the byte offset just past the full match.
    fn match_at_cursor(&self, pattern: &Regex, group: usize) -> Option<(&'a str, usize)> {
        let start = self.whitespace_end();
        let rest: &'a str = &self.input[start..];
        if rest.is_empty() {
            return None;
        }
        let caps = pattern.captures(rest)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        let value = caps.get(group).map_or(whole.as_str(), |m| m.as_str());
        Some((value, start + whole.end()))
    }
}
