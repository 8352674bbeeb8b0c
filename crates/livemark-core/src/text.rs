//! Text buffer abstraction for the host document.
//!
//! The scanner only needs read access: line lookup by offset and
//! full-text materialization. `EditorRope` is the ropey-backed
//! implementation used by the CLI and the tests; editor hosts can implement
//! `TextBuffer` over their own storage.

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

use crate::escape::is_line_break;
use crate::types::TextRange;

/// A single line of the buffer, line break excluded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    /// Char offset of the first char of the line.
    pub from: usize,
    /// Char offset just past the last char of the line, before its break.
    pub to: usize,
    /// Start of the following line, `None` on the last line.
    pub next_from: Option<usize>,
}

impl Line {
    pub fn range(&self) -> TextRange {
        TextRange::new(self.from, self.to)
    }
}

/// A read-only text buffer addressed in chars.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Convert entire buffer to String.
    fn to_string(&self) -> String;

    /// The line containing `char_offset`. Offsets past the end clamp to the last line.
    fn line_at(&self, char_offset: usize) -> Line;
}

/// Ropey-backed text buffer.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }

    /// Insert text at char offset.
    pub fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
    }

    /// Delete char range.
    pub fn delete(&mut self, char_range: Range<usize>) {
        self.rope.remove(char_range);
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }

    fn line_at(&self, char_offset: usize) -> Line {
        let offset = char_offset.min(self.rope.len_chars());
        let number = self.rope.char_to_line(offset);
        let from = self.rope.line_to_char(number);
        let line = self.rope.line(number);
        // ropey keeps the line break on the slice.
        let mut len = line.len_chars();
        if len >= 2 && line.char(len - 2) == '\r' && line.char(len - 1) == '\n' {
            len -= 2;
        } else if len >= 1 && is_line_break(line.char(len - 1)) {
            len -= 1;
        }
        let next_from = (number + 1 < self.rope.len_lines())
            .then(|| self.rope.line_to_char(number + 1));
        Line {
            from,
            to: from + len,
            next_from,
        }
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}
