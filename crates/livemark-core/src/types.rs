//! Core value types: ranges, selection, and the matches produced by the scanners.
//!
//! Every offset here is an absolute char offset into the buffer, never
//! line-relative, so matches from different lines compose without translation.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Half-open char range into the buffer (`from <= to`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    /// Create a range, swapping the bounds if they arrive reversed.
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    /// Open-interval overlap: `a.from < b.to && b.from < a.to`.
    ///
    /// Ranges that merely touch do not intersect. An empty range intersects
    /// a range that strictly contains its position, but never one it only
    /// touches at an edge.
    pub fn intersects(&self, other: &TextRange) -> bool {
        ranges_intersect(self.from, self.to, other.from, other.to)
    }

    /// Closed containment test, `from <= offset <= to`.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        offset >= self.from && offset <= self.to
    }

    /// Shift both bounds forward by `delta`.
    pub fn offset_by(self, delta: usize) -> Self {
        Self {
            from: self.from + delta,
            to: self.to + delta,
        }
    }

    pub fn to_range(&self) -> Range<usize> {
        self.from..self.to
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<TextRange> for Range<usize> {
    fn from(range: TextRange) -> Self {
        range.from..range.to
    }
}

/// Open-interval intersection of two raw ranges.
pub fn ranges_intersect(a_from: usize, a_to: usize, b_from: usize, b_to: usize) -> bool {
    a_from < b_to && b_from < a_to
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret).
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is a caret (empty, no extent).
    pub fn is_caret(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    /// Ordered bounds as a [`TextRange`].
    pub fn to_text_range(&self) -> TextRange {
        TextRange::new(self.start(), self.end())
    }
}

/// Width of every emphasis and math marker token.
pub const MARKER_LEN: usize = 2;

/// One resolved `**`/`__` pair.
///
/// `content_from == open_marker_to`, `content_to == close_marker_from`, and the
/// content is never empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrongMatch {
    pub content_from: usize,
    pub content_to: usize,
    pub open_marker_from: usize,
    pub open_marker_to: usize,
    pub close_marker_from: usize,
    pub close_marker_to: usize,
}

impl StrongMatch {
    /// Build a match from the two marker start offsets.
    ///
    /// Returns `None` when the content between the markers would be empty.
    pub fn from_markers(open_marker_from: usize, close_marker_from: usize) -> Option<Self> {
        let open_marker_to = open_marker_from + MARKER_LEN;
        if open_marker_to >= close_marker_from {
            return None;
        }
        Some(Self {
            content_from: open_marker_to,
            content_to: close_marker_from,
            open_marker_from,
            open_marker_to,
            close_marker_from,
            close_marker_to: close_marker_from + MARKER_LEN,
        })
    }

    pub fn content(&self) -> TextRange {
        TextRange::new(self.content_from, self.content_to)
    }

    pub fn open_marker(&self) -> TextRange {
        TextRange::new(self.open_marker_from, self.open_marker_to)
    }

    pub fn close_marker(&self) -> TextRange {
        TextRange::new(self.close_marker_from, self.close_marker_to)
    }

    /// Full span from opener start to closer end.
    pub fn span(&self) -> TextRange {
        TextRange::new(self.open_marker_from, self.close_marker_to)
    }
}

/// Which alternate math syntax a match uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MathKind {
    /// `\( ... \)`
    Inline,
    /// `\[ ... \]`
    Block,
}

impl MathKind {
    pub fn open_token(self) -> [char; 2] {
        match self {
            MathKind::Inline => ['\\', '('],
            MathKind::Block => ['\\', '['],
        }
    }

    pub fn close_token(self) -> [char; 2] {
        match self {
            MathKind::Inline => ['\\', ')'],
            MathKind::Block => ['\\', ']'],
        }
    }

    pub fn is_block(self) -> bool {
        matches!(self, MathKind::Block)
    }
}

/// One resolved math span. `expression` is captured verbatim, without de-escaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MathMatch {
    pub kind: MathKind,
    pub expression: String,
    pub open_marker_from: usize,
    pub open_marker_to: usize,
    pub close_marker_from: usize,
    pub close_marker_to: usize,
}

impl MathMatch {
    /// Full span from opener start to closer end.
    pub fn span(&self) -> TextRange {
        TextRange::new(self.open_marker_from, self.close_marker_to)
    }

    /// Deduplication key used by the orchestrator.
    pub fn dedup_key(&self) -> (MathKind, usize, usize) {
        (self.kind, self.open_marker_from, self.close_marker_to)
    }
}

/// A strong match together with its marker-hiding decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrongDecision {
    #[serde(flatten)]
    pub span: StrongMatch,
    pub hide_markers: bool,
}

/// A math match together with its replacement-suppression decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathDecision {
    #[serde(flatten)]
    pub span: MathMatch,
    pub suppress_replacement: bool,
}
