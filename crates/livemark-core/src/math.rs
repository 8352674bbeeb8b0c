//! Alternate-syntax math delimiters: `\( ... \)` (inline) and `\[ ... \]` (block).
//!
//! Not stack based: the first unescaped opener wins and claims the first
//! unescaped closer of the same kind. An opener with no closer in the segment
//! produces nothing and scanning resumes just past its first char.
//!
//! Once a kind has no closer left, later openers of that kind are skipped
//! without searching, so a segment full of unterminated openers stays linear.

use crate::escape::{is_escaped, starts_with_at};
use crate::literal::split_chars;
use crate::types::{MARKER_LEN, MathKind, MathMatch};

fn opener_at(text: &[char], index: usize) -> Option<MathKind> {
    [MathKind::Inline, MathKind::Block]
        .into_iter()
        .find(|kind| starts_with_at(text, index, &kind.open_token()))
}

fn find_closer(text: &[char], from: usize, kind: MathKind) -> Option<usize> {
    let token = kind.close_token();
    (from..text.len().saturating_sub(1))
        .find(|&j| starts_with_at(text, j, &token) && !is_escaped(text, j))
}

/// Math matches of both kinds in a plain (non-literal) segment starting at
/// buffer offset `base`.
pub fn find_math_in_plain(segment: &str, base: usize) -> Vec<MathMatch> {
    let chars: Vec<char> = segment.chars().collect();
    math_in_plain_chars(&chars, base)
}

/// Math matches in arbitrary text, with literal regions split out first.
pub fn find_math(text: &str, base: usize) -> Vec<MathMatch> {
    let chars: Vec<char> = text.chars().collect();
    math_in_chars(&chars, base)
}

/// Math matches of a single kind in arbitrary text.
pub fn find_math_of_kind(text: &str, base: usize, kind: MathKind) -> Vec<MathMatch> {
    find_math(text, base)
        .into_iter()
        .filter(|m| m.kind == kind)
        .collect()
}

pub(crate) fn math_in_chars(text: &[char], base: usize) -> Vec<MathMatch> {
    split_chars(text, 0)
        .into_iter()
        .filter(|segment| !segment.is_literal())
        .flat_map(|segment| {
            math_in_plain_chars(&text[segment.range.to_range()], base + segment.range.from)
        })
        .collect()
}

pub(crate) fn math_in_plain_chars(segment: &[char], base: usize) -> Vec<MathMatch> {
    let mut matches = Vec::new();
    // Kinds with no unescaped closer at or after the current position.
    let mut exhausted = [false; 2];

    let mut i = 0;
    while i + 1 < segment.len() {
        let Some(kind) = opener_at(segment, i) else {
            i += 1;
            continue;
        };

        if is_escaped(segment, i) {
            i += MARKER_LEN;
            continue;
        }

        let slot = kind as usize;
        if exhausted[slot] {
            i += 1;
            continue;
        }

        let content_from = i + MARKER_LEN;
        match find_closer(segment, content_from, kind) {
            Some(close) => {
                let found = MathMatch {
                    kind,
                    expression: segment[content_from..close].iter().collect(),
                    open_marker_from: base + i,
                    open_marker_to: base + content_from,
                    close_marker_from: base + close,
                    close_marker_to: base + close + MARKER_LEN,
                };
                tracing::trace!(
                    target: "livemark::math",
                    kind = ?found.kind,
                    open = found.open_marker_from,
                    close = found.close_marker_from,
                    "math match"
                );
                matches.push(found);
                i = close + MARKER_LEN;
            }
            None => {
                exhausted[slot] = true;
                i += 1;
            }
        }
    }

    matches
}
