//! Strong emphasis (`**bold**` / `__bold__`) matching.
//!
//! Single left-to-right pass over a plain segment with a stack of open
//! markers. The flanking rule is asymmetric and looser than CommonMark:
//!
//! - a marker can open if the char after it exists and is not whitespace;
//! - a marker can close if the char before it exists and is not whitespace.
//!
//! Only the top of the stack can close, and only with the same marker kind,
//! so `**` and `__` never pair with each other and same-kind nesting does not
//! resolve. Unmatched markers are inert.

use crate::escape::{is_escaped, starts_with_at};
use crate::literal::split_chars;
use crate::types::{MARKER_LEN, StrongMatch};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Asterisks,
    Underscores,
}

impl Marker {
    fn at(text: &[char], index: usize) -> Option<Self> {
        if starts_with_at(text, index, &['*', '*']) {
            Some(Marker::Asterisks)
        } else if starts_with_at(text, index, &['_', '_']) {
            Some(Marker::Underscores)
        } else {
            None
        }
    }
}

struct OpenFrame {
    marker: Marker,
    start: usize,
}

fn can_open(next: Option<char>) -> bool {
    next.is_some_and(|c| !c.is_whitespace())
}

fn can_close(prev: Option<char>) -> bool {
    prev.is_some_and(|c| !c.is_whitespace())
}

/// Strong matches in a plain (non-literal) segment starting at buffer offset `base`.
pub fn find_strong_in_plain(segment: &str, base: usize) -> Vec<StrongMatch> {
    let chars: Vec<char> = segment.chars().collect();
    strong_in_plain_chars(&chars, base)
}

/// Strong matches in arbitrary text: literal regions are split out first and
/// each plain segment is matched independently.
pub fn find_strong(text: &str, base: usize) -> Vec<StrongMatch> {
    let chars: Vec<char> = text.chars().collect();
    split_chars(&chars, 0)
        .into_iter()
        .filter(|segment| !segment.is_literal())
        .flat_map(|segment| {
            strong_in_plain_chars(&chars[segment.range.to_range()], base + segment.range.from)
        })
        .collect()
}

pub(crate) fn strong_in_plain_chars(segment: &[char], base: usize) -> Vec<StrongMatch> {
    let mut matches = Vec::new();
    let mut stack: Vec<OpenFrame> = Vec::new();

    let mut i = 0;
    while i + 1 < segment.len() {
        let Some(marker) = Marker::at(segment, i) else {
            i += 1;
            continue;
        };

        // An escaped marker is plain text, both chars of it.
        if is_escaped(segment, i) {
            i += MARKER_LEN;
            continue;
        }

        let prev = i.checked_sub(1).map(|p| segment[p]);
        let next = segment.get(i + MARKER_LEN).copied();

        let closes_top = stack.last().is_some_and(|top| top.marker == marker) && can_close(prev);
        if closes_top {
            if let Some(opener) = stack.pop() {
                if let Some(found) = StrongMatch::from_markers(base + opener.start, base + i) {
                    tracing::trace!(
                        target: "livemark::strong",
                        open = found.open_marker_from,
                        close = found.close_marker_from,
                        "strong match"
                    );
                    matches.push(found);
                }
            }
        } else if can_open(next) {
            stack.push(OpenFrame { marker, start: i });
        }

        i += MARKER_LEN;
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        find_strong(text, 0)
            .into_iter()
            .map(|m| chars[m.content_from..m.content_to].iter().collect())
            .collect()
    }

    #[test]
    fn test_no_markers() {
        assert!(find_strong("plain text, *single* _ones_", 0).is_empty());
        assert!(find_strong("", 0).is_empty());
    }

    #[test]
    fn test_simple_bold() {
        let matches = find_strong("a **bold** b", 0);
        assert_eq!(matches.len(), 1);
        let m = matches[0];
        assert_eq!((m.open_marker_from, m.open_marker_to), (2, 4));
        assert_eq!((m.content_from, m.content_to), (4, 8));
        assert_eq!((m.close_marker_from, m.close_marker_to), (8, 10));
    }

    #[test]
    fn test_underscores() {
        assert_eq!(contents("__bold__"), vec!["bold"]);
    }

    #[test]
    fn test_base_offset() {
        let m = find_strong_in_plain("**x**", 40)[0];
        assert_eq!((m.open_marker_from, m.content_from, m.close_marker_to), (40, 42, 45));
    }

    #[test]
    fn test_mixed_kinds_do_not_pair() {
        assert!(find_strong("**mixed__", 0).is_empty());
        assert!(find_strong("__mixed**", 0).is_empty());
    }

    #[test]
    fn test_escaped_markers() {
        assert!(find_strong(r"\**not bold\**", 0).is_empty());
        assert!(find_strong(r"\__not bold\__", 0).is_empty());
    }

    #[test]
    fn test_double_backslash_does_not_escape() {
        assert_eq!(contents(r"\\**bold**"), vec!["bold"]);
    }

    #[test]
    fn test_empty_content_is_dropped() {
        assert!(find_strong("****", 0).is_empty());
        assert!(find_strong("____ x", 0).is_empty());
    }

    #[test]
    fn test_whitespace_flanking() {
        // Opener followed by whitespace cannot open.
        assert!(find_strong("** not bold**", 0).is_empty());
        // Closer preceded by whitespace cannot close.
        assert!(find_strong("**not bold **", 0).is_empty());
        // Marker at the end of the segment cannot open.
        assert!(find_strong("text **", 0).is_empty());
    }

    #[test]
    fn test_permissive_flanking_next_to_words() {
        // No constraint on the char before an opener or after a closer.
        assert_eq!(contents("word**bold**word"), vec!["bold"]);
        assert_eq!(contents("(**bold**)"), vec!["bold"]);
    }

    #[test]
    fn test_inner_opener_takes_the_closer() {
        // The second `**` cannot close (space before) so it opens; the final
        // `**` closes it and the first opener stays unmatched.
        assert_eq!(contents("**a **b**"), vec!["b"]);
    }

    #[test]
    fn test_multiple_matches() {
        assert_eq!(contents("**a** and __b__ and **c**"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_triple_asterisks() {
        assert_eq!(contents("***bold***"), vec!["*bold"]);
    }

    #[test]
    fn test_inline_code_is_ignored() {
        assert!(find_strong("`**not bold**`", 0).is_empty());
        assert_eq!(contents("**a** `**b**` **c**"), vec!["a", "c"]);
    }

    #[test]
    fn test_markers_do_not_straddle_code() {
        assert!(find_strong("**a `code` b**", 0).is_empty());
        assert!(find_strong("**a `code** b`", 0).is_empty());
        assert_eq!(contents("`code` **b**"), vec!["b"]);
    }

    #[test]
    fn test_unmatched_backticks_leave_rest_plain() {
        assert_eq!(contents("``a `**b**`"), vec!["b"]);
    }

    #[test]
    fn test_fenced_block_is_ignored() {
        assert!(find_strong("```\n**not bold**\n```", 0).is_empty());
    }

    #[test]
    fn test_unicode_offsets_are_chars() {
        let matches = find_strong("é **ü**", 0);
        assert_eq!(matches[0].content_from, 4);
        assert_eq!(matches[0].content_to, 5);
    }

    #[test]
    fn test_deep_unmatched_openers() {
        let text = "**a ".repeat(10_000);
        assert!(find_strong(&text, 0).is_empty());
    }
}
