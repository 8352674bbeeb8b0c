//! Literal region splitting.
//!
//! Partitions text into literal regions (fenced code blocks and inline code
//! spans) and the plain segments between them. Matchers only ever see plain
//! segments, and a segment boundary is a hard boundary: a marker can never
//! pair with one on the other side of a literal region.

use serde::Serialize;

use crate::escape::{char_run, is_escaped, is_line_break, line_break_len};
use crate::types::TextRange;

/// Minimum run length of a code fence.
const FENCE_MIN_RUN: usize = 3;

/// Maximum indentation (in spaces) before a fence token.
const FENCE_MAX_INDENT: usize = 3;

/// What a segment of split text contains.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentKind {
    /// Ordinary text, eligible for emphasis and math matching.
    Text,
    /// A fenced code block (``` or ~~~), fence lines included.
    Fenced,
    /// An inline code span, backtick runs included.
    InlineCode,
}

/// A contiguous piece of split text in absolute buffer offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Segment {
    pub range: TextRange,
    pub kind: SegmentKind,
}

impl Segment {
    pub fn is_literal(&self) -> bool {
        !matches!(self.kind, SegmentKind::Text)
    }
}

/// Split `text` (starting at buffer offset `base`) into plain and literal segments.
///
/// Segments are contiguous, ordered, non-empty and cover `text` exactly.
pub fn split_literal_regions(text: &str, base: usize) -> Vec<Segment> {
    let chars: Vec<char> = text.chars().collect();
    split_chars(&chars, base)
}

/// Fenced code block regions of `text`, in absolute offsets.
pub fn fenced_regions(text: &str, base: usize) -> Vec<TextRange> {
    let chars: Vec<char> = text.chars().collect();
    fenced_regions_in(&chars, base)
}

pub(crate) fn split_chars(text: &[char], base: usize) -> Vec<Segment> {
    let fences = fenced_regions_in(text, 0);
    let mut segments = Vec::new();
    let mut cursor = 0;

    for fence in fences.iter().copied().chain(std::iter::once(TextRange::new(
        text.len(),
        text.len(),
    ))) {
        // Inline code only exists between fences.
        push_inline_segments(&mut segments, text, cursor, fence.from, base);
        push_segment(&mut segments, fence.from, fence.to, SegmentKind::Fenced, base);
        cursor = fence.to;
    }

    segments
}

/// Split `text` into plain and inline-code segments, without fence detection.
///
/// Used for text already known to lie outside any fenced block.
pub(crate) fn split_inline_chars(text: &[char], base: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    push_inline_segments(&mut segments, text, 0, text.len(), base);
    segments
}

fn push_inline_segments(
    out: &mut Vec<Segment>,
    text: &[char],
    from: usize,
    to: usize,
    base: usize,
) {
    let mut cursor = from;
    for code in inline_code_regions_in(text, from, to) {
        push_segment(out, cursor, code.from, SegmentKind::Text, base);
        push_segment(out, code.from, code.to, SegmentKind::InlineCode, base);
        cursor = code.to;
    }
    push_segment(out, cursor, to, SegmentKind::Text, base);
}

fn push_segment(out: &mut Vec<Segment>, from: usize, to: usize, kind: SegmentKind, base: usize) {
    if from < to {
        out.push(Segment {
            range: TextRange::new(from, to).offset_by(base),
            kind,
        });
    }
}

pub(crate) fn fenced_regions_in(text: &[char], base: usize) -> Vec<TextRange> {
    let mut regions = Vec::new();
    // (fence char, opening run length, region start)
    let mut open: Option<(char, usize, usize)> = None;

    let mut line_start = 0;
    while line_start < text.len() {
        let line_end = text[line_start..]
            .iter()
            .position(|&c| is_line_break(c))
            .map(|p| line_start + p)
            .unwrap_or(text.len());
        let line = &text[line_start..line_end];

        match open {
            None => {
                if let Some((fence_char, run)) = fence_opener(line) {
                    open = Some((fence_char, run, line_start));
                }
            }
            Some((fence_char, run, start)) => {
                if is_fence_closer(line, fence_char, run) {
                    regions.push(TextRange::new(start, line_end).offset_by(base));
                    open = None;
                }
            }
        }

        line_start = line_end + line_break_len(text, line_end).unwrap_or(1);
    }

    // Unterminated fences run to the end of the text.
    if let Some((_, _, start)) = open {
        regions.push(TextRange::new(start, text.len()).offset_by(base));
    }

    regions
}

/// Fence character and run length if `line` opens a fenced block.
fn fence_opener(line: &[char]) -> Option<(char, usize)> {
    let indent = fence_indent(line)?;
    let fence_char = *line.get(indent)?;
    if fence_char != '`' && fence_char != '~' {
        return None;
    }
    let run = char_run(line, indent, fence_char);
    if run < FENCE_MIN_RUN {
        return None;
    }
    // Backtick fences cannot carry backticks in their info string.
    if fence_char == '`' && line[indent + run..].contains(&'`') {
        return None;
    }
    Some((fence_char, run))
}

fn is_fence_closer(line: &[char], fence_char: char, open_run: usize) -> bool {
    let Some(indent) = fence_indent(line) else {
        return false;
    };
    let run = char_run(line, indent, fence_char);
    run >= open_run && line[indent + run..].iter().all(|c| c.is_whitespace())
}

fn fence_indent(line: &[char]) -> Option<usize> {
    let indent = line.iter().take_while(|&&c| c == ' ').count();
    (indent <= FENCE_MAX_INDENT).then_some(indent)
}

/// Inline code spans within `text[from..to]`, in offsets relative to `text`.
///
/// An opener is a run of N unescaped backticks; it closes at the next run of
/// exactly N backticks. A run without a closer ends code-span detection: it
/// and everything after it up to `to` is ordinary text.
pub(crate) fn inline_code_regions_in(text: &[char], from: usize, to: usize) -> Vec<TextRange> {
    let mut regions = Vec::new();
    let run_at = |i: usize| text[i..to].iter().take_while(|&&c| c == '`').count();

    let mut i = from;
    while i < to {
        if text[i] != '`' || is_escaped(text, i) {
            i += 1;
            continue;
        }

        let run = run_at(i);
        let mut close = None;
        let mut j = i + run;
        while j < to {
            if text[j] != '`' {
                j += 1;
                continue;
            }
            let candidate = run_at(j);
            if candidate == run {
                close = Some(j);
                break;
            }
            j += candidate;
        }

        let Some(j) = close else {
            break;
        };
        regions.push(TextRange::new(i, j + run));
        i = j + run;
    }

    regions
}

/// Parts of `range` not covered by any of `literal` (sorted, non-overlapping).
pub fn plain_parts(range: TextRange, literal: &[TextRange]) -> Vec<TextRange> {
    let mut parts = Vec::new();
    let mut cursor = range.from;
    for region in literal {
        if region.to <= cursor {
            continue;
        }
        if region.from >= range.to {
            break;
        }
        if region.from > cursor {
            parts.push(TextRange::new(cursor, region.from));
        }
        cursor = cursor.max(region.to);
    }
    if cursor < range.to {
        parts.push(TextRange::new(cursor, range.to));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<(SegmentKind, String)> {
        let chars: Vec<char> = text.chars().collect();
        split_literal_regions(text, 0)
            .into_iter()
            .map(|s| (s.kind, chars[s.range.to_range()].iter().collect()))
            .collect()
    }

    #[test]
    fn test_plain_text_is_one_segment() {
        assert_eq!(kinds("just **text**"), vec![(SegmentKind::Text, "just **text**".into())]);
    }

    #[test]
    fn test_empty_text_has_no_segments() {
        assert!(split_literal_regions("", 0).is_empty());
    }

    #[test]
    fn test_inline_code_splits() {
        assert_eq!(
            kinds("a `**b**` c"),
            vec![
                (SegmentKind::Text, "a ".into()),
                (SegmentKind::InlineCode, "`**b**`".into()),
                (SegmentKind::Text, " c".into()),
            ]
        );
    }

    #[test]
    fn test_inline_code_needs_equal_run() {
        assert_eq!(
            kinds("``a`b`` c"),
            vec![
                (SegmentKind::InlineCode, "``a`b``".into()),
                (SegmentKind::Text, " c".into()),
            ]
        );
    }

    #[test]
    fn test_unmatched_backticks_are_text() {
        assert_eq!(kinds("a ``b` c"), vec![(SegmentKind::Text, "a ``b` c".into())]);
    }

    #[test]
    fn test_unmatched_run_leaves_rest_as_text() {
        assert_eq!(kinds("`` x `y` z"), vec![(SegmentKind::Text, "`` x `y` z".into())]);
        assert_eq!(kinds("``a `**b**`"), vec![(SegmentKind::Text, "``a `**b**`".into())]);
    }

    #[test]
    fn test_code_before_unmatched_run_is_kept() {
        assert_eq!(
            kinds("`a` `` b"),
            vec![
                (SegmentKind::InlineCode, "`a`".into()),
                (SegmentKind::Text, " `` b".into()),
            ]
        );
    }

    #[test]
    fn test_fence_after_unmatched_run_still_opens() {
        assert_eq!(
            kinds("a ` b\n```\ncode\n```"),
            vec![
                (SegmentKind::Text, "a ` b\n".into()),
                (SegmentKind::Fenced, "```\ncode\n```".into()),
            ]
        );
    }

    #[test]
    fn test_escaped_backtick_does_not_open() {
        assert_eq!(kinds(r"\`a` b"), vec![(SegmentKind::Text, r"\`a` b".into())]);
    }

    #[test]
    fn test_fenced_block() {
        let text = "a\n```rust\n**x**\n```\nb";
        assert_eq!(
            kinds(text),
            vec![
                (SegmentKind::Text, "a\n".into()),
                (SegmentKind::Fenced, "```rust\n**x**\n```".into()),
                (SegmentKind::Text, "\nb".into()),
            ]
        );
    }

    #[test]
    fn test_tilde_fence_needs_matching_char() {
        let text = "~~~\n```\n~~~~\nafter";
        assert_eq!(
            fenced_regions(text, 0),
            vec![TextRange::new(0, 12)]
        );
    }

    #[test]
    fn test_shorter_closer_does_not_close() {
        let text = "````\n```\nstill code";
        assert_eq!(fenced_regions(text, 0), vec![TextRange::new(0, 19)]);
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        assert_eq!(kinds("```"), vec![(SegmentKind::Fenced, "```".into())]);
        assert_eq!(
            kinds("```\n** not bold **\n"),
            vec![(SegmentKind::Fenced, "```\n** not bold **\n".into())]
        );
    }

    #[test]
    fn test_single_line_triple_backticks_are_inline_code() {
        // The info string holds a backtick, so this is a code span, not a fence.
        assert_eq!(
            kinds("```text ** not bold ** ```"),
            vec![(SegmentKind::InlineCode, "```text ** not bold ** ```".into())]
        );
    }

    #[test]
    fn test_fences_follow_buffer_line_breaks() {
        assert_eq!(fenced_regions("```\r**x**\r```", 0), vec![TextRange::new(0, 13)]);
        assert_eq!(fenced_regions("```\r\nx\r\n```\r\ny", 0), vec![TextRange::new(0, 11)]);
        assert_eq!(
            fenced_regions("~~~\u{2028}x\u{2028}~~~", 0),
            vec![TextRange::new(0, 9)]
        );
    }

    #[test]
    fn test_indented_four_spaces_is_not_a_fence() {
        assert!(fenced_regions("    ```\ncode", 0).is_empty());
    }

    #[test]
    fn test_backtick_info_string_with_backtick_is_not_a_fence() {
        assert!(fenced_regions("``` a`b\nx", 0).is_empty());
    }

    #[test]
    fn test_base_offset_applies() {
        let segments = split_literal_regions("x `y`", 100);
        assert_eq!(segments[1].range, TextRange::new(102, 105));
        assert!(segments[1].is_literal());
    }

    #[test]
    fn test_plain_parts() {
        let literal = [TextRange::new(5, 10), TextRange::new(12, 20)];
        assert_eq!(
            plain_parts(TextRange::new(0, 15), &literal),
            vec![TextRange::new(0, 5), TextRange::new(10, 12)]
        );
        assert_eq!(plain_parts(TextRange::new(6, 9), &literal), vec![]);
        assert_eq!(
            plain_parts(TextRange::new(18, 25), &literal),
            vec![TextRange::new(20, 25)]
        );
    }
}
