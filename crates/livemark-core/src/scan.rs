//! Viewport scanning.
//!
//! Two scan granularities, on purpose:
//!
//! - emphasis and inline math are found per visible line, so the cost of a
//!   scan follows the viewport, not the document;
//! - block math can start off-screen and end on-screen, so it is found over
//!   the whole buffer and then filtered to spans that touch the viewport.
//!
//! Fenced code blocks are also resolved over the whole buffer, once per scan,
//! so that a visible line in the middle of a fence is known to be literal.

use std::collections::HashSet;

use serde::Serialize;

use crate::literal::{fenced_regions_in, plain_parts, split_inline_chars};
use crate::math::{math_in_chars, math_in_plain_chars};
use crate::strong::strong_in_plain_chars;
use crate::text::TextBuffer;
use crate::types::{MathDecision, MathKind, Selection, StrongDecision, TextRange};
use crate::visibility::{decide_math, decide_strong};

/// The visible part of the buffer: ordered, non-overlapping ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Viewport {
    ranges: Vec<TextRange>,
}

impl Viewport {
    /// Build a viewport from arbitrary ranges; they are sorted and merged
    /// where they overlap.
    pub fn new(ranges: impl IntoIterator<Item = TextRange>) -> Self {
        let mut sorted: Vec<TextRange> = ranges.into_iter().collect();
        sorted.sort();

        let mut merged: Vec<TextRange> = Vec::with_capacity(sorted.len());
        for range in sorted {
            match merged.last_mut() {
                Some(last) if range.from < last.to => last.to = last.to.max(range.to),
                _ => merged.push(range),
            }
        }
        Self { ranges: merged }
    }

    /// The whole buffer is visible.
    pub fn whole<B: TextBuffer + ?Sized>(buffer: &B) -> Self {
        Self {
            ranges: vec![TextRange::new(0, buffer.len_chars())],
        }
    }

    pub fn ranges(&self) -> &[TextRange] {
        &self.ranges
    }

    /// Whether `span` overlaps any visible range (open interval).
    pub fn intersects(&self, span: TextRange) -> bool {
        self.ranges.iter().any(|range| range.intersects(&span))
    }
}

/// Decision-annotated matches for one scan, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanOutput {
    pub strong: Vec<StrongDecision>,
    pub math: Vec<MathDecision>,
}

impl ScanOutput {
    pub fn is_empty(&self) -> bool {
        self.strong.is_empty() && self.math.is_empty()
    }
}

/// Scan the visible part of `buffer` and decide visibility for every match.
///
/// Pure: the same buffer, viewport and selection always give the same output.
pub fn scan<B: TextBuffer + ?Sized>(
    buffer: &B,
    viewport: &Viewport,
    selection: Option<&Selection>,
) -> ScanOutput {
    let doc: Vec<char> = buffer.to_string().chars().collect();
    let fences = fenced_regions_in(&doc, 0);

    let mut output = ScanOutput::default();
    let mut seen_math: HashSet<(MathKind, usize, usize)> = HashSet::new();
    let mut seen_lines: HashSet<usize> = HashSet::new();

    for range in viewport.ranges() {
        let mut pos = range.from.min(doc.len());
        loop {
            let line = buffer.line_at(pos);
            // Two visible ranges may share a line.
            if seen_lines.insert(line.from) {
                scan_line(&doc, line.range(), &fences, selection, &mut seen_math, &mut output);
            }

            match line.next_from {
                Some(next) if next < range.to => pos = next,
                _ => break,
            }
        }
    }

    let inline_count = output.math.len();

    for found in math_in_chars(&doc, 0) {
        if found.kind != MathKind::Block || !viewport.intersects(found.span()) {
            continue;
        }
        if seen_math.insert(found.dedup_key()) {
            output.math.push(decide_math(found, selection));
        }
    }

    tracing::debug!(
        target: "livemark::scan",
        doc_len = doc.len(),
        visible_ranges = viewport.ranges().len(),
        lines = seen_lines.len(),
        fences = fences.len(),
        strong = output.strong.len(),
        inline_math = inline_count,
        block_math = output.math.len() - inline_count,
        "scan complete"
    );

    output
}

fn scan_line(
    doc: &[char],
    line: TextRange,
    fences: &[TextRange],
    selection: Option<&Selection>,
    seen_math: &mut HashSet<(MathKind, usize, usize)>,
    output: &mut ScanOutput,
) {
    for part in plain_parts(line, fences) {
        let text = &doc[part.to_range()];
        for segment in split_inline_chars(text, part.from) {
            if segment.is_literal() {
                continue;
            }
            let local = TextRange::new(segment.range.from - part.from, segment.range.to - part.from);
            let plain = &text[local.to_range()];

            output.strong.extend(
                strong_in_plain_chars(plain, segment.range.from)
                    .into_iter()
                    .map(|m| decide_strong(m, selection)),
            );

            for found in math_in_plain_chars(plain, segment.range.from) {
                if found.kind == MathKind::Inline && seen_math.insert(found.dedup_key()) {
                    output.math.push(decide_math(found, selection));
                }
            }
        }
    }
}
