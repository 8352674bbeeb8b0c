//! Cursor-driven visibility decisions.
//!
//! Emphasis markers get a small proximity radius so that parking the caret
//! just outside them does not make the text jump. Math spans use their exact
//! boundaries: the rendered unit comes back as soon as the caret leaves.

use crate::types::{
    MathDecision, MathMatch, Selection, StrongDecision, StrongMatch, TextRange,
};

/// How far (in chars) around an emphasis marker the caret keeps it visible.
pub const STRONG_MARKER_RADIUS: usize = 2;

/// Marker range grown by `radius` on each side, clamped at buffer start.
fn expand(range: TextRange, radius: usize) -> TextRange {
    TextRange::new(range.from.saturating_sub(radius), range.to + radius)
}

/// Whether the selection touches `range`.
///
/// A caret touches when it lies within the closed range; a non-empty
/// selection touches when it overlaps the range as an open interval.
fn selection_touches(selection: &Selection, range: TextRange) -> bool {
    if selection.is_caret() {
        range.contains_inclusive(selection.head)
    } else {
        selection.to_text_range().intersects(&range)
    }
}

/// Whether both markers of `m` should be hidden.
///
/// One shared test against the whole match drives both markers: if the
/// selection is near either marker, both stay visible.
pub fn should_hide_markers(m: &StrongMatch, selection: Option<&Selection>) -> bool {
    let Some(selection) = selection else {
        return true;
    };

    let near_open = selection_touches(selection, expand(m.open_marker(), STRONG_MARKER_RADIUS));
    let near_close = selection_touches(selection, expand(m.close_marker(), STRONG_MARKER_RADIUS));
    !(near_open || near_close)
}

/// Whether the rendered replacement for `m` should be held back so the
/// source stays editable.
pub fn should_suppress_replacement(m: &MathMatch, selection: Option<&Selection>) -> bool {
    match selection {
        None => false,
        Some(selection) => selection_touches(selection, m.span()),
    }
}

/// Attach the marker-hiding decision to a strong match.
pub fn decide_strong(m: StrongMatch, selection: Option<&Selection>) -> StrongDecision {
    StrongDecision {
        hide_markers: should_hide_markers(&m, selection),
        span: m,
    }
}

/// Attach the replacement-suppression decision to a math match.
pub fn decide_math(m: MathMatch, selection: Option<&Selection>) -> MathDecision {
    MathDecision {
        suppress_replacement: should_suppress_replacement(&m, selection),
        span: m,
    }
}
