//! livemark-core: match scanning and visibility decisions for live-preview editing.
//!
//! This crate provides:
//! - literal region splitting (fenced blocks, inline code)
//! - strong emphasis (`**`/`__`) and alternate math (`\(..\)`, `\[..\]`) matching
//! - caret-driven visibility decisions for markers and rendered math
//! - a viewport scanner and a decoration builder for the host editor
//!
//! Everything is synchronous and side-effect free; the host supplies the text
//! buffer, viewport, selection and (optionally) a math renderer on every call.

pub mod capability;
pub mod error;
pub mod escape;
pub mod literal;
pub mod math;
pub mod render;
pub mod scan;
pub mod strong;
pub mod text;
pub mod types;
pub mod visibility;

pub use capability::{MathCapability, RescanGate, ScanContext, ViewUpdate};
pub use error::RenderError;
pub use literal::{Segment, SegmentKind, fenced_regions, split_literal_regions};
pub use math::{find_math, find_math_in_plain, find_math_of_kind};
pub use render::{
    Decoration, DecorationConfig, MathRenderer, RenderedUnit, ViewDecorations, build_decorations,
    build_view, unit_position,
};
pub use scan::{ScanOutput, Viewport, scan};
pub use smol_str::SmolStr;
pub use strong::{find_strong, find_strong_in_plain};
pub use text::{EditorRope, Line, TextBuffer};
pub use types::{
    MathDecision, MathKind, MathMatch, Selection, StrongDecision, StrongMatch, TextRange,
};
pub use visibility::{
    STRONG_MARKER_RADIUS, decide_math, decide_strong, should_hide_markers,
    should_suppress_replacement,
};
