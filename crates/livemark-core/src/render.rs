//! Turning scan output into decoration instructions for the host.
//!
//! The host owns the actual math rendering. It hands in a [`MathRenderer`],
//! and this module decides which matches get a rendered unit, where the unit
//! is positioned, and which ranges get style tags.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::capability::ScanContext;
use crate::error::RenderError;
use crate::scan::{ScanOutput, Viewport, scan};
use crate::text::TextBuffer;
use crate::types::{MathMatch, Selection, TextRange};

/// A displayable unit produced by the host's math renderer.
pub trait RenderedUnit {
    /// Tell the unit which source range its content occupies.
    fn set_position(&mut self, content_from: usize, content_to: usize);
}

/// Turns an expression into a rendered unit.
///
/// Implementations are provided by the consuming application.
pub trait MathRenderer {
    type Unit: RenderedUnit;

    fn render(&self, expression: &str, display_as_block: bool) -> Result<Self::Unit, RenderError>;
}

impl<T: MathRenderer + ?Sized> MathRenderer for &T {
    type Unit = T::Unit;

    fn render(&self, expression: &str, display_as_block: bool) -> Result<Self::Unit, RenderError> {
        (**self).render(expression, display_as_block)
    }
}

/// Class names used for style-tag decorations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationConfig {
    /// Applied to the content of a strong span.
    pub strong_class: SmolStr,
    /// Applied to hidden emphasis markers.
    pub marker_class: SmolStr,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            strong_class: SmolStr::new_static("lp-strong-fix"),
            marker_class: SmolStr::new_static("lp-strong-marker-fix"),
        }
    }
}

/// One instruction for the host's decoration layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Decoration<U> {
    /// Style `range` with `class`.
    Mark { range: TextRange, class: SmolStr },
    /// Show `unit` in place of `range`.
    Replace { range: TextRange, unit: U },
}

impl<U> Decoration<U> {
    pub fn range(&self) -> TextRange {
        match self {
            Decoration::Mark { range, .. } | Decoration::Replace { range, .. } => *range,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Decoration::Replace { .. })
    }
}

/// Source range the rendered unit stands for.
///
/// Block expressions drop one leading and one trailing newline; the range
/// never shrinks past the marker boundaries.
pub fn unit_position(m: &MathMatch) -> TextRange {
    let mut from = m.open_marker_to;
    let mut to = m.close_marker_from;
    if m.kind.is_block() {
        if m.expression.starts_with('\n') {
            from += 1;
        }
        if m.expression.ends_with('\n') {
            to = to.saturating_sub(1);
        }
        if to < from {
            from = m.open_marker_to;
            to = m.close_marker_from;
        }
    }
    TextRange::new(from, to)
}

/// Render a math match, leaving it in source form if the renderer fails.
fn render_unit<R: MathRenderer>(renderer: &R, m: &MathMatch) -> Option<R::Unit> {
    match renderer.render(&m.expression, m.kind.is_block()) {
        Ok(mut unit) => {
            let position = unit_position(m);
            unit.set_position(position.from, position.to);
            Some(unit)
        }
        Err(error) => {
            tracing::warn!(
                target: "livemark::render",
                kind = ?m.kind,
                open = m.open_marker_from,
                %error,
                "math render failed, keeping source"
            );
            None
        }
    }
}

/// Build decoration instructions for a scan.
///
/// Without a renderer no replacements are produced. Replacements never
/// overlap each other; a later one touching an accepted one is dropped.
/// The result is sorted by range start, then end.
pub fn build_decorations<R: MathRenderer>(
    output: &ScanOutput,
    renderer: Option<&R>,
    config: &DecorationConfig,
) -> Vec<Decoration<R::Unit>> {
    let mut decorations = Vec::new();

    for decision in &output.strong {
        let m = &decision.span;
        decorations.push(Decoration::Mark {
            range: m.content(),
            class: config.strong_class.clone(),
        });
        if decision.hide_markers {
            for marker in [m.open_marker(), m.close_marker()] {
                decorations.push(Decoration::Mark {
                    range: marker,
                    class: config.marker_class.clone(),
                });
            }
        }
    }

    if let Some(renderer) = renderer {
        let mut replaced: Vec<TextRange> = Vec::new();
        for decision in &output.math {
            if decision.suppress_replacement {
                continue;
            }
            let span = decision.span.span();
            if replaced.iter().any(|r| r.intersects(&span)) {
                continue;
            }
            if let Some(unit) = render_unit(renderer, &decision.span) {
                replaced.push(span);
                decorations.push(Decoration::Replace { range: span, unit });
            }
        }
    }

    decorations.sort_by_key(|d| {
        let range = d.range();
        (range.from, range.to)
    });
    decorations
}

/// Decorations for one view update, tagged with the capability epoch they
/// were computed against.
#[derive(Debug)]
pub struct ViewDecorations<U> {
    pub epoch: u64,
    pub output: ScanOutput,
    pub decorations: Vec<Decoration<U>>,
}

/// Scan the viewport and build its decorations in one step.
pub fn build_view<B, R>(
    buffer: &B,
    viewport: &Viewport,
    selection: Option<&Selection>,
    ctx: ScanContext<'_, R>,
    config: &DecorationConfig,
) -> ViewDecorations<R::Unit>
where
    B: TextBuffer + ?Sized,
    R: MathRenderer,
{
    let output = scan(buffer, viewport, selection);
    let decorations = build_decorations(&output, ctx.renderer, config);
    ViewDecorations {
        epoch: ctx.epoch,
        output,
        decorations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::MathCapability;
    use crate::text::EditorRope;
    use crate::types::MathKind;

    #[derive(Debug, PartialEq)]
    struct TestUnit {
        expression: String,
        block: bool,
        position: Option<(usize, usize)>,
    }

    impl RenderedUnit for TestUnit {
        fn set_position(&mut self, content_from: usize, content_to: usize) {
            self.position = Some((content_from, content_to));
        }
    }

    /// Renders everything except expressions containing "bad".
    struct TestRenderer;

    impl MathRenderer for TestRenderer {
        type Unit = TestUnit;

        fn render(&self, expression: &str, display_as_block: bool) -> Result<TestUnit, RenderError> {
            if expression.contains("bad") {
                return Err(RenderError::expression(expression, "rejected"));
            }
            Ok(TestUnit {
                expression: expression.to_string(),
                block: display_as_block,
                position: None,
            })
        }
    }

    fn math(kind: MathKind, expression: &str, open: usize) -> MathMatch {
        let len = expression.chars().count();
        MathMatch {
            kind,
            expression: expression.to_string(),
            open_marker_from: open,
            open_marker_to: open + 2,
            close_marker_from: open + 2 + len,
            close_marker_to: open + 4 + len,
        }
    }

    fn view(text: &str, selection: Option<Selection>) -> Vec<Decoration<TestUnit>> {
        let rope = EditorRope::from(text);
        let mut capability = MathCapability::new();
        capability.install(TestRenderer);
        build_view(
            &rope,
            &Viewport::whole(&rope),
            selection.as_ref(),
            capability.context(),
            &DecorationConfig::default(),
        )
        .decorations
    }

    #[test]
    fn test_unit_position_inline_is_exact() {
        let m = math(MathKind::Inline, "\nx\n", 0);
        assert_eq!(unit_position(&m), TextRange::new(2, 5));
    }

    #[test]
    fn test_unit_position_block_trims_newlines() {
        let m = math(MathKind::Block, "\nx\n", 0);
        assert_eq!(unit_position(&m), TextRange::new(3, 4));
    }

    #[test]
    fn test_unit_position_never_crosses_markers() {
        let m = math(MathKind::Block, "\n", 10);
        assert_eq!(unit_position(&m), TextRange::new(12, 13));
        let m = math(MathKind::Block, "", 10);
        assert_eq!(unit_position(&m), TextRange::new(12, 12));
    }

    #[test]
    fn test_strong_decorations() {
        let decorations = view("**b**", None);
        assert_eq!(
            decorations,
            vec![
                Decoration::Mark {
                    range: TextRange::new(0, 2),
                    class: "lp-strong-marker-fix".into()
                },
                Decoration::Mark {
                    range: TextRange::new(2, 3),
                    class: "lp-strong-fix".into()
                },
                Decoration::Mark {
                    range: TextRange::new(3, 5),
                    class: "lp-strong-marker-fix".into()
                },
            ]
        );
    }

    #[test]
    fn test_visible_markers_keep_content_mark() {
        let decorations = view("**b**", Some(Selection::caret(0)));
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].range(), TextRange::new(2, 3));
    }

    #[test]
    fn test_math_replacement() {
        let decorations = view("a \\(x\\)", None);
        assert_eq!(
            decorations,
            vec![Decoration::Replace {
                range: TextRange::new(2, 7),
                unit: TestUnit {
                    expression: "x".into(),
                    block: false,
                    position: Some((4, 5)),
                },
            }]
        );
    }

    #[test]
    fn test_suppressed_math_has_no_replacement() {
        assert!(view("a \\(x\\)", Some(Selection::caret(4))).is_empty());
    }

    #[test]
    fn test_render_failure_keeps_source_and_continues() {
        let decorations = view("\\(bad\\) \\(good\\)", None);
        assert_eq!(decorations.len(), 1);
        assert!(decorations[0].is_replace());
        assert_eq!(decorations[0].range(), TextRange::new(8, 16));
    }

    #[test]
    fn test_no_renderer_no_replacements() {
        let rope = EditorRope::from("**a** \\(x\\)");
        let capability: MathCapability<TestRenderer> = MathCapability::new();
        let view = build_view(
            &rope,
            &Viewport::whole(&rope),
            None,
            capability.context(),
            &DecorationConfig::default(),
        );
        assert_eq!(view.epoch, 0);
        assert_eq!(view.output.math.len(), 1);
        assert!(view.decorations.iter().all(|d| !d.is_replace()));
    }

    #[test]
    fn test_overlapping_replacements_are_dropped() {
        let output = ScanOutput {
            strong: vec![],
            math: vec![
                crate::visibility::decide_math(math(MathKind::Inline, "x", 5), None),
                crate::visibility::decide_math(math(MathKind::Block, "abcdefgh", 0), None),
            ],
        };
        let decorations = build_decorations(&output, Some(&TestRenderer), &DecorationConfig::default());
        assert_eq!(decorations.len(), 1);
        assert_eq!(decorations[0].range(), TextRange::new(5, 10));
    }

    #[test]
    fn test_block_replacement_position() {
        let decorations = view("\\[\nx\n\\]", None);
        let Decoration::Replace { unit, .. } = &decorations[0] else {
            panic!("expected a replacement");
        };
        assert!(unit.block);
        assert_eq!(unit.position, Some((3, 4)));
    }
}
