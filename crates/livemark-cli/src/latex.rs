//! LaTeX math rendering via pulldown-latex → MathML

use livemark_core::{MathRenderer, RenderError, RenderedUnit};
use pulldown_latex::{
    config::DisplayMode, config::RenderConfig, mathml::push_mathml, Parser, Storage,
};
use serde::Serialize;

/// A rendered MathML fragment and the source range it stands for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MathMlUnit {
    pub mathml: String,
    pub block: bool,
    pub content_from: usize,
    pub content_to: usize,
}

impl RenderedUnit for MathMlUnit {
    fn set_position(&mut self, content_from: usize, content_to: usize) {
        self.content_from = content_from;
        self.content_to = content_to;
    }
}

/// Renders expressions to MathML with pulldown-latex.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathMlRenderer;

impl MathRenderer for MathMlRenderer {
    type Unit = MathMlUnit;

    fn render(&self, expression: &str, display_as_block: bool) -> Result<MathMlUnit, RenderError> {
        let storage = Storage::new();
        let parser = Parser::new(expression, &storage);
        let config = RenderConfig {
            display_mode: if display_as_block {
                DisplayMode::Block
            } else {
                DisplayMode::Inline
            },
            ..Default::default()
        };

        // Collect events, tracking any errors
        let events: Vec<_> = parser.collect();
        let errors: Vec<String> = events
            .iter()
            .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
            .collect();
        if !errors.is_empty() {
            return Err(RenderError::expression(expression, errors.join("; ")));
        }

        let mut mathml = String::new();
        push_mathml(&mut mathml, events.into_iter(), config)
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        Ok(MathMlUnit {
            mathml,
            block: display_as_block,
            content_from: 0,
            content_to: 0,
        })
    }
}
