//! Errors surfaced by external capabilities.
//!
//! The scanners themselves never fail; they only return fewer matches. The
//! only fallible seam is the math renderer supplied by the host.

use miette::Diagnostic;

/// Failure to turn a math expression into a rendered unit.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum RenderError {
    /// The expression could not be parsed or laid out.
    #[error("invalid math expression `{expression}`: {message}")]
    #[diagnostic(code(livemark::render::expression))]
    Expression { expression: String, message: String },

    /// The rendering backend itself failed.
    #[error("math renderer failed: {0}")]
    #[diagnostic(code(livemark::render::backend))]
    Backend(String),
}

impl RenderError {
    pub fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
