//! Error type for tensor construction, formula compilation and solving.
//!
//! Unsatisfiability is not an error: solving returns `Ok(None)` and model
//! enumeration simply ends. Programmer errors (indices out of range, foreign
//! literals, aggregate misuse) panic instead of producing an `Error`.

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Errors reported by the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Two operands of an elementwise or contraction operation disagree in shape.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    /// An axis map, fold width or element count does not fit the tensor.
    #[error("invalid axes: {0}")]
    InvalidAxes(String),

    /// Axis labels of a contraction are inconsistent.
    #[error("invalid labels: {0}")]
    InvalidLabels(String),

    /// Input text or data could not be decoded.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A formula asked for a tensor variable that was never declared.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// The SAT engine itself failed.
    #[error("SAT engine failure: {0}")]
    Engine(String),
}

impl Error {
    /// True for every error caused by bad caller input rather than the engine.
    ///
    /// Retrying such a call without fixing its arguments cannot succeed.
    pub fn is_malformed_input(&self) -> bool {
        !matches!(self, Error::Engine(_))
    }

    pub(crate) fn shape_mismatch(op: &'static str, left: &[usize], right: &[usize]) -> Self {
        Error::ShapeMismatch {
            op,
            left: left.to_vec(),
            right: right.to_vec(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Render a labelled report pointing at `span` inside `source`.
pub(crate) fn render_report(source: &str, span: std::ops::Range<usize>, message: &str) -> String {
    let mut output = Vec::new();

    let written = Report::build(ReportKind::Error, (), span.start)
        .with_config(Config::default().with_color(false))
        .with_message("Malformed input")
        .with_label(
            Label::new(span)
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .write(Source::from(source), &mut output);

    match written {
        Ok(()) => String::from_utf8(output).unwrap_or_else(|_| message.to_string()),
        Err(_) => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_grouping() {
        assert!(Error::shape_mismatch("map2", &[2], &[3]).is_malformed_input());
        assert!(Error::UnknownVariable("f".into()).is_malformed_input());
        assert!(!Error::Engine("boom".into()).is_malformed_input());
    }

    #[test]
    fn test_report_mentions_message() {
        let report = render_report("01x", 2..3, "unexpected 'x'");
        assert!(report.contains("unexpected 'x'"));
    }
}
