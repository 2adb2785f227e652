//! End-to-end rendering of a chat message
//!
//! Runs tokenizer, dispatcher, validator and writer in sequence and reports
//! the result as a [`RenderOutcome`] value. Nothing in this chain panics on bad
//! input; every failure mode is a variant the caller can display. Any
//! [`Writer`] can produce the figure.

use crate::config::RenderConfig;
use crate::parser::{self, Segment, TokenizeResult};
use crate::plot::{build_traces, infer_type, Diagnostic, Dimension, GraphSpec, GraphType, Level};
use crate::validate::validate_traces_with;
use crate::writer::Writer;
use crate::Result;
use serde::Serialize;
use serde_json::Value;

/// What happened to one `<graph_spec>` block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// A Plotly figure ready to display
    Chart {
        figure: Value,
        diagnostics: Vec<Diagnostic>,
    },
    /// The block is not valid JSON after constant substitution
    ParseFailed { raw: String, error: String },
    /// The `type` tag names no known variant
    Unsupported { graph_type: String },
    /// No traces could be built, or the figure could not be written
    RenderFailed {
        error: String,
        diagnostics: Vec<Diagnostic>,
    },
    /// Traces were built but are dominated by non-finite values
    Invalid {
        error: String,
        diagnostics: Vec<Diagnostic>,
    },
}

impl RenderOutcome {
    pub fn is_chart(&self) -> bool {
        matches!(self, RenderOutcome::Chart { .. })
    }

    /// User-facing error message, if this is not a chart
    pub fn error(&self) -> Option<String> {
        match self {
            RenderOutcome::Chart { .. } => None,
            RenderOutcome::ParseFailed { error, .. }
            | RenderOutcome::RenderFailed { error, .. }
            | RenderOutcome::Invalid { error, .. } => Some(error.clone()),
            RenderOutcome::Unsupported { graph_type } => {
                Some(crate::GraphSpecError::UnsupportedType(graph_type.clone()).to_string())
            }
        }
    }
}

/// Render the first `<graph_spec>` block of `text`.
///
/// Returns `None` when the text holds no complete block.
pub fn execute_document<W: Writer + ?Sized>(
    text: &str,
    config: &RenderConfig,
    writer: &W,
) -> Option<RenderOutcome> {
    parser::tokenize(text).map(|result| execute_block(result, config, writer))
}

/// Render every complete `<graph_spec>` block of `text`, in document order
pub fn execute_all<W: Writer + ?Sized>(
    text: &str,
    config: &RenderConfig,
    writer: &W,
) -> Result<Vec<RenderOutcome>> {
    let outcomes = parser::split_document(text)?
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Graph(result) => Some(execute_block(result, config, writer)),
            _ => None,
        })
        .collect();
    Ok(outcomes)
}

fn execute_block<W: Writer + ?Sized>(
    result: TokenizeResult<GraphSpec>,
    config: &RenderConfig,
    writer: &W,
) -> RenderOutcome {
    match result {
        TokenizeResult::Success { spec, .. } => execute_spec(&spec, config, writer),
        TokenizeResult::Error { raw, error } => RenderOutcome::ParseFailed { raw, error },
    }
}

/// Build, validate and write one parsed spec
pub fn execute_spec<W: Writer + ?Sized>(
    spec: &GraphSpec,
    config: &RenderConfig,
    writer: &W,
) -> RenderOutcome {
    if let GraphType::Unsupported(tag) = infer_type(spec, Dimension::Two) {
        return RenderOutcome::Unsupported { graph_type: tag };
    }
    if let Err(e) = writer.validate(spec) {
        return RenderOutcome::RenderFailed {
            error: e.to_string(),
            diagnostics: Vec::new(),
        };
    }

    let output = build_traces(spec, config);
    if output.traces.is_empty() {
        let error = output
            .diagnostics
            .iter()
            .find(|d| d.level == Level::Error)
            .or_else(|| output.diagnostics.first())
            .map(ToString::to_string)
            .unwrap_or_else(|| "nothing to render".to_string());
        return RenderOutcome::RenderFailed {
            error,
            diagnostics: output.diagnostics,
        };
    }

    let validation = validate_traces_with(&output.traces, config.invalid_threshold);
    if let Some(error) = validation.error.filter(|_| !validation.valid) {
        return RenderOutcome::Invalid {
            error,
            diagnostics: output.diagnostics,
        };
    }

    match writer.figure(spec, &output.traces) {
        Ok(figure) => RenderOutcome::Chart {
            figure,
            diagnostics: output.diagnostics,
        },
        Err(e) => RenderOutcome::RenderFailed {
            error: e.to_string(),
            diagnostics: output.diagnostics,
        },
    }
}
