//! Trace validation.
//!
//! A post-build sanity check: a handful of `NaN`s from asymptotes or domain
//! errors is normal, but output that is mostly non-finite means the expression
//! or domain is wrong and should surface as an error instead of an empty chart.

use crate::plot::Trace;
use crate::GraphSpecError;
use serde::Serialize;

/// Fraction of non-finite values above which a trace list is rejected
pub const DEFAULT_INVALID_THRESHOLD: f64 = 0.8;

// ============================================================================
// Core Types
// ============================================================================

/// Result of [`validate_traces`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }

    /// Convert into a `Result`, for callers that propagate with `?`
    pub fn into_result(self) -> crate::Result<()> {
        match self.error {
            Some(message) if !self.valid => Err(GraphSpecError::ValidationError(message)),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Validate with the default 80% threshold
pub fn validate_traces(traces: &[Trace]) -> Validation {
    validate_traces_with(traces, DEFAULT_INVALID_THRESHOLD)
}

/// Validate a trace list.
///
/// Scans every numeric coordinate (`x`, `y`, `z`, `u`, `v`, `w`, series and
/// grids) and fails when the non-finite share exceeds `threshold`. An empty
/// list always fails. Traces that carry no coordinates at all (a pie) pass.
pub fn validate_traces_with(traces: &[Trace], threshold: f64) -> Validation {
    if traces.is_empty() {
        return Validation::fail("nothing to render");
    }

    let (total, invalid) = traces
        .iter()
        .flat_map(Trace::coordinates)
        .flat_map(|values| values.numbers())
        .fold((0usize, 0usize), |(total, invalid), v| {
            (total + 1, invalid + usize::from(!v.is_finite()))
        });

    if total == 0 {
        return Validation::ok();
    }

    let ratio = invalid as f64 / total as f64;
    if ratio > threshold {
        tracing::warn!(invalid, total, "traces rejected");
        return Validation::fail(format!(
            "{:.1}% of plotted values are invalid (NaN or infinite); check the expression and domain",
            ratio * 100.0
        ));
    }
    Validation::ok()
}
