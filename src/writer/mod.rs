//! Output writer abstraction layer for graphspec
//!
//! The writer module turns a parsed spec plus its built traces into a figure
//! a charting library can display.
//!
//! # Architecture
//!
//! All writers implement the `Writer` trait, which provides:
//! - Spec + Traces → figure object conversion
//! - Spec + Traces → Output conversion
//! - Validation for writer compatibility
//!
//! The [`crate::execute`] pipeline only needs the figure object, so it runs
//! with any writer.
//!
//! # Example
//!
//! ```rust
//! use graphspec::config::RenderConfig;
//! use graphspec::parser::tokenize;
//! use graphspec::plot::build_traces;
//! use graphspec::writer::{PlotlyWriter, Writer};
//!
//! let doc = r#"<graph_spec>{"type": "function_2d", "expression": "x^2"}</graph_spec>"#;
//! let spec = tokenize(doc).unwrap().spec().unwrap();
//! let output = build_traces(&spec, &RenderConfig::default());
//!
//! let json = PlotlyWriter::new().write(&spec, &output.traces).unwrap();
//! assert!(json.contains("\"data\""));
//! ```

use crate::plot::{BuildOutput, GraphSpec, Trace};
use crate::Result;
use serde_json::Value;

#[cfg(feature = "plotly")]
pub mod plotly;

#[cfg(feature = "plotly")]
pub use plotly::{PlotlyWriter, Theme};

/// Trait for visualization output writers
///
/// # Associated Types
///
/// * `Output` - The type returned by `write()` and `render()`; `String` for
///   JSON text.
pub trait Writer {
    /// The output type produced by this writer.
    type Output;

    /// Generate output from a spec and the traces built for it
    ///
    /// # Errors
    ///
    /// Returns `GraphSpecError::WriterError` if the spec is incompatible with
    /// this writer or serialization fails.
    fn write(&self, spec: &GraphSpec, traces: &[Trace]) -> Result<Self::Output>;

    /// Build the figure as a JSON object, the shape embedded in
    /// [`crate::execute::RenderOutcome::Chart`]
    fn figure(&self, spec: &GraphSpec, traces: &[Trace]) -> Result<Value>;

    /// Check that a spec can be rendered by this writer without generating
    /// output.
    fn validate(&self, spec: &GraphSpec) -> Result<()>;

    /// Render the traces of a finished build
    fn render(&self, spec: &GraphSpec, output: &BuildOutput) -> Result<Self::Output> {
        self.validate(spec)?;
        self.write(spec, &output.traces)
    }
}
