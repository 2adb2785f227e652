//! Plot types and trace building for graph specifications
//!
//! This module contains the types that represent a parsed `<graph_spec>` and
//! everything needed to turn one into renderer-ready traces.
//!
//! # Architecture
//!
//! The module is organized into submodules:
//!
//! - `types` - Input types: GraphSpec, GraphType, RangeSpec, SamplingSpec, Style
//! - `resolve` - Domain and sampling normalizers
//! - `expression` - Expression compilation and evaluation
//! - `data` - Literal data extraction
//! - `style` - Dash and marker name tables
//! - `trace` - Output trace records
//! - `diagnostic` - Build diagnostics and per-call context
//! - `layer` - TraceBuilder trait and one builder per variant family
//! - `dispatch` - Type inference and composite dispatch

pub mod data;
pub mod diagnostic;
pub mod dispatch;
pub mod expression;
pub mod layer;
pub mod resolve;
pub mod style;
pub mod trace;
pub mod types;

// Re-export the main types for convenience
pub use diagnostic::{BuildContext, Diagnostic, Level};
pub use dispatch::{build_traces, dispatch, infer_type, BuildOutput};
pub use layer::{Builder, TraceBuilder};
pub use trace::{Color, Line, Marker, Trace, TraceKind, TraceMode, Values};
pub use types::*;
