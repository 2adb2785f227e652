//! Trace builder trait and implementations
//!
//! Each graph variant family is implemented as its own unit struct behind the
//! [`TraceBuilder`] trait, and [`Builder`] wraps the trait object for the
//! dispatcher.
//!
//! # Architecture
//!
//! - `TraceBuilder`: trait every variant family implements
//! - `Builder`: cheap, cloneable wrapper holding an `Arc<dyn TraceBuilder>`
//! - `Builder::for_type`: maps a [`GraphType`] to its builder; composite and
//!   unsupported tags have none
//!
//! # Example
//!
//! ```rust,ignore
//! use graphspec::plot::{Builder, GraphType};
//!
//! let builder = Builder::for_type(&GraphType::Function2D).unwrap();
//! assert_eq!(builder.to_string(), "function_2d");
//! ```

use std::sync::Arc;

use crate::plot::diagnostic::BuildContext;
use crate::plot::style::{line_dash, marker_symbol, marker_symbol_3d};
use crate::plot::trace::{Color, Line, Marker, Trace};
use crate::plot::types::{Dimension, GraphSpec, GraphType, Style};
use crate::{GraphSpecError, Result};

// Builder implementations
mod field;
mod field3d;
mod function;
mod parametric;
mod points;
mod stats;
mod surface;

pub use field::{PhasePlane, VectorField2D};
pub use field3d::VectorField3D;
pub use function::{Cartesian, FunctionCurve};
pub use parametric::{Parametric2D, Parametric3D};
pub use points::{Line2D, MultiScatter, Point2D, Point3D, Scatter2D, Scatter3D};
pub use stats::{Bar, Histogram, Pie};
pub use surface::FunctionSurface;

/// Core trait for trace builders
///
/// Builders are pure: the same spec always yields the same traces. Data
/// problems are returned as `Err` and become diagnostics in the dispatcher.
pub trait TraceBuilder: std::fmt::Debug + std::fmt::Display + Send + Sync {
    /// Build the traces for one (non-composite) spec or layer
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>>;
}

/// Wrapper struct for builder trait objects
#[derive(Clone)]
pub struct Builder(Arc<dyn TraceBuilder>);

impl Builder {
    /// The builder for a graph type; `None` for composite and unsupported tags
    pub fn for_type(graph_type: &GraphType) -> Option<Self> {
        let builder: Arc<dyn TraceBuilder> = match graph_type {
            GraphType::Function2D => Arc::new(FunctionCurve),
            GraphType::Cartesian => Arc::new(Cartesian),
            GraphType::Parametric2D => Arc::new(Parametric2D),
            GraphType::Parametric3D => Arc::new(Parametric3D),
            GraphType::Function3D => Arc::new(FunctionSurface),
            GraphType::Vector2D => Arc::new(VectorField2D),
            GraphType::PhasePlane => Arc::new(PhasePlane),
            GraphType::VectorField3D => Arc::new(VectorField3D),
            GraphType::Scatter2D => Arc::new(Scatter2D),
            GraphType::Line2D => Arc::new(Line2D),
            GraphType::Point2D => Arc::new(Point2D),
            GraphType::MultiScatter2D => Arc::new(MultiScatter),
            GraphType::Scatter3D => Arc::new(Scatter3D),
            GraphType::Point3D => Arc::new(Point3D),
            GraphType::Histogram2D => Arc::new(Histogram),
            GraphType::Bar2D => Arc::new(Bar),
            GraphType::Pie2D => Arc::new(Pie),
            GraphType::Composite2D | GraphType::Composite3D | GraphType::Unsupported(_) => {
                return None
            }
        };
        Some(Self(builder))
    }

    /// Build traces for a spec
    pub fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        self.0.build(spec, ctx)
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builder::{:?}", self.0)
    }
}

impl std::fmt::Display for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Require exactly `n` expressions for a variant
pub(crate) fn require_arity(
    graph_type: &str,
    expressions: &[String],
    n: usize,
) -> Result<()> {
    if expressions.len() == n {
        Ok(())
    } else {
        Err(GraphSpecError::ArityError(format!(
            "{} requires {} expressions, got {}",
            graph_type,
            n,
            expressions.len()
        )))
    }
}

/// Require at least one expression
pub(crate) fn require_expressions(graph_type: &str, expressions: &[String]) -> Result<()> {
    if expressions.is_empty() {
        Err(GraphSpecError::ArityError(format!(
            "{} requires at least one expression",
            graph_type
        )))
    } else {
        Ok(())
    }
}

/// Require literal data for a data-driven variant
pub(crate) fn require_data<'a>(
    graph_type: &str,
    spec: &'a GraphSpec,
) -> Result<&'a serde_json::Value> {
    spec.literal_data().ok_or_else(|| {
        GraphSpecError::DataError(format!("{} requires 'data' or 'coordinates'", graph_type))
    })
}

/// Line attributes for the `index`-th trace of a layer
pub(crate) fn line_from_style(style: &Style, index: usize) -> Option<Line> {
    let line = Line {
        color: style.color_at(index),
        width: style.line_width(),
        dash: style
            .line_style()
            .as_deref()
            .and_then(line_dash)
            .map(String::from),
    };
    (line != Line::default()).then_some(line)
}

/// Marker attributes for the `index`-th trace of a layer
pub(crate) fn marker_from_style(style: &Style, index: usize, dim: Dimension) -> Option<Marker> {
    let symbol = style.marker().and_then(|name| match dim {
        Dimension::Two => marker_symbol(&name),
        Dimension::Three => marker_symbol_3d(&name),
    });
    let marker = Marker {
        color: style.color_at(index).map(Color::One),
        size: style.marker_size(),
        symbol: symbol.map(String::from),
        ..Default::default()
    };
    (marker != Marker::default()).then_some(marker)
}

/// Apply line styling, opacity and an explicit legend name
pub(crate) fn style_line_trace(trace: &mut Trace, style: &Style, index: usize) {
    trace.line = line_from_style(style, index);
    trace.opacity = style.opacity();
    if let Some(name) = style.name() {
        trace.name = Some(name);
    }
}

/// Apply marker styling, opacity and an explicit legend name
pub(crate) fn style_marker_trace(trace: &mut Trace, style: &Style, index: usize, dim: Dimension) {
    trace.marker = marker_from_style(style, index, dim);
    trace.opacity = style.opacity();
    if let Some(name) = style.name() {
        trace.name = Some(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::types::{ColorSpec, Scalar};

    #[test]
    fn test_every_drawable_type_has_builder() {
        for tag in [
            "function_2d",
            "parametric_2d",
            "phase_plane",
            "scatter_2d",
            "line_2d",
            "point_2d",
            "histogram_2d",
            "vector_2d",
            "pie_2d",
            "bar_2d",
            "multi_scatter_2d",
            "cartesian",
            "function_3d",
            "parametric_3d",
            "scatter_3d",
            "point_3d",
            "vector_field_3d",
        ] {
            let builder = Builder::for_type(&GraphType::parse(tag));
            assert!(builder.is_some(), "no builder for {}", tag);
        }
    }

    #[test]
    fn test_composite_and_unsupported_have_no_builder() {
        assert!(Builder::for_type(&GraphType::Composite2D).is_none());
        assert!(Builder::for_type(&GraphType::Composite3D).is_none());
        assert!(Builder::for_type(&GraphType::parse("polar_2d")).is_none());
    }

    #[test]
    fn test_builder_display_is_wire_tag() {
        let builder = Builder::for_type(&GraphType::VectorField3D).unwrap();
        assert_eq!(builder.to_string(), "vector_field_3d");
    }

    #[test]
    fn test_require_arity_message() {
        let err = require_arity("parametric_2d", &["cos(t)".to_string()], 2).unwrap_err();
        assert!(matches!(err, GraphSpecError::ArityError(_)));
        assert!(err.to_string().contains("requires 2 expressions, got 1"));
    }

    #[test]
    fn test_line_from_style() {
        assert_eq!(line_from_style(&Style::default(), 0), None);

        let style = Style {
            color: Some(ColorSpec::Many(vec!["red".into(), "blue".into()])),
            line_width: Some(Scalar::Text("3".into())),
            line_style: Some("dashed".into()),
            ..Default::default()
        };
        let line = line_from_style(&style, 1).unwrap();
        assert_eq!(line.color.as_deref(), Some("blue"));
        assert_eq!(line.width, Some(3.0));
        assert_eq!(line.dash.as_deref(), Some("dash"));
    }

    #[test]
    fn test_marker_from_style_uses_3d_table() {
        let style = Style {
            marker: Some("triangle".into()),
            ..Default::default()
        };
        let m2 = marker_from_style(&style, 0, Dimension::Two).unwrap();
        let m3 = marker_from_style(&style, 0, Dimension::Three).unwrap();
        assert_eq!(m2.symbol.as_deref(), Some("triangle-up"));
        assert_eq!(m3.symbol.as_deref(), Some("diamond"));
    }
}
