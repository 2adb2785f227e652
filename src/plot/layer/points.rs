//! Literal point builders
//!
//! Scatter, line and point variants in 2D and 3D. None of these evaluate
//! expressions; coordinates come from `data` or `coordinates` and only the
//! style tables are applied.

use super::{require_data, style_line_trace, style_marker_trace, TraceBuilder};
use crate::plot::data::{points_2d, points_3d, series, Points};
use crate::plot::diagnostic::BuildContext;
use crate::plot::trace::{Color, Trace, TraceMode};
use crate::plot::types::{Dimension, GraphSpec};
use crate::Result;

/// Markers-only scatter
#[derive(Debug, Clone, Copy)]
pub struct Scatter2D;

impl TraceBuilder for Scatter2D {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        marker_points_2d("scatter_2d", spec)
    }
}

impl std::fmt::Display for Scatter2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scatter_2d")
    }
}

/// Polyline through the points in the order given
#[derive(Debug, Clone, Copy)]
pub struct Line2D;

impl TraceBuilder for Line2D {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let pts = points_2d(require_data("line_2d", spec)?)?;
        let mode = if spec.style.marker().is_some() {
            TraceMode::LinesMarkers
        } else {
            TraceMode::Lines
        };
        let mut trace = Trace::scatter(pts.x, pts.y, mode).with_name("line");
        style_line_trace(&mut trace, &spec.style, 0);
        if spec.style.marker().is_some() {
            style_marker_trace(&mut trace, &spec.style, 0, Dimension::Two);
        }
        Ok(vec![trace])
    }
}

impl std::fmt::Display for Line2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line_2d")
    }
}

/// Labelled points; a third string column becomes point text
#[derive(Debug, Clone, Copy)]
pub struct Point2D;

impl TraceBuilder for Point2D {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        marker_points_2d("point_2d", spec)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "point_2d")
    }
}

/// Several named scatter series, one trace each
#[derive(Debug, Clone, Copy)]
pub struct MultiScatter;

impl TraceBuilder for MultiScatter {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let all = series(require_data("multi_scatter_2d", spec)?)?;
        let traces = all
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let mut trace = marker_trace_2d(s.points);
                style_marker_trace(&mut trace, &spec.style, i, Dimension::Two);
                trace.name = Some(s.name.unwrap_or_else(|| format!("series {}", i + 1)));
                if let Some(color) = s.color {
                    let marker = trace.marker.get_or_insert_with(Default::default);
                    marker.color = Some(Color::One(color));
                }
                trace
            })
            .collect();
        Ok(traces)
    }
}

impl std::fmt::Display for MultiScatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "multi_scatter_2d")
    }
}

/// 3D markers
#[derive(Debug, Clone, Copy)]
pub struct Scatter3D;

impl TraceBuilder for Scatter3D {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        marker_points_3d("scatter_3d", spec)
    }
}

impl std::fmt::Display for Scatter3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scatter_3d")
    }
}

/// Labelled 3D points
#[derive(Debug, Clone, Copy)]
pub struct Point3D;

impl TraceBuilder for Point3D {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        marker_points_3d("point_3d", spec)
    }
}

impl std::fmt::Display for Point3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "point_3d")
    }
}

// =============================================================================
// Shared
// =============================================================================

/// One styled marker trace from the spec's literal 2D points
pub(super) fn marker_points_2d(graph_type: &str, spec: &GraphSpec) -> Result<Vec<Trace>> {
    let pts = points_2d(require_data(graph_type, spec)?)?;
    let mut trace = marker_trace_2d(pts).with_name("points");
    style_marker_trace(&mut trace, &spec.style, 0, Dimension::Two);
    Ok(vec![trace])
}

fn marker_points_3d(graph_type: &str, spec: &GraphSpec) -> Result<Vec<Trace>> {
    let pts = points_3d(require_data(graph_type, spec)?)?;
    let text = pts.text();
    let mode = if text.is_some() {
        TraceMode::MarkersText
    } else {
        TraceMode::Markers
    };
    let mut trace = Trace::scatter3d(pts.x, pts.y, pts.z, mode).with_name("points");
    trace.text = text;
    style_marker_trace(&mut trace, &spec.style, 0, Dimension::Three);
    Ok(vec![trace])
}

fn marker_trace_2d(pts: Points) -> Trace {
    let text = pts.text();
    let mode = if text.is_some() {
        TraceMode::MarkersText
    } else {
        TraceMode::Markers
    };
    let mut trace = Trace::scatter(pts.x, pts.y, mode);
    trace.text = text;
    trace
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::plot::trace::TraceKind;
    use crate::GraphSpecError;
    use serde_json::json;

    fn build(builder: &dyn TraceBuilder, value: serde_json::Value) -> Result<Vec<Trace>> {
        let spec: GraphSpec = serde_json::from_value(value).unwrap();
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        builder.build(&spec, &mut ctx)
    }

    #[test]
    fn test_scatter_markers() {
        let traces = build(&Scatter2D, json!({"data": [[0, 1], [2, 3]]})).unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].mode, Some(TraceMode::Markers));
        assert_eq!(traces[0].y.as_ref().unwrap().as_series().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_point_labels_become_text() {
        let traces = build(
            &Point2D,
            json!({"coordinates": [[0, 0, "O"], [1, 1, "A"]], "style": {"marker": "s"}}),
        )
        .unwrap();
        assert_eq!(traces[0].mode, Some(TraceMode::MarkersText));
        assert_eq!(traces[0].text, Some(vec!["O".to_string(), "A".to_string()]));
        assert_eq!(
            traces[0].marker.as_ref().unwrap().symbol.as_deref(),
            Some("square")
        );
    }

    #[test]
    fn test_line_keeps_order_and_dash() {
        let traces = build(
            &Line2D,
            json!({"data": [[2, 0], [0, 1], [1, 2]], "style": {"lineStyle": "dotted"}}),
        )
        .unwrap();
        assert_eq!(traces[0].mode, Some(TraceMode::Lines));
        assert_eq!(traces[0].x.as_ref().unwrap().as_series().unwrap(), &[2.0, 0.0, 1.0]);
        assert_eq!(traces[0].line.as_ref().unwrap().dash.as_deref(), Some("dot"));
    }

    #[test]
    fn test_line_with_marker_keeps_both() {
        let traces = build(
            &Line2D,
            json!({"data": [[0, 0], [1, 1]], "style": {"marker": "o", "color": "green"}}),
        )
        .unwrap();
        assert_eq!(traces[0].mode, Some(TraceMode::LinesMarkers));
        assert!(traces[0].line.is_some());
        assert!(traces[0].marker.is_some());
    }

    #[test]
    fn test_multi_scatter_series() {
        let traces = build(
            &MultiScatter,
            json!({"data": [
                {"name": "A", "data": [[0, 0]], "color": "red"},
                {"data": [[1, 1], [2, 2]]}
            ]}),
        )
        .unwrap();
        assert_eq!(traces.len(), 2);
        assert_eq!(traces[0].name.as_deref(), Some("A"));
        assert_eq!(
            traces[0].marker.as_ref().unwrap().color,
            Some(Color::One("red".to_string()))
        );
        assert_eq!(traces[1].name.as_deref(), Some("series 2"));
    }

    #[test]
    fn test_scatter_3d() {
        let traces = build(&Scatter3D, json!({"data": [[0, 1, 2], [3, 4, 5]]})).unwrap();
        assert_eq!(traces[0].kind, TraceKind::Scatter3d);
        assert_eq!(traces[0].z.as_ref().unwrap().as_series().unwrap(), &[2.0, 5.0]);
    }

    #[test]
    fn test_point_3d_needs_three_columns() {
        let err = build(&Point3D, json!({"coordinates": [[0, 1]]})).unwrap_err();
        assert!(matches!(err, GraphSpecError::DataError(_)));
    }

    #[test]
    fn test_missing_data_is_error() {
        let err = build(&Scatter2D, json!({"type": "scatter_2d"})).unwrap_err();
        assert!(err.to_string().contains("requires 'data'"));
    }
}
