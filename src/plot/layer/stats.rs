//! Category and distribution builders: histogram, bar and pie

use super::{marker_from_style, require_data, TraceBuilder};
use crate::plot::data::{categories, flat_values};
use crate::plot::diagnostic::BuildContext;
use crate::plot::trace::{Color, Marker, Trace, TraceKind, Values};
use crate::plot::types::{Dimension, GraphSpec};
use crate::Result;

/// Histogram over flat sample values; binning is left to the renderer
#[derive(Debug, Clone, Copy)]
pub struct Histogram;

impl TraceBuilder for Histogram {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let values = flat_values(require_data("histogram_2d", spec)?)?;
        let bins = spec.bin_count();
        tracing::debug!(values = values.len(), bins = ?bins, "histogram");
        let mut trace = Trace::new(TraceKind::Histogram).with_name(legend_name(spec, "histogram"));
        trace.x = Some(Values::Series(values));
        trace.nbinsx = bins;
        trace.marker = marker_from_style(&spec.style, 0, Dimension::Two);
        trace.opacity = spec.style.opacity();
        Ok(vec![trace])
    }
}

impl std::fmt::Display for Histogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "histogram_2d")
    }
}

/// Vertical bars, one per category
#[derive(Debug, Clone, Copy)]
pub struct Bar;

impl TraceBuilder for Bar {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let data = require_data("bar_2d", spec)?;
        let labels = spec.label_names();
        let (names, values) = categories(data, labels.as_deref())?;
        let colors = category_colors(spec, names.len());

        let mut trace = Trace::new(TraceKind::Bar).with_name(legend_name(spec, "bar"));
        trace.x = Some(Values::Labels(names));
        trace.y = Some(Values::Series(values));
        trace.marker = match colors {
            Some(colors) => Some(Marker {
                color: Some(Color::Many(colors)),
                ..Default::default()
            }),
            None => marker_from_style(&spec.style, 0, Dimension::Two),
        };
        trace.opacity = spec.style.opacity();
        Ok(vec![trace])
    }
}

impl std::fmt::Display for Bar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bar_2d")
    }
}

/// Pie slices from category labels and values
#[derive(Debug, Clone, Copy)]
pub struct Pie;

impl TraceBuilder for Pie {
    fn build(&self, spec: &GraphSpec, _ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let data = require_data("pie_2d", spec)?;
        let labels = spec.label_names();
        let (names, values) = categories(data, labels.as_deref())?;
        let colors = category_colors(spec, names.len());

        let mut trace = Trace::new(TraceKind::Pie).with_name(legend_name(spec, "pie"));
        trace.labels = Some(names);
        trace.values = Some(values);
        trace.marker = colors.map(|colors| Marker {
            colors: Some(colors),
            ..Default::default()
        });
        trace.opacity = spec.style.opacity();
        Ok(vec![trace])
    }
}

impl std::fmt::Display for Pie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pie_2d")
    }
}

fn legend_name(spec: &GraphSpec, default: &str) -> String {
    spec.style.name().unwrap_or_else(|| default.to_string())
}

/// One color per category when the style gives a color list
fn category_colors(spec: &GraphSpec, count: usize) -> Option<Vec<String>> {
    let colors = spec.style.color_list()?;
    Some((0..count).map(|i| colors[i % colors.len()].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::GraphSpecError;
    use serde_json::json;

    fn build(builder: &dyn TraceBuilder, value: serde_json::Value) -> Result<Vec<Trace>> {
        let spec: GraphSpec = serde_json::from_value(value).unwrap();
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        builder.build(&spec, &mut ctx)
    }

    #[test]
    fn test_histogram_values_and_bins() {
        let traces = build(&Histogram, json!({"data": [1, 2, 2, 3, "oops"], "bins": 3})).unwrap();
        let t = &traces[0];
        assert_eq!(t.kind, TraceKind::Histogram);
        assert_eq!(t.x.as_ref().unwrap().as_series().unwrap(), &[1.0, 2.0, 2.0, 3.0]);
        assert_eq!(t.nbinsx, Some(3));
    }

    #[test]
    fn test_bar_from_pairs() {
        let traces = build(&Bar, json!({"data": [["A", 3], ["B", 5]]})).unwrap();
        let t = &traces[0];
        assert_eq!(t.kind, TraceKind::Bar);
        assert_eq!(
            t.x,
            Some(Values::Labels(vec!["A".to_string(), "B".to_string()]))
        );
        assert_eq!(t.y.as_ref().unwrap().as_series().unwrap(), &[3.0, 5.0]);
    }

    #[test]
    fn test_bar_color_list_per_category() {
        let traces = build(
            &Bar,
            json!({"data": [1, 2, 3], "labels": ["a", "b", "c"], "style": {"color": ["red", "blue"]}}),
        )
        .unwrap();
        let marker = traces[0].marker.as_ref().unwrap();
        assert_eq!(
            marker.color,
            Some(Color::Many(vec!["red".into(), "blue".into(), "red".into()]))
        );
    }

    #[test]
    fn test_pie_labels_and_values() {
        let traces = build(
            &Pie,
            json!({"data": {"labels": ["x", "y"], "values": [40, 60]}, "style": {"color": ["#111", "#222"]}}),
        )
        .unwrap();
        let t = &traces[0];
        assert_eq!(t.kind, TraceKind::Pie);
        assert_eq!(t.labels, Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(t.values, Some(vec![40.0, 60.0]));
        assert_eq!(
            t.marker.as_ref().unwrap().colors,
            Some(vec!["#111".to_string(), "#222".to_string()])
        );
        assert!(t.x.is_none());
    }

    #[test]
    fn test_missing_data() {
        let err = build(&Pie, json!({"type": "pie_2d"})).unwrap_err();
        assert!(matches!(err, GraphSpecError::DataError(_)));
    }
}
