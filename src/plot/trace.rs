//! Trace records consumed by the charting library
//!
//! A [`Trace`] mirrors the subset of the Plotly trace schema the builders
//! emit. Coordinates are kept as typed `f64` arrays so the validator can scan
//! them; non-finite values serialize as JSON `null`, which the library renders
//! as gaps.

use serde::Serialize;

/// Trace kind (`type` in the library schema)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    #[default]
    Scatter,
    Scatter3d,
    Surface,
    Cone,
    Bar,
    Pie,
    Histogram,
}

impl TraceKind {
    /// Whether this kind is drawn in a 3D scene
    pub fn is_3d(&self) -> bool {
        matches!(self, TraceKind::Scatter3d | TraceKind::Surface | TraceKind::Cone)
    }
}

/// Drawing mode for scatter-like traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TraceMode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
    #[serde(rename = "markers+text")]
    MarkersText,
}

/// Coordinate values: a series, a row-major grid, or category labels
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Values {
    Series(Vec<f64>),
    Grid(Vec<Vec<f64>>),
    Labels(Vec<String>),
}

impl Values {
    /// Iterate numeric values; labels yield nothing
    pub fn numbers(&self) -> Box<dyn Iterator<Item = f64> + '_> {
        match self {
            Values::Series(v) => Box::new(v.iter().copied()),
            Values::Grid(rows) => Box::new(rows.iter().flatten().copied()),
            Values::Labels(_) => Box::new(std::iter::empty()),
        }
    }

    /// Number of entries (grid cells for a grid)
    pub fn len(&self) -> usize {
        match self {
            Values::Series(v) => v.len(),
            Values::Grid(rows) => rows.iter().map(Vec::len).sum(),
            Values::Labels(v) => v.len(),
        }
    }

    /// Whether there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Series view, if this is a series
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Values::Series(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for Values {
    fn from(v: Vec<f64>) -> Self {
        Values::Series(v)
    }
}

impl From<Vec<Vec<f64>>> for Values {
    fn from(v: Vec<Vec<f64>>) -> Self {
        Values::Grid(v)
    }
}

impl From<Vec<String>> for Values {
    fn from(v: Vec<String>) -> Self {
        Values::Labels(v)
    }
}

/// Line styling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<String>,
}

/// One color, or one color per point/bar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Color {
    One(String),
    Many(Vec<String>),
}

impl Color {
    /// The single color, if this is not a per-point list
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Color::One(c) => Some(c),
            Color::Many(_) => None,
        }
    }
}

/// Marker styling
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Slice colors (pie traces)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

/// One renderer-ready trace
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: TraceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<TraceMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub u: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v: Option<Values>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<Values>,
    /// Pie slice labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Pie slice values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    /// Per-point text (point labels)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legendgroup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverinfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorscale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showscale: Option<bool>,
    /// Cone sizing (`absolute` / `scaled`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizemode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizeref: Option<f64>,
    /// Cone anchor (`tail`, `tip`, `center`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Histogram bin count hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbinsx: Option<u32>,
}

impl Trace {
    /// Empty trace of the given kind
    pub fn new(kind: TraceKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Scatter trace over two series
    pub fn scatter(x: Vec<f64>, y: Vec<f64>, mode: TraceMode) -> Self {
        Self {
            kind: TraceKind::Scatter,
            mode: Some(mode),
            x: Some(Values::Series(x)),
            y: Some(Values::Series(y)),
            ..Default::default()
        }
    }

    /// 3D scatter trace over three series
    pub fn scatter3d(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, mode: TraceMode) -> Self {
        Self {
            kind: TraceKind::Scatter3d,
            mode: Some(mode),
            x: Some(Values::Series(x)),
            y: Some(Values::Series(y)),
            z: Some(Values::Series(z)),
            ..Default::default()
        }
    }

    /// Builder-style: set the legend name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Coordinate fields the validator scans, in schema order
    pub fn coordinates(&self) -> impl Iterator<Item = &Values> {
        [&self.x, &self.y, &self.z, &self.u, &self.v, &self.w]
            .into_iter()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scatter_serialization() {
        let trace = Trace::scatter(vec![0.0, 1.0], vec![1.0, f64::NAN], TraceMode::Lines)
            .with_name("y = x");
        let value = serde_json::to_value(&trace).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "scatter",
                "mode": "lines",
                "name": "y = x",
                "x": [0.0, 1.0],
                "y": [1.0, null]
            })
        );
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(
            serde_json::to_value(TraceMode::LinesMarkers).unwrap(),
            json!("lines+markers")
        );
        assert_eq!(serde_json::to_value(TraceKind::Scatter3d).unwrap(), json!("scatter3d"));
    }

    #[test]
    fn test_grid_values_flatten() {
        let grid = Values::Grid(vec![vec![1.0, 2.0], vec![3.0]]);
        assert_eq!(grid.numbers().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
        assert_eq!(grid.len(), 3);
        let labels = Values::Labels(vec!["a".into()]);
        assert_eq!(labels.numbers().count(), 0);
    }

    #[test]
    fn test_marker_color_list() {
        let marker = Marker {
            color: Some(Color::Many(vec!["red".into(), "blue".into()])),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&marker).unwrap(),
            json!({"color": ["red", "blue"]})
        );
        assert_eq!(Color::One("red".into()).as_single(), Some("red"));
    }

    #[test]
    fn test_coordinates_skips_absent_fields() {
        let mut trace = Trace::new(TraceKind::Cone);
        trace.x = Some(vec![1.0].into());
        trace.w = Some(vec![2.0].into());
        assert_eq!(trace.coordinates().count(), 2);
    }
}
