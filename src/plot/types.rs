//! Input types for graph specifications
//!
//! This module defines the types that model what a `<graph_spec>` block may
//! contain: the graph type tag, expressions, domains, sampling, literal data,
//! style hints and display-only metadata. Shapes that the producer may emit
//! in several conventions (array vs. object, scalar vs. per-axis) are modelled
//! as untagged unions with an `Unrecognized` fallback, so deserialization of
//! an odd shape never fails the whole spec; the normalizers in
//! [`crate::plot::resolve`] turn them into canonical values.

use crate::plot::data::{number, text};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// =============================================================================
// Graph Type
// =============================================================================

/// Discriminant tag selecting a trace builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GraphType {
    Function2D,
    Parametric2D,
    PhasePlane,
    Scatter2D,
    Line2D,
    Point2D,
    Histogram2D,
    Vector2D,
    Pie2D,
    Bar2D,
    Composite2D,
    MultiScatter2D,
    Cartesian,
    Function3D,
    Parametric3D,
    Scatter3D,
    Point3D,
    Composite3D,
    VectorField3D,
    /// A tag outside the supported enumeration, kept verbatim for reporting
    Unsupported(String),
}

/// Every supported tag with its wire name
const GRAPH_TYPE_NAMES: &[(&str, GraphType)] = &[
    ("function_2d", GraphType::Function2D),
    ("parametric_2d", GraphType::Parametric2D),
    ("phase_plane", GraphType::PhasePlane),
    ("scatter_2d", GraphType::Scatter2D),
    ("line_2d", GraphType::Line2D),
    ("point_2d", GraphType::Point2D),
    ("histogram_2d", GraphType::Histogram2D),
    ("vector_2d", GraphType::Vector2D),
    ("pie_2d", GraphType::Pie2D),
    ("bar_2d", GraphType::Bar2D),
    ("composite_2d", GraphType::Composite2D),
    ("multi_scatter_2d", GraphType::MultiScatter2D),
    ("cartesian", GraphType::Cartesian),
    ("function_3d", GraphType::Function3D),
    ("parametric_3d", GraphType::Parametric3D),
    ("scatter_3d", GraphType::Scatter3D),
    ("point_3d", GraphType::Point3D),
    ("composite_3d", GraphType::Composite3D),
    ("vector_field_3d", GraphType::VectorField3D),
];

/// Whether a graph type renders into a 2D plane or a 3D scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Two,
    Three,
}

impl GraphType {
    /// Parse a wire tag. Matching ignores surrounding whitespace and ASCII case.
    pub fn parse(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase();
        GRAPH_TYPE_NAMES
            .iter()
            .find(|(name, _)| *name == normalized)
            .map(|(_, t)| t.clone())
            .unwrap_or(GraphType::Unsupported(tag.to_string()))
    }

    /// The wire tag for this type
    pub fn as_str(&self) -> &str {
        match self {
            GraphType::Unsupported(tag) => tag,
            other => GRAPH_TYPE_NAMES
                .iter()
                .find(|(_, t)| t == other)
                .map(|(name, _)| *name)
                .unwrap_or("unsupported"),
        }
    }

    /// Whether this type combines several layers
    pub fn is_composite(&self) -> bool {
        matches!(self, GraphType::Composite2D | GraphType::Composite3D)
    }

    /// The coordinate space this type renders into
    pub fn dimension(&self) -> Dimension {
        match self {
            GraphType::Function3D
            | GraphType::Parametric3D
            | GraphType::Scatter3D
            | GraphType::Point3D
            | GraphType::Composite3D
            | GraphType::VectorField3D => Dimension::Three,
            _ => Dimension::Two,
        }
    }
}

impl From<String> for GraphType {
    fn from(tag: String) -> Self {
        GraphType::parse(&tag)
    }
}

impl From<GraphType> for String {
    fn from(t: GraphType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for GraphType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Axes
// =============================================================================

/// Axis names usable as keys in per-axis domain and sampling objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    U,
    V,
    T,
}

impl Axis {
    /// Key used in spec objects
    pub fn key(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::U => "u",
            Axis::V => "v",
            Axis::T => "t",
        }
    }

    /// All recognised axes
    pub const ALL: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::U, Axis::V, Axis::T];
}

// =============================================================================
// Expressions
// =============================================================================

/// One expression or an ordered list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpressionList {
    One(String),
    Many(Vec<String>),
}

impl ExpressionList {
    /// Normalize to an ordered sequence of expression sources
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ExpressionList::One(s) => vec![s.clone()],
            ExpressionList::Many(v) => v.clone(),
        }
    }
}

// =============================================================================
// Domain and Sampling
// =============================================================================

/// A range endpoint: a number, or a constant expression such as `"2*PI"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Bound {
    Number(f64),
    Expr(String),
}

/// Domain shape as written by the producer
///
/// Variant order matters for untagged deserialization: an object carrying
/// both `min` and `max` is a [`RangeSpec::MinMax`]; any other object is
/// treated as per-axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    /// `[min, max]`
    Pair([Bound; 2]),
    /// `{"min": a, "max": b}`
    MinMax { min: Bound, max: Bound },
    /// `{"x": [..], "t": [..]}`
    AxisKeyed(BTreeMap<String, RangeSpec>),
    /// Anything else; normalizers fall back to their default
    Unrecognized(Value),
}

/// Sampling shape as written by the producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SamplingSpec {
    /// A single point count
    Count(f64),
    /// Per-axis point counts
    AxisKeyed(BTreeMap<String, SamplingSpec>),
    /// Anything else; normalizers fall back to their default
    Unrecognized(Value),
}

// =============================================================================
// Style
// =============================================================================

/// A loosely typed scalar
///
/// Producers write `2`, `2.5` and `"2"` interchangeably, and sometimes put a
/// number where a name is expected. Anything that is neither a number nor a
/// string is kept as written and ignored by the accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    Unrecognized(Value),
}

impl Scalar {
    /// Finite numeric value; numeric strings are parsed
    pub fn number(&self) -> Option<f64> {
        let n = match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => s.trim().parse::<f64>().ok()?,
            Scalar::Unrecognized(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Text value; numbers are formatted (`2019.0` becomes `"2019"`)
    pub fn text(&self) -> Option<String> {
        match self {
            Scalar::Text(s) => Some(s.clone()),
            Scalar::Number(n) => Some(n.to_string()),
            Scalar::Unrecognized(_) => None,
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

/// A single color or one color per trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    One(String),
    Many(Vec<String>),
    Unrecognized(Value),
}

/// Rendering hints, passed through to trace output
///
/// Fields keep what the producer wrote; the accessors return usable values
/// and [`Style::unusable_keys`] names the ones that had to be ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorSpec>,
    #[serde(
        alias = "lineWidth",
        alias = "width",
        skip_serializing_if = "Option::is_none"
    )]
    pub line_width: Option<Scalar>,
    #[serde(
        alias = "lineStyle",
        alias = "dash",
        skip_serializing_if = "Option::is_none"
    )]
    pub line_style: Option<Scalar>,
    #[serde(alias = "symbol", skip_serializing_if = "Option::is_none")]
    pub marker: Option<Scalar>,
    #[serde(
        alias = "markerSize",
        alias = "size",
        skip_serializing_if = "Option::is_none"
    )]
    pub marker_size: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Scalar>,
    #[serde(alias = "colorscale", skip_serializing_if = "Option::is_none")]
    pub colormap: Option<Scalar>,
    /// Multiplier applied to vector-field arrow lengths
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scalar>,
    /// Legend name override
    #[serde(alias = "label", skip_serializing_if = "Option::is_none")]
    pub name: Option<Scalar>,
    /// Unrecognised style keys, preserved
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Style {
    /// Color for the `index`-th trace of a layer
    ///
    /// A list of colors is indexed cyclically; a single color applies to all.
    pub fn color_at(&self, index: usize) -> Option<String> {
        match &self.color {
            Some(ColorSpec::One(c)) => Some(c.clone()),
            Some(ColorSpec::Many(colors)) if !colors.is_empty() => {
                Some(colors[index % colors.len()].clone())
            }
            _ => None,
        }
    }

    /// The color list, when one color per trace or category was given
    pub fn color_list(&self) -> Option<&[String]> {
        match &self.color {
            Some(ColorSpec::Many(colors)) if !colors.is_empty() => Some(colors),
            _ => None,
        }
    }

    pub fn line_width(&self) -> Option<f64> {
        non_negative(self.line_width.as_ref())
    }

    pub fn marker_size(&self) -> Option<f64> {
        non_negative(self.marker_size.as_ref())
    }

    /// Opacity clamped to `[0, 1]`
    pub fn opacity(&self) -> Option<f64> {
        self.opacity
            .as_ref()
            .and_then(Scalar::number)
            .map(|o| o.clamp(0.0, 1.0))
    }

    pub fn line_style(&self) -> Option<String> {
        self.line_style.as_ref().and_then(Scalar::text)
    }

    pub fn marker(&self) -> Option<String> {
        self.marker.as_ref().and_then(Scalar::text)
    }

    pub fn colormap(&self) -> Option<String> {
        self.colormap.as_ref().and_then(Scalar::text)
    }

    pub fn name(&self) -> Option<String> {
        self.name.as_ref().and_then(Scalar::text)
    }

    /// Arrow length multiplier (defaults to 1)
    pub fn scale_factor(&self) -> f64 {
        positive(self.scale.as_ref()).unwrap_or(1.0)
    }

    /// Keys that were present but hold nothing usable
    pub fn unusable_keys(&self) -> Vec<&'static str> {
        let numbers = [
            ("lineWidth", &self.line_width, self.line_width().is_some()),
            ("markerSize", &self.marker_size, self.marker_size().is_some()),
            ("opacity", &self.opacity, self.opacity().is_some()),
            ("scale", &self.scale, positive(self.scale.as_ref()).is_some()),
        ];
        let texts = [
            ("lineStyle", &self.line_style),
            ("marker", &self.marker),
            ("colormap", &self.colormap),
            ("name", &self.name),
        ];

        let mut keys: Vec<&'static str> = numbers
            .into_iter()
            .filter(|(_, raw, usable)| raw.is_some() && !usable)
            .map(|(key, _, _)| key)
            .collect();
        keys.extend(
            texts
                .into_iter()
                .filter(|(_, raw)| matches!(raw, Some(s) if s.text().is_none()))
                .map(|(key, _)| key),
        );
        if matches!(self.color, Some(ColorSpec::Unrecognized(_))) {
            keys.push("color");
        }
        keys
    }
}

fn non_negative(value: Option<&Scalar>) -> Option<f64> {
    value.and_then(Scalar::number).filter(|n| *n >= 0.0)
}

fn positive(value: Option<&Scalar>) -> Option<f64> {
    value.and_then(Scalar::number).filter(|n| *n > 0.0)
}

// =============================================================================
// Graph Specification
// =============================================================================

/// Root parsed entity of a `<graph_spec>` block
///
/// Layers of a composite spec use the same shape; their own `layers` field is
/// ignored by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSpec {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub graph_type: Option<GraphType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<ExpressionList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expressions: Option<ExpressionList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<RangeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling: Option<SamplingSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<ExpressionList>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<GraphSpec>,
    pub style: Style,
    /// Category names for bar/pie data given as bare values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Value>,
    /// Histogram bin count hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<Scalar>,
    /// Phase-plane trajectory seeds, `[[x0, y0], ...]`
    #[serde(
        alias = "initialConditions",
        skip_serializing_if = "Option::is_none"
    )]
    pub initial_conditions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    /// Unrecognised top-level keys, preserved for re-serialization
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GraphSpec {
    /// Create an empty spec of the given type
    pub fn new(graph_type: GraphType) -> Self {
        Self {
            graph_type: Some(graph_type),
            ..Default::default()
        }
    }

    /// Builder-style: set the plural expression list
    pub fn with_expressions<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expressions = Some(ExpressionList::Many(
            expressions.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Builder-style: set the domain
    pub fn with_domain(mut self, domain: RangeSpec) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Builder-style: set the sampling
    pub fn with_sampling(mut self, sampling: SamplingSpec) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Builder-style: append a layer
    pub fn with_layer(mut self, layer: GraphSpec) -> Self {
        self.layers.push(layer);
        self
    }

    /// Normalized expression sources
    ///
    /// `expressions` takes precedence over `expression`; a single string
    /// becomes a one-element vec and an absent field an empty one.
    pub fn expressions(&self) -> Vec<String> {
        self.expressions
            .as_ref()
            .or(self.expression.as_ref())
            .map(ExpressionList::to_vec)
            .unwrap_or_default()
    }

    /// Vector-field component expressions, falling back to the expression list
    pub fn field_components(&self) -> Vec<String> {
        match &self.field {
            Some(field) => field.to_vec(),
            None => self.expressions(),
        }
    }

    /// Literal points from `data`, or from `coordinates` when `data` is absent
    pub fn literal_data(&self) -> Option<&Value> {
        self.data.as_ref().or(self.coordinates.as_ref())
    }

    pub fn title(&self) -> Option<String> {
        self.title.as_ref().and_then(Scalar::text)
    }

    /// Category names; numbers and booleans are written out as text.
    ///
    /// `None` unless `labels` is a list of scalars.
    pub fn label_names(&self) -> Option<Vec<String>> {
        self.labels.as_ref()?.as_array()?.iter().map(text).collect()
    }

    /// Histogram bin hint, rounded; absent unless at least 1
    pub fn bin_count(&self) -> Option<u32> {
        self.bins
            .as_ref()
            .and_then(Scalar::number)
            .filter(|n| *n >= 1.0 && *n <= f64::from(u32::MAX))
            .map(|n| n.round() as u32)
    }

    /// Trajectory seeds; rows without two finite numbers are skipped
    pub fn seeds(&self) -> Vec<[f64; 2]> {
        let Some(Value::Array(rows)) = &self.initial_conditions else {
            return Vec::new();
        };
        rows.iter().filter_map(seed).collect()
    }

    /// Keys that were present but hold nothing usable, style keys prefixed
    /// with `style.`
    pub fn unusable_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        if self.title.is_some() && self.title().is_none() {
            keys.push("title".to_string());
        }
        if self.labels.is_some() && self.label_names().is_none() {
            keys.push("labels".to_string());
        }
        if self.bins.is_some() && self.bin_count().is_none() {
            keys.push("bins".to_string());
        }
        if let Some(raw) = &self.initial_conditions {
            let rows = raw.as_array().map_or(0, Vec::len);
            if rows == 0 || self.seeds().len() < rows {
                keys.push("initial_conditions".to_string());
            }
        }
        keys.extend(
            self.style
                .unusable_keys()
                .into_iter()
                .map(|key| format!("style.{}", key)),
        );
        keys
    }
}

fn seed(row: &Value) -> Option<[f64; 2]> {
    let cells = row.as_array()?;
    let coord = |i: usize| number(cells.get(i)?).filter(|n| n.is_finite());
    Some([coord(0)?, coord(1)?])
}
