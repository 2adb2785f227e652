//! Plotly figure writer
//!
//! Wraps built traces into a Plotly figure object `{data, layout, config}`.
//!
//! # Mapping Strategy
//!
//! - traces → `data`, serialized as-is (non-finite numbers become `null`)
//! - `title` → `layout.title.text`
//! - `axis` → `layout.xaxis` / `layout.yaxis`, or `layout.scene.*axis` when any
//!   trace is 3D. An axis entry may be a bare label or an object whose
//!   `label` becomes the axis title and whose other keys pass through.
//! - `annotations` → `layout.annotations`, with `showarrow: false` unless set
//! - `meta` → `layout.meta`
//! - vector fields lock the aspect ratio so arrows keep their direction
//!
//! # Example
//!
//! ```rust,ignore
//! use graphspec::writer::{PlotlyWriter, Theme, Writer};
//!
//! let writer = PlotlyWriter::new().with_theme(Theme::Dark);
//! let json = writer.write(&spec, &traces)?;
//! ```

use crate::plot::{infer_type, Dimension, GraphSpec, GraphType, Trace};
use crate::writer::Writer;
use crate::{GraphSpecError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Page background shown through the transparent plot areas
const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Color theme of the surrounding page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Plotly template name
    pub fn template(&self) -> &'static str {
        match self {
            Theme::Light => "plotly_white",
            Theme::Dark => "plotly_dark",
        }
    }

    fn font_color(&self) -> &'static str {
        match self {
            Theme::Light => "#222222",
            Theme::Dark => "#e5e5e5",
        }
    }

    fn grid_color(&self) -> &'static str {
        match self {
            Theme::Light => "#e5e5e5",
            Theme::Dark => "#3a3a3a",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = GraphSpecError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(GraphSpecError::WriterError(format!(
                "Unknown theme '{}', expected 'light' or 'dark'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Plotly JSON writer
#[derive(Debug, Clone)]
pub struct PlotlyWriter {
    theme: Theme,
    responsive: bool,
}

impl PlotlyWriter {
    /// Light theme, responsive sizing
    pub fn new() -> Self {
        Self {
            theme: Theme::Light,
            responsive: true,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_responsive(mut self, responsive: bool) -> Self {
        self.responsive = responsive;
        self
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    fn layout(&self, spec: &GraphSpec, traces: &[Trace]) -> Value {
        let mut layout = Map::new();
        layout.insert("template".into(), json!(self.theme.template()));
        layout.insert("paper_bgcolor".into(), json!(TRANSPARENT));
        layout.insert("plot_bgcolor".into(), json!(TRANSPARENT));
        layout.insert("font".into(), json!({"color": self.theme.font_color()}));
        layout.insert("autosize".into(), json!(self.responsive));
        layout.insert("showlegend".into(), json!(traces.len() > 1));

        let title = spec.title();
        let top = if title.is_some() { 50 } else { 20 };
        layout.insert("margin".into(), json!({"l": 50, "r": 20, "t": top, "b": 40}));
        if let Some(title) = title {
            layout.insert("title".into(), json!({"text": title}));
        }

        let three_d = traces.iter().any(|t| t.kind.is_3d())
            || infer_type(spec, Dimension::Two).dimension() == Dimension::Three;
        if three_d {
            let mut scene = Map::new();
            for key in ["x", "y", "z"] {
                scene.insert(format!("{}axis", key), self.axis(spec, key));
            }
            layout.insert("scene".into(), Value::Object(scene));
        } else {
            let mut xaxis = self.axis(spec, "x");
            let yaxis = self.axis(spec, "y");
            if is_vector_field(spec) {
                if let Value::Object(x) = &mut xaxis {
                    x.entry("scaleanchor").or_insert(json!("y"));
                }
            }
            layout.insert("xaxis".into(), xaxis);
            layout.insert("yaxis".into(), yaxis);
        }

        if let Some(annotations) = annotations(spec.annotations.as_ref()) {
            layout.insert("annotations".into(), annotations);
        }
        if let Some(meta) = &spec.meta {
            layout.insert("meta".into(), meta.clone());
        }
        Value::Object(layout)
    }

    /// Axis object for `key`, merged with the spec's `axis` entry
    fn axis(&self, spec: &GraphSpec, key: &str) -> Value {
        let mut axis = Map::new();
        axis.insert("gridcolor".into(), json!(self.theme.grid_color()));
        axis.insert("zeroline".into(), json!(true));

        match spec.axis.as_ref().and_then(|a| a.get(key)) {
            Some(Value::String(label)) => {
                axis.insert("title".into(), json!({"text": label}));
            }
            Some(Value::Object(entry)) => {
                for (name, value) in entry {
                    if name == "label" {
                        axis.insert("title".into(), json!({"text": value}));
                    } else {
                        axis.insert(name.clone(), value.clone());
                    }
                }
            }
            _ => {}
        }
        Value::Object(axis)
    }
}

impl Default for PlotlyWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for PlotlyWriter {
    type Output = String;

    fn write(&self, spec: &GraphSpec, traces: &[Trace]) -> Result<String> {
        let figure = self.figure(spec, traces)?;
        serde_json::to_string(&figure)
            .map_err(|e| GraphSpecError::WriterError(format!("Failed to serialize figure: {}", e)))
    }

    fn figure(&self, spec: &GraphSpec, traces: &[Trace]) -> Result<Value> {
        let data = serde_json::to_value(traces)
            .map_err(|e| GraphSpecError::WriterError(format!("Failed to serialize traces: {}", e)))?;
        Ok(json!({
            "data": data,
            "layout": self.layout(spec, traces),
            "config": {
                "responsive": self.responsive,
                "displaylogo": false,
            },
        }))
    }

    fn validate(&self, spec: &GraphSpec) -> Result<()> {
        match infer_type(spec, Dimension::Two) {
            GraphType::Unsupported(tag) => Err(GraphSpecError::UnsupportedType(tag)),
            _ => Ok(()),
        }
    }
}

fn is_vector_field(spec: &GraphSpec) -> bool {
    matches!(
        infer_type(spec, Dimension::Two),
        GraphType::Vector2D | GraphType::PhasePlane
    )
}

/// Plotly annotations from a list of objects; anything else is dropped
fn annotations(value: Option<&Value>) -> Option<Value> {
    let items = value?.as_array()?;
    let converted: Vec<Value> = items
        .iter()
        .filter_map(|item| {
            let mut object = item.as_object()?.clone();
            object.entry("showarrow").or_insert(json!(false));
            Some(Value::Object(object))
        })
        .collect();
    (!converted.is_empty()).then_some(Value::Array(converted))
}
