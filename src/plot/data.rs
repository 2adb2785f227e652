//! Literal data extraction
//!
//! Builders for scatter/line/point/histogram/bar/pie/vector variants skip
//! expression evaluation and read coordinates straight from `data` (or
//! `coordinates`). Producers write these in a few conventions:
//!
//! - rows: `[[x, y], [x, y, "label"], ...]`
//! - row objects: `[{"x": 1, "y": 2, "label": "A"}, ...]`
//! - columns: `{"x": [...], "y": [...]}`
//!
//! Numeric cells may be numbers, `null` (a gap), or constant-expression
//! strings such as `"PI/2"`.

use super::expression::eval_constant;
use crate::{GraphSpecError, Result};
use serde_json::{Map, Value};

/// Literal points with optional per-point text labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Points {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Empty for 2D point sets
    pub z: Vec<f64>,
    pub labels: Vec<Option<String>>,
}

impl Points {
    /// Number of points
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the set holds no points
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Labels as text, or `None` when no point carries one
    pub fn text(&self) -> Option<Vec<String>> {
        if self.labels.iter().all(Option::is_none) {
            return None;
        }
        Some(
            self.labels
                .iter()
                .map(|l| l.clone().unwrap_or_default())
                .collect(),
        )
    }

    fn push(&mut self, coords: &[f64], label: Option<String>) {
        self.x.push(coords[0]);
        self.y.push(coords[1]);
        if let Some(z) = coords.get(2) {
            self.z.push(*z);
        }
        self.labels.push(label);
    }
}

/// One named series of a multi-series scatter
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: Option<String>,
    pub color: Option<String>,
    pub points: Points,
}

/// A literal 2D vector anchored at a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow2D {
    pub x: f64,
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

// =============================================================================
// Cells
// =============================================================================

/// Numeric value of a cell; `null` is a gap (`NaN`)
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| eval_constant(s)),
        _ => None,
    }
}

/// Text of a scalar cell; numbers and booleans are written out
pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

const LABEL_KEYS: &[&str] = &["label", "name", "text"];

fn object_label(obj: &Map<String, Value>) -> Option<String> {
    LABEL_KEYS
        .iter()
        .find_map(|k| obj.get(*k))
        .and_then(text)
}

fn data_error(message: String) -> GraphSpecError {
    GraphSpecError::DataError(message)
}

// =============================================================================
// Points
// =============================================================================

/// Extract 2D points (extra numeric columns are ignored; a trailing string is a label)
pub fn points_2d(value: &Value) -> Result<Points> {
    points(value, 2)
}

/// Extract 3D points
pub fn points_3d(value: &Value) -> Result<Points> {
    points(value, 3)
}

fn points(value: &Value, dims: usize) -> Result<Points> {
    let axes = &["x", "y", "z"][..dims];
    let mut out = Points::default();

    match value {
        Value::Array(rows) => {
            for (i, row) in rows.iter().enumerate() {
                let (coords, label) = match row {
                    Value::Array(cells) => array_row(cells, dims, i)?,
                    Value::Object(obj) => object_row(obj, axes, i)?,
                    _ => {
                        return Err(data_error(format!(
                            "data row {} must be an array or object",
                            i + 1
                        )))
                    }
                };
                out.push(&coords, label);
            }
        }
        Value::Object(columns) => {
            let cols = axes
                .iter()
                .map(|axis| column(columns, axis))
                .collect::<Result<Vec<_>>>()?;
            let n = cols.iter().map(Vec::len).min().unwrap_or(0);
            let labels = columns.get("labels").and_then(Value::as_array);
            for i in 0..n {
                let coords: Vec<f64> = cols.iter().map(|c| c[i]).collect();
                let label = labels.and_then(|l| l.get(i)).and_then(text);
                out.push(&coords, label);
            }
        }
        _ => {
            return Err(data_error(
                "data must be an array of points or an object of columns".to_string(),
            ))
        }
    }

    if out.is_empty() {
        return Err(data_error("data contains no points".to_string()));
    }
    Ok(out)
}

fn array_row(cells: &[Value], dims: usize, row: usize) -> Result<(Vec<f64>, Option<String>)> {
    let coords: Vec<f64> = cells.iter().take(dims).map_while(number).collect();
    if coords.len() < dims {
        return Err(data_error(format!(
            "data row {} needs {} numeric values",
            row + 1,
            dims
        )));
    }
    let label = cells.get(dims).and_then(|c| match c {
        Value::String(s) => Some(s.clone()),
        _ => None,
    });
    Ok((coords, label))
}

fn object_row(
    obj: &Map<String, Value>,
    axes: &[&str],
    row: usize,
) -> Result<(Vec<f64>, Option<String>)> {
    let coords = axes
        .iter()
        .map(|axis| {
            obj.get(*axis).and_then(number).ok_or_else(|| {
                data_error(format!("data row {} is missing numeric '{}'", row + 1, axis))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((coords, object_label(obj)))
}

fn column(columns: &Map<String, Value>, axis: &str) -> Result<Vec<f64>> {
    let cells = columns
        .get(axis)
        .and_then(Value::as_array)
        .ok_or_else(|| data_error(format!("data column '{}' is missing", axis)))?;
    cells
        .iter()
        .enumerate()
        .map(|(i, c)| {
            number(c).ok_or_else(|| {
                data_error(format!("data column '{}' entry {} is not numeric", axis, i + 1))
            })
        })
        .collect()
}

// =============================================================================
// Flat Values
// =============================================================================

/// Flat numeric samples for a histogram; rows contribute their first column
pub fn flat_values(value: &Value) -> Result<Vec<f64>> {
    let cells: Vec<&Value> = match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Array(row) => row.first().unwrap_or(&Value::Null),
                other => other,
            })
            .collect(),
        Value::Object(obj) => match obj.get("values").or_else(|| obj.get("x")) {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let values: Vec<f64> = cells
        .into_iter()
        .filter_map(number)
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return Err(data_error("histogram data contains no numeric values".to_string()));
    }
    Ok(values)
}

// =============================================================================
// Categories
// =============================================================================

/// Category labels and values for bar and pie charts.
///
/// Accepts `[[label, value], ...]`, `[{"label": .., "value": ..}, ...]`,
/// `{"labels": [...], "values": [...]}`, `{"A": 3, "B": 5}`, or bare values
/// paired with `labels` (numbered `1..n` when absent).
pub fn categories(value: &Value, labels: Option<&[String]>) -> Result<(Vec<String>, Vec<f64>)> {
    let mut names = Vec::new();
    let mut values = Vec::new();

    match value {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let (name, v) = match item {
                    Value::Array(pair) if pair.len() >= 2 => (text(&pair[0]), number(&pair[1])),
                    Value::Object(obj) => (
                        object_label(obj).or_else(|| obj.get("category").and_then(text)),
                        ["value", "count", "y"]
                            .iter()
                            .find_map(|k| obj.get(*k))
                            .and_then(number),
                    ),
                    scalar => (
                        labels
                            .and_then(|l| l.get(i).cloned())
                            .or_else(|| Some((i + 1).to_string())),
                        number(scalar),
                    ),
                };
                match (name, v) {
                    (Some(name), Some(v)) => {
                        names.push(name);
                        values.push(v);
                    }
                    _ => {
                        return Err(data_error(format!(
                            "category entry {} needs a label and a numeric value",
                            i + 1
                        )))
                    }
                }
            }
        }
        Value::Object(obj) if obj.contains_key("values") => {
            let vals = obj
                .get("values")
                .and_then(Value::as_array)
                .ok_or_else(|| data_error("'values' must be an array".to_string()))?;
            let given: Option<Vec<String>> = obj
                .get("labels")
                .and_then(Value::as_array)
                .map(|l| l.iter().filter_map(text).collect());
            for (i, v) in vals.iter().enumerate() {
                let name = given
                    .as_ref()
                    .and_then(|g| g.get(i).cloned())
                    .or_else(|| labels.and_then(|l| l.get(i).cloned()))
                    .unwrap_or_else(|| (i + 1).to_string());
                let v = number(v).ok_or_else(|| {
                    data_error(format!("category value {} is not numeric", i + 1))
                })?;
                names.push(name);
                values.push(v);
            }
        }
        Value::Object(obj) => {
            for (name, v) in obj {
                let v = number(v).ok_or_else(|| {
                    data_error(format!("category '{}' has a non-numeric value", name))
                })?;
                names.push(name.clone());
                values.push(v);
            }
        }
        _ => {
            return Err(data_error(
                "category data must be an array or an object".to_string(),
            ))
        }
    }

    if names.is_empty() {
        return Err(data_error("category data is empty".to_string()));
    }
    Ok((names, values))
}

// =============================================================================
// Vectors
// =============================================================================

/// Literal vectors: `[x, y, u, v]` rows anchored at `(x, y)`, or `[u, v]`
/// rows anchored at the origin
pub fn vectors_2d(value: &Value) -> Result<Vec<Arrow2D>> {
    let rows = value
        .as_array()
        .ok_or_else(|| data_error("vector data must be an array".to_string()))?;

    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let arrow = match row {
            Value::Array(cells) => {
                let nums: Vec<f64> = cells.iter().map_while(number).collect();
                match nums.len() {
                    n if n >= 4 => Arrow2D {
                        x: nums[0],
                        y: nums[1],
                        u: nums[2],
                        v: nums[3],
                    },
                    2 | 3 => Arrow2D {
                        x: 0.0,
                        y: 0.0,
                        u: nums[0],
                        v: nums[1],
                    },
                    _ => {
                        return Err(data_error(format!(
                            "vector row {} needs [u, v] or [x, y, u, v]",
                            i + 1
                        )))
                    }
                }
            }
            Value::Object(obj) => {
                let get = |k: &str| obj.get(k).and_then(number);
                match (get("u"), get("v")) {
                    (Some(u), Some(v)) => Arrow2D {
                        x: get("x").unwrap_or(0.0),
                        y: get("y").unwrap_or(0.0),
                        u,
                        v,
                    },
                    _ => {
                        return Err(data_error(format!(
                            "vector row {} is missing 'u'/'v'",
                            i + 1
                        )))
                    }
                }
            }
            _ => {
                return Err(data_error(format!(
                    "vector row {} must be an array or object",
                    i + 1
                )))
            }
        };
        out.push(arrow);
    }

    if out.is_empty() {
        return Err(data_error("vector data is empty".to_string()));
    }
    Ok(out)
}

// =============================================================================
// Series
// =============================================================================

/// Named series for a multi-series scatter:
/// `[{"name": "A", "data": [[x, y], ...], "color": "red"}, ...]`
pub fn series(value: &Value) -> Result<Vec<Series>> {
    let items = value
        .as_array()
        .ok_or_else(|| data_error("multi-series data must be an array of series".to_string()))?;

    let mut out = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .ok_or_else(|| data_error(format!("series {} must be an object", i + 1)))?;
        let data = ["data", "points", "coordinates"]
            .iter()
            .find_map(|k| obj.get(*k))
            .ok_or_else(|| data_error(format!("series {} has no data", i + 1)))?;
        out.push(Series {
            name: obj.get("name").or_else(|| obj.get("label")).and_then(text),
            color: obj.get("color").and_then(Value::as_str).map(String::from),
            points: points_2d(data)?,
        });
    }

    if out.is_empty() {
        return Err(data_error("multi-series data is empty".to_string()));
    }
    Ok(out)
}

/// Whether row data looks three-dimensional (first row has three numeric cells)
pub fn looks_3d(value: &Value) -> bool {
    match value {
        Value::Array(rows) => match rows.first() {
            Some(Value::Array(cells)) => cells.iter().take(3).filter_map(number).count() == 3,
            Some(Value::Object(obj)) => obj.contains_key("z"),
            _ => false,
        },
        Value::Object(obj) => obj.contains_key("z"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_points_2d_rows_with_labels() {
        let pts = points_2d(&json!([[0, 1], [2, 3, "B"]])).unwrap();
        assert_eq!(pts.x, vec![0.0, 2.0]);
        assert_eq!(pts.y, vec![1.0, 3.0]);
        assert!(pts.z.is_empty());
        assert_eq!(pts.text(), Some(vec!["".to_string(), "B".to_string()]));
    }

    #[test]
    fn test_points_2d_ignores_extra_numeric_column() {
        let pts = points_2d(&json!([[0, 1, 5]])).unwrap();
        assert_eq!(pts.x, vec![0.0]);
        assert!(pts.z.is_empty());
        assert_eq!(pts.text(), None);
    }

    #[test]
    fn test_points_from_objects_and_columns() {
        let objs = points_2d(&json!([{"x": 1, "y": 2, "label": "P"}])).unwrap();
        assert_eq!(objs.labels, vec![Some("P".to_string())]);

        let cols = points_3d(&json!({"x": [1, 2], "y": [3, 4], "z": [5, 6]})).unwrap();
        assert_eq!(cols.z, vec![5.0, 6.0]);
    }

    #[test]
    fn test_points_constant_strings_and_null() {
        let pts = points_2d(&json!([["PI", null]])).unwrap();
        assert!((pts.x[0] - std::f64::consts::PI).abs() < 1e-12);
        assert!(pts.y[0].is_nan());
    }

    #[test]
    fn test_points_short_row_is_error() {
        let err = points_3d(&json!([[1, 2]])).unwrap_err();
        assert!(err.to_string().contains("row 1"));
        assert!(points_2d(&json!([])).is_err());
        assert!(points_2d(&json!(5)).is_err());
    }

    #[test]
    fn test_flat_values() {
        assert_eq!(flat_values(&json!([1, 2, 2, 3])).unwrap(), vec![1.0, 2.0, 2.0, 3.0]);
        assert_eq!(flat_values(&json!([[1, 9], [4, 9]])).unwrap(), vec![1.0, 4.0]);
        assert_eq!(flat_values(&json!({"values": [7]})).unwrap(), vec![7.0]);
        assert!(flat_values(&json!(["a"])).is_err());
    }

    #[test]
    fn test_categories_shapes() {
        let (n, v) = categories(&json!([["A", 3], ["B", 5]]), None).unwrap();
        assert_eq!(n, vec!["A", "B"]);
        assert_eq!(v, vec![3.0, 5.0]);

        let (n, _) = categories(&json!([{"label": "X", "value": 1}]), None).unwrap();
        assert_eq!(n, vec!["X"]);

        let (n, v) = categories(&json!({"labels": ["p", "q"], "values": [1, 2]}), None).unwrap();
        assert_eq!(n, vec!["p", "q"]);
        assert_eq!(v, vec![1.0, 2.0]);

        let labels = vec!["one".to_string()];
        let (n, _) = categories(&json!([10, 20]), Some(&labels)).unwrap();
        assert_eq!(n, vec!["one", "2"]);

        let (n, v) = categories(&json!({"A": 1, "B": 2}), None).unwrap();
        assert_eq!(n, vec!["A", "B"]);
        assert_eq!(v, vec![1.0, 2.0]);
    }

    #[test]
    fn test_categories_bad_entry() {
        assert!(categories(&json!([["A", "lots"]]), None).is_err());
        assert!(categories(&json!([]), None).is_err());
    }

    #[test]
    fn test_vectors_2d() {
        let arrows = vectors_2d(&json!([[1, 2], [0, 0, 3, 4], {"u": 1, "v": 0}])).unwrap();
        assert_eq!(arrows[0], Arrow2D { x: 0.0, y: 0.0, u: 1.0, v: 2.0 });
        assert_eq!(arrows[1], Arrow2D { x: 0.0, y: 0.0, u: 3.0, v: 4.0 });
        assert_eq!(arrows[2].u, 1.0);
        assert!(vectors_2d(&json!([[1]])).is_err());
    }

    #[test]
    fn test_series() {
        let s = series(&json!([
            {"name": "A", "data": [[0, 0], [1, 1]], "color": "red"},
            {"points": [[2, 2]]}
        ]))
        .unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].name.as_deref(), Some("A"));
        assert_eq!(s[0].color.as_deref(), Some("red"));
        assert_eq!(s[1].points.len(), 1);
        assert!(series(&json!([{"name": "empty"}])).is_err());
    }

    #[test]
    fn test_looks_3d() {
        assert!(looks_3d(&json!([[1, 2, 3]])));
        assert!(!looks_3d(&json!([[1, 2, "label"]])));
        assert!(looks_3d(&json!({"x": [], "y": [], "z": []})));
    }
}
