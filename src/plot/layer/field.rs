//! 2D vector fields and phase planes
//!
//! Arrow lengths use saturating magnitude scaling: with `c` half the median
//! magnitude over the grid, an arrow of magnitude `m` gets
//! `g(m) = m / (m + c)` of the available cell length. Outliers cannot
//! dominate the plot and weak regions stay distinguishable. Arrows under
//! 5% of the median magnitude are dropped.
//!
//! Output is two traces per field: the shafts as NaN-separated line
//! segments, and the arrowheads as NaN-separated filled triangles.

use std::f64::consts::PI;

use super::{line_from_style, require_arity, TraceBuilder};
use crate::naming::truncate_label;
use crate::plot::data::vectors_2d;
use crate::plot::diagnostic::BuildContext;
use crate::plot::expression::CompiledExpr;
use crate::plot::resolve::{
    has_axis_keys, linspace, resolve_range_axis, resolve_sample_count_axis,
};
use crate::plot::trace::{Line, Trace, TraceMode};
use crate::plot::types::{Axis, GraphSpec, SamplingSpec, Style};
use crate::Result;

/// Default range on both axes
pub const DEFAULT_DOMAIN: [f64; 2] = [-5.0, 5.0];

/// Default grid points per axis
pub const DEFAULT_GRID: usize = 15;

/// Default integration span for phase-plane trajectories
pub const DEFAULT_T_DOMAIN: [f64; 2] = [0.0, 10.0];

/// Default RK4 steps per trajectory
pub const DEFAULT_STEPS: usize = 200;

/// Fraction of a grid cell the longest arrow may occupy
const SHAFT_FRACTION: f64 = 0.9;

/// Arrows below this fraction of the median magnitude are skipped
const MIN_MAGNITUDE_FRACTION: f64 = 0.05;

/// Arrowhead wing angle relative to the shaft direction
const HEAD_ANGLE: f64 = 0.85 * PI;

const HEAD_SHAFT_RATIO: f64 = 0.3;
const HEAD_CELL_RATIO: f64 = 0.5;

/// Color used when the spec sets none, so shafts and heads match
const DEFAULT_ARROW_COLOR: &str = "#1f77b4";

// =============================================================================
// Saturating Scale
// =============================================================================

/// Median-based saturating scale shared by the 2D and 3D field builders
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Saturation {
    median: f64,
    half_median: f64,
}

impl Saturation {
    /// Build from every magnitude on the grid; non-finite ones are ignored.
    /// `None` when no magnitude is finite.
    pub(super) fn from_magnitudes(magnitudes: impl Iterator<Item = f64>) -> Option<Self> {
        let mut finite: Vec<f64> = magnitudes.filter(|m| m.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        finite.sort_by(f64::total_cmp);
        let mid = finite.len() / 2;
        let median = if finite.len() % 2 == 0 {
            (finite[mid - 1] + finite[mid]) / 2.0
        } else {
            finite[mid]
        };
        Some(Self {
            median,
            half_median: median / 2.0,
        })
    }

    /// `g(m) = m / (m + c)`
    pub(super) fn gain(&self, magnitude: f64) -> f64 {
        let denom = magnitude + self.half_median;
        if denom > 0.0 {
            magnitude / denom
        } else {
            0.0
        }
    }

    /// Whether an arrow of this magnitude is drawn
    pub(super) fn keeps(&self, magnitude: f64) -> bool {
        magnitude.is_finite()
            && magnitude > 0.0
            && magnitude >= MIN_MAGNITUDE_FRACTION * self.median
    }
}

// =============================================================================
// Arrow Geometry
// =============================================================================

#[derive(Debug, Default)]
struct ArrowPaths {
    shaft_x: Vec<f64>,
    shaft_y: Vec<f64>,
    head_x: Vec<f64>,
    head_y: Vec<f64>,
}

impl ArrowPaths {
    /// Add an arrow from `(x, y)` along `(dx, dy)`; zero-length arrows are skipped
    fn push(&mut self, x: f64, y: f64, dx: f64, dy: f64, head_cap: f64) {
        let length = dx.hypot(dy);
        if !(length.is_finite() && length > 0.0) {
            return;
        }
        let (ex, ey) = (x + dx, y + dy);
        self.shaft_x.extend([x, ex, f64::NAN]);
        self.shaft_y.extend([y, ey, f64::NAN]);

        let angle = dy.atan2(dx);
        let head = (HEAD_SHAFT_RATIO * length).min(head_cap);
        let (lx, ly) = (
            ex + head * (angle + HEAD_ANGLE).cos(),
            ey + head * (angle + HEAD_ANGLE).sin(),
        );
        let (rx, ry) = (
            ex + head * (angle - HEAD_ANGLE).cos(),
            ey + head * (angle - HEAD_ANGLE).sin(),
        );
        self.head_x.extend([ex, lx, rx, ex, f64::NAN]);
        self.head_y.extend([ey, ly, ry, ey, f64::NAN]);
    }

    fn is_empty(&self) -> bool {
        self.shaft_x.is_empty()
    }

    fn into_traces(self, name: String, style: &Style) -> Vec<Trace> {
        let color = style
            .color_at(0)
            .unwrap_or_else(|| DEFAULT_ARROW_COLOR.to_string());
        let line = Line {
            color: Some(color.clone()),
            width: style.line_width(),
            dash: None,
        };

        let mut shafts = Trace::scatter(self.shaft_x, self.shaft_y, TraceMode::Lines)
            .with_name(name.clone());
        shafts.line = Some(line.clone());
        shafts.opacity = style.opacity();
        shafts.legendgroup = Some(name.clone());

        let mut heads = Trace::scatter(self.head_x, self.head_y, TraceMode::Lines)
            .with_name(name.clone());
        heads.line = Some(line);
        heads.fill = Some("toself".to_string());
        heads.fillcolor = Some(color);
        heads.opacity = style.opacity();
        heads.legendgroup = Some(name);
        heads.showlegend = Some(false);
        heads.hoverinfo = Some("skip".to_string());

        vec![shafts, heads]
    }
}

// =============================================================================
// Field Sampling
// =============================================================================

#[derive(Debug)]
struct FieldGrid {
    /// `(x, y, u, v)` per grid point
    samples: Vec<[f64; 4]>,
    /// Smaller of the two grid spacings
    cell: f64,
}

impl FieldGrid {
    fn sample(spec: &GraphSpec, ctx: &mut BuildContext, components: &mut [CompiledExpr]) -> Self {
        let domain = spec.domain.as_ref();
        let sampling = spec.sampling.as_ref();
        let [x0, x1] = resolve_range_axis(domain, Axis::X, DEFAULT_DOMAIN);
        let [y0, y1] = resolve_range_axis(domain, Axis::Y, DEFAULT_DOMAIN);
        let cap = ctx.config().max_field_samples;
        let nx = resolve_sample_count_axis(sampling, Axis::X, DEFAULT_GRID);
        let nx = ctx.cap_samples("vector field x", nx, cap);
        let ny = resolve_sample_count_axis(sampling, Axis::Y, DEFAULT_GRID);
        let ny = ctx.cap_samples("vector field y", ny, cap);
        tracing::debug!(nx, ny, "sampling 2D vector field");

        let cell = ((x1 - x0).abs() / (nx - 1) as f64).min((y1 - y0).abs() / (ny - 1) as f64);
        let xs = linspace(x0, x1, nx);
        let ys = linspace(y0, y1, ny);

        let mut samples = Vec::with_capacity(nx * ny);
        for y in &ys {
            for x in &xs {
                let u = components[0].evaluate(&[*x, *y]);
                let v = components[1].evaluate(&[*x, *y]);
                samples.push([*x, *y, u, v]);
            }
        }
        Self { samples, cell }
    }

    fn arrows(&self, scale: f64) -> ArrowPaths {
        let mut paths = ArrowPaths::default();
        let magnitudes = self.samples.iter().map(|s| s[2].hypot(s[3]));
        let Some(saturation) = Saturation::from_magnitudes(magnitudes) else {
            return paths;
        };
        let head_cap = HEAD_CELL_RATIO * self.cell;
        for &[x, y, u, v] in &self.samples {
            let m = u.hypot(v);
            if !saturation.keeps(m) {
                continue;
            }
            let length = saturation.gain(m) * SHAFT_FRACTION * self.cell * scale;
            paths.push(x, y, u / m * length, v / m * length, head_cap);
        }
        paths
    }
}

fn field_label(sources: &[String], max_chars: usize) -> String {
    let inner = sources
        .iter()
        .map(|s| s.trim())
        .collect::<Vec<_>>()
        .join(", ");
    truncate_label(&format!("F = ({})", inner), max_chars)
}

fn field_traces(
    graph_type: &str,
    spec: &GraphSpec,
    sources: &[String],
    components: &mut [CompiledExpr],
    ctx: &mut BuildContext,
) -> Vec<Trace> {
    let grid = FieldGrid::sample(spec, ctx, components);
    let paths = grid.arrows(spec.style.scale_factor());
    if paths.is_empty() {
        ctx.warn(format!("{} field has no drawable arrows", graph_type));
        return Vec::new();
    }
    let name = field_label(sources, ctx.config().label_max_chars);
    paths.into_traces(name, &spec.style)
}

// =============================================================================
// Builders
// =============================================================================

/// Arrow field from `field` expressions, or literal vectors from `data`
#[derive(Debug, Clone, Copy)]
pub struct VectorField2D;

impl TraceBuilder for VectorField2D {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.field_components();
        if sources.is_empty() {
            if let Some(data) = spec.literal_data() {
                return literal_arrows(data, &spec.style);
            }
        }
        require_arity("vector_2d", &sources, 2)?;
        let mut components = CompiledExpr::compile_all(&sources, &["x", "y"])?;
        Ok(field_traces("vector_2d", spec, &sources, &mut components, ctx))
    }
}

impl std::fmt::Display for VectorField2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vector_2d")
    }
}

/// Literal vectors drawn at their true length
fn literal_arrows(data: &serde_json::Value, style: &Style) -> Result<Vec<Trace>> {
    let mut paths = ArrowPaths::default();
    for arrow in vectors_2d(data)? {
        paths.push(arrow.x, arrow.y, arrow.u, arrow.v, f64::INFINITY);
    }
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let name = style.name().unwrap_or_else(|| "vectors".to_string());
    Ok(paths.into_traces(name, style))
}

/// Direction field plus RK4 trajectories from each initial condition
#[derive(Debug, Clone, Copy)]
pub struct PhasePlane;

impl TraceBuilder for PhasePlane {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.field_components();
        require_arity("phase_plane", &sources, 2)?;
        let mut components = CompiledExpr::compile_all(&sources, &["x", "y"])?;

        let mut traces = field_traces("phase_plane", spec, &sources, &mut components, ctx);
        let seeds = spec.seeds();
        if seeds.is_empty() {
            return Ok(traces);
        }

        let span = trajectory_span(spec);
        let requested = trajectory_steps(spec);
        let cap = ctx.config().max_samples;
        let steps = ctx.cap_samples("trajectory", requested, cap);
        tracing::debug!(
            seeds = seeds.len(),
            steps,
            "integrating trajectories"
        );

        for (i, start) in seeds.iter().enumerate() {
            let (xs, ys) = integrate(&mut components, *start, span, steps);
            let mut trace = Trace::scatter(xs, ys, TraceMode::Lines)
                .with_name(format!("trajectory ({}, {})", start[0], start[1]));
            trace.line = line_from_style(&spec.style, i + 1);
            traces.push(trace);
        }
        Ok(traces)
    }
}

impl std::fmt::Display for PhasePlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "phase_plane")
    }
}

/// Integration span; only an explicit `t` key applies, since a bare range
/// describes the x/y window
fn trajectory_span(spec: &GraphSpec) -> [f64; 2] {
    let domain = spec.domain.as_ref();
    if has_axis_keys(domain, &[Axis::T]) {
        resolve_range_axis(domain, Axis::T, DEFAULT_T_DOMAIN)
    } else {
        DEFAULT_T_DOMAIN
    }
}

fn trajectory_steps(spec: &GraphSpec) -> usize {
    match spec.sampling.as_ref() {
        Some(s @ SamplingSpec::AxisKeyed(_)) => {
            resolve_sample_count_axis(Some(s), Axis::T, DEFAULT_STEPS)
        }
        _ => DEFAULT_STEPS,
    }
}

/// Classic fourth-order Runge-Kutta for `x' = f(x, y)`, `y' = g(x, y)`.
///
/// Stops early when the state leaves the finite range.
fn integrate(
    field: &mut [CompiledExpr],
    start: [f64; 2],
    span: [f64; 2],
    steps: usize,
) -> (Vec<f64>, Vec<f64>) {
    let h = (span[1] - span[0]) / steps as f64;
    let mut eval = |x: f64, y: f64| [field[0].evaluate(&[x, y]), field[1].evaluate(&[x, y])];

    let [mut x, mut y] = start;
    let mut xs = Vec::with_capacity(steps + 1);
    let mut ys = Vec::with_capacity(steps + 1);
    xs.push(x);
    ys.push(y);

    for _ in 0..steps {
        let k1 = eval(x, y);
        let k2 = eval(x + h / 2.0 * k1[0], y + h / 2.0 * k1[1]);
        let k3 = eval(x + h / 2.0 * k2[0], y + h / 2.0 * k2[1]);
        let k4 = eval(x + h * k3[0], y + h * k3[1]);
        let nx = x + h / 6.0 * (k1[0] + 2.0 * k2[0] + 2.0 * k3[0] + k4[0]);
        let ny = y + h / 6.0 * (k1[1] + 2.0 * k2[1] + 2.0 * k3[1] + k4[1]);
        if !(nx.is_finite() && ny.is_finite()) {
            break;
        }
        x = nx;
        y = ny;
        xs.push(x);
        ys.push(y);
    }
    (xs, ys)
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

    fn series(values: &Option<crate::plot::trace::Values>) -> Vec<f64> {
        values.as_ref().unwrap().as_series().unwrap().to_vec()
    }

    #[test]
    fn test_saturation_median_and_gain() {
        let s = Saturation::from_magnitudes([1.0, 3.0, 2.0, f64::NAN].into_iter()).unwrap();
        assert_eq!(s.median, 2.0);
        assert_eq!(s.gain(1.0), 0.5);
        assert!(s.gain(1e9) < 1.0);
        assert!(!s.keeps(0.05));
        assert!(s.keeps(0.1));
        assert!(!s.keeps(f64::INFINITY));

        let even = Saturation::from_magnitudes([0.0, 0.0, 1.0, 1.0].into_iter()).unwrap();
        assert_eq!(even.median, 0.5);
        assert!(Saturation::from_magnitudes([f64::NAN].into_iter()).is_none());
    }

    #[test]
    fn test_uniform_field_arrow_length() {
        let traces = build(
            &VectorField2D,
            json!({"field": ["1", "0"], "domain": [0, 1], "sampling": 2}),
        )
        .unwrap();
        assert_eq!(traces.len(), 2);

        // cell = 1, median = 1, g(1) = 1 / 1.5; length = g * 0.9 * cell
        let expected = 0.9 / 1.5;
        let xs = series(&traces[0].x);
        assert_eq!(xs.len(), 4 * 3);
        assert_eq!(xs[0], 0.0);
        assert!((xs[1] - expected).abs() < 1e-12);
        assert!(xs[2].is_nan());

        let heads = &traces[1];
        assert_eq!(heads.fill.as_deref(), Some("toself"));
        assert_eq!(series(&heads.x).len(), 4 * 5);
    }

    #[test]
    fn test_arrowhead_wings_symmetric() {
        let mut paths = ArrowPaths::default();
        paths.push(0.0, 0.0, 1.0, 0.0, f64::INFINITY);
        // tip, left wing, right wing, tip, gap
        assert_eq!(paths.head_x[0], 1.0);
        assert!((paths.head_y[1] + paths.head_y[2]).abs() < 1e-12);
        assert!(paths.head_x[1] < 1.0);
        let wing = (paths.head_x[1] - 1.0).hypot(paths.head_y[1]);
        assert!((wing - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_head_capped_by_cell() {
        let mut paths = ArrowPaths::default();
        paths.push(0.0, 0.0, 10.0, 0.0, 0.5);
        let wing = (paths.head_x[1] - 10.0).hypot(paths.head_y[1]);
        assert!((wing - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_weak_and_zero_vectors_skipped() {
        // radial field on [0,1]^2: the origin has zero magnitude
        let traces = build(
            &VectorField2D,
            json!({"field": ["x", "y"], "domain": [0, 1], "sampling": 2}),
        )
        .unwrap();
        let xs = series(&traces[0].x);
        assert_eq!(xs.len(), 3 * 3);
    }

    #[test]
    fn test_zero_field_warns_and_is_empty() {
        let spec: GraphSpec =
            serde_json::from_value(json!({"field": ["0", "0"], "sampling": 3})).unwrap();
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        let traces = VectorField2D.build(&spec, &mut ctx).unwrap();
        assert!(traces.is_empty());
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn test_literal_vectors_true_length() {
        let traces = build(&VectorField2D, json!({"data": [[1, 1, 3, 4]]})).unwrap();
        let xs = series(&traces[0].x);
        let ys = series(&traces[0].y);
        assert_eq!(&xs[..2], &[1.0, 4.0]);
        assert_eq!(&ys[..2], &[1.0, 5.0]);
    }

    #[test]
    fn test_vector_2d_arity() {
        let err = build(&VectorField2D, json!({"field": ["x"]})).unwrap_err();
        assert!(matches!(err, GraphSpecError::ArityError(_)));
    }

    #[test]
    fn test_scale_style_multiplies_length() {
        let traces = build(
            &VectorField2D,
            json!({"field": ["1", "0"], "domain": [0, 1], "sampling": 2, "style": {"scale": 0.5}}),
        )
        .unwrap();
        let xs = series(&traces[0].x);
        assert!((xs[1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_phase_plane_oscillator_returns_to_start() {
        let traces = build(
            &PhasePlane,
            json!({
                "expressions": ["y", "-x"],
                "domain": {"x": [-2, 2], "y": [-2, 2], "t": [0, "2*PI"]},
                "sampling": {"x": 5, "y": 5},
                "initial_conditions": [[1, 0]]
            }),
        )
        .unwrap();
        assert_eq!(traces.len(), 3);
        let path = &traces[2];
        let xs = series(&path.x);
        let ys = series(&path.y);
        assert_eq!(xs.len(), DEFAULT_STEPS + 1);
        assert!((xs[DEFAULT_STEPS] - 1.0).abs() < 1e-4);
        assert!(ys[DEFAULT_STEPS].abs() < 1e-4);
        assert_eq!(path.name.as_deref(), Some("trajectory (1, 0)"));
    }

    #[test]
    fn test_trajectory_stops_when_non_finite() {
        let mut f = CompiledExpr::compile_all(&["1/x".to_string(), "0".to_string()], &["x", "y"])
            .unwrap();
        let (xs, _) = integrate(&mut f, [0.0, 0.0], [0.0, 1.0], 10);
        assert_eq!(xs.len(), 1);
    }

    #[test]
    fn test_bare_domain_does_not_set_time_span() {
        let spec: GraphSpec = serde_json::from_value(json!({"domain": [-3, 3]})).unwrap();
        assert_eq!(trajectory_span(&spec), DEFAULT_T_DOMAIN);
    }
}
