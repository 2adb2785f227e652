//! 3D vector fields as a single cone trace
//!
//! Reuses the saturating scale of the 2D field. Two extra bounds keep large
//! domains readable: an adaptive factor `min(1, 100 / extent)` and an
//! absolute cap of 10% of the largest domain extent on every cone length.

use super::field::Saturation;
use super::{require_arity, TraceBuilder};
use crate::naming::truncate_label;
use crate::plot::diagnostic::BuildContext;
use crate::plot::expression::CompiledExpr;
use crate::plot::resolve::{linspace, resolve_range_axis, resolve_sample_count_axis};
use crate::plot::style::{colorscale, DEFAULT_COLORSCALE};
use crate::plot::trace::{Trace, TraceKind, Values};
use crate::plot::types::{Axis, GraphSpec};
use crate::Result;

/// Default range on x, y and z
pub const DEFAULT_DOMAIN: [f64; 2] = [-2.0, 2.0];

/// Default grid points per axis
pub const DEFAULT_GRID: usize = 6;

const SHAFT_FRACTION: f64 = 0.9;
const ADAPTIVE_EXTENT: f64 = 100.0;
const MAX_LENGTH_FRACTION: f64 = 0.1;

/// `F(x, y, z) = (u, v, w)` sampled on a cube grid
#[derive(Debug, Clone, Copy)]
pub struct VectorField3D;

impl TraceBuilder for VectorField3D {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.field_components();
        require_arity("vector_field_3d", &sources, 3)?;
        let mut f = CompiledExpr::compile_all(&sources, &["x", "y", "z"])?;

        let domain = spec.domain.as_ref();
        let sampling = spec.sampling.as_ref();
        let cap = ctx.config().max_field_samples_3d;
        let mut axes: Vec<Vec<f64>> = Vec::with_capacity(3);
        let mut extent: f64 = 0.0;
        let mut cell = f64::INFINITY;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let [lo, hi] = resolve_range_axis(domain, axis, DEFAULT_DOMAIN);
            let n = resolve_sample_count_axis(sampling, axis, DEFAULT_GRID);
            let n = ctx.cap_samples(&format!("vector field {}", axis.key()), n, cap);
            let span = (hi - lo).abs();
            extent = extent.max(span);
            cell = cell.min(span / (n - 1) as f64);
            axes.push(linspace(lo, hi, n));
        }
        tracing::debug!(
            nx = axes[0].len(),
            ny = axes[1].len(),
            nz = axes[2].len(),
            "sampling 3D vector field"
        );

        let mut samples = Vec::with_capacity(axes.iter().map(Vec::len).product());
        for z in &axes[2] {
            for y in &axes[1] {
                for x in &axes[0] {
                    let at = [*x, *y, *z];
                    let vec = [f[0].evaluate(&at), f[1].evaluate(&at), f[2].evaluate(&at)];
                    samples.push((at, vec));
                }
            }
        }

        let magnitude = |v: &[f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        let magnitudes = samples.iter().map(|(_, v)| magnitude(v));
        let Some(saturation) = Saturation::from_magnitudes(magnitudes) else {
            ctx.warn("vector_field_3d field has no finite vectors");
            return Ok(Vec::new());
        };

        let adaptive = if extent > 0.0 {
            (ADAPTIVE_EXTENT / extent).min(1.0)
        } else {
            1.0
        };
        let max_length = MAX_LENGTH_FRACTION * extent;
        let scale = spec.style.scale_factor();

        let mut cols: [Vec<f64>; 6] = Default::default();
        for (at, vec) in &samples {
            let m = magnitude(vec);
            if !saturation.keeps(m) {
                continue;
            }
            let length = (saturation.gain(m) * SHAFT_FRACTION * cell * scale * adaptive)
                .min(max_length);
            let values = [
                at[0],
                at[1],
                at[2],
                vec[0] / m * length,
                vec[1] / m * length,
                vec[2] / m * length,
            ];
            for (col, value) in cols.iter_mut().zip(values) {
                col.push(value);
            }
        }

        if cols[0].is_empty() {
            ctx.warn("vector_field_3d field has no drawable arrows");
            return Ok(Vec::new());
        }

        let [x, y, z, u, v, w] = cols;
        let inner = sources
            .iter()
            .map(|s| s.trim())
            .collect::<Vec<_>>()
            .join(", ");
        let max_chars = ctx.config().label_max_chars;
        let mut trace = Trace::new(TraceKind::Cone)
            .with_name(truncate_label(&format!("F = ({})", inner), max_chars));
        trace.x = Some(Values::Series(x));
        trace.y = Some(Values::Series(y));
        trace.z = Some(Values::Series(z));
        trace.u = Some(Values::Series(u));
        trace.v = Some(Values::Series(v));
        trace.w = Some(Values::Series(w));
        trace.sizemode = Some("absolute".to_string());
        trace.sizeref = Some(1.0);
        trace.anchor = Some("tail".to_string());
        trace.colorscale = Some(
            spec.style
                .colormap()
                .as_deref()
                .map(colorscale)
                .unwrap_or_else(|| DEFAULT_COLORSCALE.to_string()),
        );
        trace.showscale = Some(false);
        trace.opacity = spec.style.opacity();
        Ok(vec![trace])
    }
}

impl std::fmt::Display for VectorField3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vector_field_3d")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::GraphSpecError;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Result<Vec<Trace>> {
        let spec: GraphSpec = serde_json::from_value(value).unwrap();
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        VectorField3D.build(&spec, &mut ctx)
    }

    fn series(values: &Option<Values>) -> Vec<f64> {
        values.as_ref().unwrap().as_series().unwrap().to_vec()
    }

    #[test]
    fn test_default_grid_single_cone_trace() {
        let traces = build(json!({"field": ["1", "0", "0"]})).unwrap();
        assert_eq!(traces.len(), 1);
        let t = &traces[0];
        assert_eq!(t.kind, TraceKind::Cone);
        assert_eq!(series(&t.x).len(), DEFAULT_GRID.pow(3));
        assert_eq!(t.anchor.as_deref(), Some("tail"));
    }

    #[test]
    fn test_uniform_length() {
        // extent 4, cell 0.8, g = 2/3: 0.48 is capped at 0.4
        let traces = build(json!({"field": ["0", "0", "2"]})).unwrap();
        let w = series(&traces[0].w);
        assert!(w.iter().all(|l| (l - 0.4).abs() < 1e-12));
    }

    #[test]
    fn test_length_below_cap() {
        // extent 10, cell 2: 2/3 * 0.9 * 2 * 0.5 = 0.6, under the 1.0 cap
        let traces = build(json!({
            "field": ["1", "0", "0"],
            "domain": [0, 10],
            "style": {"scale": 0.5}
        }))
        .unwrap();
        let u = series(&traces[0].u);
        assert!(u.iter().all(|l| (l - 0.6).abs() < 1e-12));
    }

    #[test]
    fn test_adaptive_factor_for_large_domain() {
        // extent 1000 -> adaptive 0.1; cell 200; length = 2/3 * 0.9 * 200 * 0.1 = 12
        let traces = build(json!({"field": ["0", "1", "0"], "domain": [0, 1000]})).unwrap();
        let v = series(&traces[0].v);
        assert!(v.iter().all(|l| (l - 12.0).abs() < 1e-9));
    }

    #[test]
    fn test_z_axis_key() {
        let traces = build(json!({
            "field": ["1", "1", "1"],
            "domain": {"z": [5, 6]},
            "sampling": {"x": 2, "y": 2, "z": 3}
        }))
        .unwrap();
        let z = series(&traces[0].z);
        assert_eq!(z.len(), 12);
        assert_eq!(z[0], 5.0);
        assert_eq!(z[11], 6.0);
    }

    #[test]
    fn test_arity() {
        let err = build(json!({"field": ["x", "y"]})).unwrap_err();
        assert!(matches!(err, GraphSpecError::ArityError(_)));
    }
}
