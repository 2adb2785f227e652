//! `z = f(x, y)` surfaces

use super::{require_expressions, TraceBuilder};
use crate::naming::expression_label;
use crate::plot::diagnostic::BuildContext;
use crate::plot::expression::CompiledExpr;
use crate::plot::resolve::{linspace, resolve_range_axis, resolve_sample_count_axis};
use crate::plot::style::{colorscale, DEFAULT_COLORSCALE};
use crate::plot::trace::{Trace, TraceKind, Values};
use crate::plot::types::{Axis, GraphSpec};
use crate::Result;

/// Default range on both x and y
pub const DEFAULT_DOMAIN: [f64; 2] = [-5.0, 5.0];

/// Default samples per axis
pub const DEFAULT_SAMPLES: usize = 50;

/// Height-field surface, one trace per expression
#[derive(Debug, Clone, Copy)]
pub struct FunctionSurface;

impl TraceBuilder for FunctionSurface {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.expressions();
        require_expressions("function_3d", &sources)?;
        let mut compiled = CompiledExpr::compile_all(&sources, &["x", "y"])?;

        let domain = spec.domain.as_ref();
        let sampling = spec.sampling.as_ref();
        let [x0, x1] = resolve_range_axis(domain, Axis::X, DEFAULT_DOMAIN);
        let [y0, y1] = resolve_range_axis(domain, Axis::Y, DEFAULT_DOMAIN);
        let cap = ctx.config().max_grid_samples;
        let nx = resolve_sample_count_axis(sampling, Axis::X, DEFAULT_SAMPLES);
        let nx = ctx.cap_samples("surface x", nx, cap);
        let ny = resolve_sample_count_axis(sampling, Axis::Y, DEFAULT_SAMPLES);
        let ny = ctx.cap_samples("surface y", ny, cap);
        tracing::debug!(nx, ny, surfaces = compiled.len(), "sampling z = f(x, y)");

        let xs = linspace(x0, x1, nx);
        let ys = linspace(y0, y1, ny);
        let max_chars = ctx.config().label_max_chars;
        let scale = spec
            .style
            .colormap()
            .as_deref()
            .map(colorscale)
            .unwrap_or_else(|| DEFAULT_COLORSCALE.to_string());

        let traces = compiled
            .iter_mut()
            .map(|f| {
                // z[j][i] = f(x[i], y[j])
                let zs: Vec<Vec<f64>> = ys
                    .iter()
                    .map(|y| xs.iter().map(|x| f.evaluate(&[*x, *y])).collect())
                    .collect();
                let mut trace = Trace::new(TraceKind::Surface)
                    .with_name(expression_label("z", f.source(), max_chars));
                trace.x = Some(Values::Series(xs.clone()));
                trace.y = Some(Values::Series(ys.clone()));
                trace.z = Some(Values::Grid(zs));
                trace.colorscale = Some(scale.clone());
                trace.showscale = Some(false);
                trace.opacity = spec.style.opacity();
                trace
            })
            .collect();
        Ok(traces)
    }
}

impl std::fmt::Display for FunctionSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function_3d")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use serde_json::json;

    fn build(value: serde_json::Value) -> Result<Vec<Trace>> {
        let spec: GraphSpec = serde_json::from_value(value).unwrap();
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        FunctionSurface.build(&spec, &mut ctx)
    }

    #[test]
    fn test_saddle_grid_orientation() {
        let traces = build(json!({
            "expression": "x^2 - y^2",
            "domain": {"x": [-1, 1], "y": [0, 2]},
            "sampling": {"x": 3, "y": 2}
        }))
        .unwrap();
        let t = &traces[0];
        assert_eq!(t.x.as_ref().unwrap().as_series().unwrap(), &[-1.0, 0.0, 1.0]);
        assert_eq!(t.y.as_ref().unwrap().as_series().unwrap(), &[0.0, 2.0]);
        match t.z.as_ref().unwrap() {
            Values::Grid(rows) => {
                assert_eq!(rows, &vec![vec![1.0, 0.0, 1.0], vec![-3.0, -4.0, -3.0]]);
            }
            other => panic!("expected grid, got {:?}", other),
        }
        assert_eq!(t.name.as_deref(), Some("z = x^2 - y^2"));
    }

    #[test]
    fn test_defaults_and_colormap() {
        let traces = build(json!({
            "expression": "x*y",
            "style": {"colormap": "plasma"}
        }))
        .unwrap();
        let t = &traces[0];
        assert_eq!(t.x.as_ref().unwrap().len(), DEFAULT_SAMPLES);
        assert_eq!(t.z.as_ref().unwrap().len(), DEFAULT_SAMPLES * DEFAULT_SAMPLES);
        assert_eq!(t.colorscale.as_deref(), Some("Plasma"));
    }

    #[test]
    fn test_shared_pair_domain_applies_to_both_axes() {
        let traces = build(json!({"expression": "x", "domain": [0, 1], "sampling": 2})).unwrap();
        assert_eq!(traces[0].y.as_ref().unwrap().as_series().unwrap(), &[0.0, 1.0]);
    }
}
