//! Function curve builders: `function_2d` and `cartesian`

use super::points::marker_points_2d;
use super::{require_expressions, style_line_trace, TraceBuilder};
use crate::naming::expression_label;
use crate::plot::diagnostic::BuildContext;
use crate::plot::expression::CompiledExpr;
use crate::plot::resolve::{linspace, resolve_range_2d, resolve_sample_count_2d};
use crate::plot::trace::{Trace, TraceMode};
use crate::plot::types::GraphSpec;
use crate::Result;

/// Default x range when the spec has no domain
pub const DEFAULT_DOMAIN: [f64; 2] = [-10.0, 10.0];

/// Default number of samples along x
pub const DEFAULT_SAMPLES: usize = 400;

/// `y = f(x)` curves, one trace per expression
#[derive(Debug, Clone, Copy)]
pub struct FunctionCurve;

impl TraceBuilder for FunctionCurve {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.expressions();
        require_expressions("function_2d", &sources)?;
        function_traces(spec, &sources, ctx)
    }
}

impl std::fmt::Display for FunctionCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "function_2d")
    }
}

/// Cartesian plane: function curves when expressions are given, otherwise
/// the literal points as markers
#[derive(Debug, Clone, Copy)]
pub struct Cartesian;

impl TraceBuilder for Cartesian {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.expressions();
        if sources.is_empty() && spec.literal_data().is_some() {
            return marker_points_2d("cartesian", spec);
        }
        require_expressions("cartesian", &sources)?;
        function_traces(spec, &sources, ctx)
    }
}

impl std::fmt::Display for Cartesian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cartesian")
    }
}

fn function_traces(
    spec: &GraphSpec,
    sources: &[String],
    ctx: &mut BuildContext,
) -> Result<Vec<Trace>> {
    let mut compiled = CompiledExpr::compile_all(sources, &["x"])?;

    let [min, max] = resolve_range_2d(spec.domain.as_ref(), DEFAULT_DOMAIN);
    let requested = resolve_sample_count_2d(spec.sampling.as_ref(), DEFAULT_SAMPLES);
    let cap = ctx.config().max_samples;
    let n = ctx.cap_samples("curve", requested, cap);
    let max_chars = ctx.config().label_max_chars;

    tracing::debug!(samples = n, expressions = compiled.len(), "sampling y = f(x)");

    let xs = linspace(min, max, n);
    let traces = compiled
        .iter_mut()
        .enumerate()
        .map(|(i, f)| {
            let ys = xs.iter().map(|x| f.evaluate(&[*x])).collect();
            let mut trace = Trace::scatter(xs.clone(), ys, TraceMode::Lines)
                .with_name(expression_label("y", f.source(), max_chars));
            style_line_trace(&mut trace, &spec.style, i);
            trace
        })
        .collect();
    Ok(traces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use crate::plot::trace::TraceKind;
    use crate::GraphSpecError;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> GraphSpec {
        serde_json::from_value(value).unwrap()
    }

    fn build(builder: &dyn TraceBuilder, spec: &GraphSpec) -> Result<Vec<Trace>> {
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        builder.build(spec, &mut ctx)
    }

    #[test]
    fn test_parabola_five_samples() {
        let s = spec(json!({
            "type": "function_2d",
            "expression": "x^2",
            "domain": [-2, 2],
            "sampling": 5
        }));
        let traces = build(&FunctionCurve, &s).unwrap();
        assert_eq!(traces.len(), 1);
        let t = &traces[0];
        assert_eq!(t.kind, TraceKind::Scatter);
        assert_eq!(t.mode, Some(TraceMode::Lines));
        assert_eq!(
            t.x.as_ref().unwrap().as_series().unwrap(),
            &[-2.0, -1.0, 0.0, 1.0, 2.0]
        );
        assert_eq!(
            t.y.as_ref().unwrap().as_series().unwrap(),
            &[4.0, 1.0, 0.0, 1.0, 4.0]
        );
        assert_eq!(t.name.as_deref(), Some("y = x^2"));
    }

    #[test]
    fn test_one_trace_per_expression() {
        let s = spec(json!({"expressions": ["sin(x)", "cos(x)", "x"], "sampling": 10}));
        let traces = build(&FunctionCurve, &s).unwrap();
        assert_eq!(traces.len(), 3);
        assert!(traces.iter().all(|t| t.x.as_ref().unwrap().len() == 10));
    }

    #[test]
    fn test_defaults_applied() {
        let s = spec(json!({"expression": "x"}));
        let traces = build(&FunctionCurve, &s).unwrap();
        let xs = traces[0].x.as_ref().unwrap().as_series().unwrap();
        assert_eq!(xs.len(), DEFAULT_SAMPLES);
        assert_eq!(xs[0], -10.0);
        assert_eq!(xs[DEFAULT_SAMPLES - 1], 10.0);
    }

    #[test]
    fn test_domain_error_points_become_nan() {
        let s = spec(json!({"expression": "sqrt(x)", "domain": [-1, 1], "sampling": 3}));
        let traces = build(&FunctionCurve, &s).unwrap();
        let ys = traces[0].y.as_ref().unwrap().as_series().unwrap();
        assert!(ys[0].is_nan());
        assert_eq!(ys[1], 0.0);
        assert_eq!(ys[2], 1.0);
    }

    #[test]
    fn test_compile_failure_is_error() {
        let s = spec(json!({"expression": "x +* 2"}));
        let err = build(&FunctionCurve, &s).unwrap_err();
        assert!(matches!(err, GraphSpecError::ExpressionError { .. }));
    }

    #[test]
    fn test_missing_expression_is_arity_error() {
        let err = build(&FunctionCurve, &spec(json!({}))).unwrap_err();
        assert!(matches!(err, GraphSpecError::ArityError(_)));
    }

    #[test]
    fn test_sampling_capped_with_warning() {
        let config = RenderConfig {
            max_samples: 50,
            ..Default::default()
        };
        let mut ctx = BuildContext::new(&config);
        let s = spec(json!({"expression": "x", "sampling": 10000}));
        let traces = FunctionCurve.build(&s, &mut ctx).unwrap();
        assert_eq!(traces[0].x.as_ref().unwrap().len(), 50);
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn test_style_applied() {
        let s = spec(json!({
            "expression": "x",
            "style": {"color": "red", "lineStyle": "dashed", "opacity": 0.5}
        }));
        let traces = build(&FunctionCurve, &s).unwrap();
        let line = traces[0].line.as_ref().unwrap();
        assert_eq!(line.color.as_deref(), Some("red"));
        assert_eq!(line.dash.as_deref(), Some("dash"));
        assert_eq!(traces[0].opacity, Some(0.5));
    }

    #[test]
    fn test_cartesian_with_expressions_and_with_points() {
        let curves = build(&Cartesian, &spec(json!({"expression": "2*x", "sampling": 3}))).unwrap();
        assert_eq!(curves[0].mode, Some(TraceMode::Lines));

        let points = build(&Cartesian, &spec(json!({"coordinates": [[1, 2], [3, 4]]}))).unwrap();
        assert_eq!(points[0].mode, Some(TraceMode::Markers));
        assert_eq!(points[0].x.as_ref().unwrap().len(), 2);
    }
}
