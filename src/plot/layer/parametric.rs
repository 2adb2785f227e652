//! Parametric builders: 2D curves, 3D curves and 3D surfaces
//!
//! `parametric_3d` has no explicit curve/surface flag. A domain carrying `u`
//! or `v` keys selects a surface over a `u x v` grid; a `t` key, a bare range
//! or no domain at all selects a curve in `t`.

use std::f64::consts::PI;

use super::{require_arity, style_line_trace, TraceBuilder};
use crate::naming::truncate_label;
use crate::plot::diagnostic::BuildContext;
use crate::plot::expression::CompiledExpr;
use crate::plot::resolve::{
    has_axis_keys, linspace, resolve_range_axis, resolve_sample_count_2d,
    resolve_sample_count_axis,
};
use crate::plot::style::{colorscale, DEFAULT_COLORSCALE};
use crate::plot::trace::{Trace, TraceKind, TraceMode, Values};
use crate::plot::types::{Axis, GraphSpec};
use crate::Result;

/// Default parameter range for curves
pub const DEFAULT_T_DOMAIN: [f64; 2] = [0.0, 2.0 * PI];

/// Default samples along `t`
pub const DEFAULT_CURVE_SAMPLES: usize = 400;

/// Default `u` range for surfaces
pub const DEFAULT_U_DOMAIN: [f64; 2] = [0.0, 2.0 * PI];

/// Default `v` range for surfaces
pub const DEFAULT_V_DOMAIN: [f64; 2] = [0.0, PI];

/// Default samples per surface axis
pub const DEFAULT_SURFACE_SAMPLES: usize = 40;

/// `(x(t), y(t))`
#[derive(Debug, Clone, Copy)]
pub struct Parametric2D;

impl TraceBuilder for Parametric2D {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.expressions();
        require_arity("parametric_2d", &sources, 2)?;
        let mut f = CompiledExpr::compile_all(&sources, &["t"])?;

        let ts = curve_parameter(spec, ctx);
        let xs = ts.iter().map(|t| f[0].evaluate(&[*t])).collect();
        let ys = ts.iter().map(|t| f[1].evaluate(&[*t])).collect();

        let mut trace = Trace::scatter(xs, ys, TraceMode::Lines)
            .with_name(curve_label(&sources, ctx.config().label_max_chars));
        style_line_trace(&mut trace, &spec.style, 0);
        Ok(vec![trace])
    }
}

impl std::fmt::Display for Parametric2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parametric_2d")
    }
}

/// `(x, y, z)` of `t` (curve) or of `(u, v)` (surface)
#[derive(Debug, Clone, Copy)]
pub struct Parametric3D;

impl TraceBuilder for Parametric3D {
    fn build(&self, spec: &GraphSpec, ctx: &mut BuildContext) -> Result<Vec<Trace>> {
        let sources = spec.expressions();
        require_arity("parametric_3d", &sources, 3)?;
        if is_surface(spec) {
            surface(spec, &sources, ctx)
        } else {
            curve_3d(spec, &sources, ctx)
        }
    }
}

impl std::fmt::Display for Parametric3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parametric_3d")
    }
}

/// Whether a `parametric_3d` spec describes a surface
pub fn is_surface(spec: &GraphSpec) -> bool {
    has_axis_keys(spec.domain.as_ref(), &[Axis::U, Axis::V])
}

fn curve_parameter(spec: &GraphSpec, ctx: &mut BuildContext) -> Vec<f64> {
    let [t0, t1] = resolve_range_axis(spec.domain.as_ref(), Axis::T, DEFAULT_T_DOMAIN);
    let requested = resolve_sample_count_2d(spec.sampling.as_ref(), DEFAULT_CURVE_SAMPLES);
    let cap = ctx.config().max_samples;
    let n = ctx.cap_samples("parametric curve", requested, cap);
    tracing::debug!(samples = n, "sampling parametric curve");
    linspace(t0, t1, n)
}

fn curve_label(sources: &[String], max_chars: usize) -> String {
    let inner = sources
        .iter()
        .map(|s| s.trim())
        .collect::<Vec<_>>()
        .join(", ");
    truncate_label(&format!("({})", inner), max_chars)
}

fn curve_3d(spec: &GraphSpec, sources: &[String], ctx: &mut BuildContext) -> Result<Vec<Trace>> {
    let mut f = CompiledExpr::compile_all(sources, &["t"])?;
    let ts = curve_parameter(spec, ctx);

    let mut coords: [Vec<f64>; 3] = Default::default();
    for (axis, out) in coords.iter_mut().enumerate() {
        *out = ts.iter().map(|t| f[axis].evaluate(&[*t])).collect();
    }
    let [xs, ys, zs] = coords;

    let mut trace = Trace::scatter3d(xs, ys, zs, TraceMode::Lines)
        .with_name(curve_label(sources, ctx.config().label_max_chars));
    style_line_trace(&mut trace, &spec.style, 0);
    Ok(vec![trace])
}

fn surface(spec: &GraphSpec, sources: &[String], ctx: &mut BuildContext) -> Result<Vec<Trace>> {
    let mut f = CompiledExpr::compile_all(sources, &["u", "v"])?;

    let [u0, u1] = resolve_range_axis(spec.domain.as_ref(), Axis::U, DEFAULT_U_DOMAIN);
    let [v0, v1] = resolve_range_axis(spec.domain.as_ref(), Axis::V, DEFAULT_V_DOMAIN);
    let cap = ctx.config().max_grid_samples;
    let nu = resolve_sample_count_axis(spec.sampling.as_ref(), Axis::U, DEFAULT_SURFACE_SAMPLES);
    let nu = ctx.cap_samples("surface u", nu, cap);
    let nv = resolve_sample_count_axis(spec.sampling.as_ref(), Axis::V, DEFAULT_SURFACE_SAMPLES);
    let nv = ctx.cap_samples("surface v", nv, cap);
    tracing::debug!(nu, nv, "sampling parametric surface");

    let us = linspace(u0, u1, nu);
    let vs = linspace(v0, v1, nv);

    // Rows follow v, columns follow u
    let mut grids: [Vec<Vec<f64>>; 3] = Default::default();
    for (axis, grid) in grids.iter_mut().enumerate() {
        *grid = vs
            .iter()
            .map(|v| us.iter().map(|u| f[axis].evaluate(&[*u, *v])).collect())
            .collect();
    }
    let [xs, ys, zs] = grids;

    let mut trace = Trace::new(TraceKind::Surface)
        .with_name(curve_label(sources, ctx.config().label_max_chars));
    trace.x = Some(Values::Grid(xs));
    trace.y = Some(Values::Grid(ys));
    trace.z = Some(Values::Grid(zs));
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
