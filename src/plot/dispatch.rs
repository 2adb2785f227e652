//! Composite dispatcher
//!
//! Routes a spec, or each layer of a composite spec, to its trace builder.
//! Builder failures never escape: they are recorded as diagnostics on the
//! [`BuildContext`] and the offending spec or layer contributes no traces.

use super::data::looks_3d;
use super::diagnostic::{BuildContext, Diagnostic};
use super::layer::Builder;
use super::trace::Trace;
use super::types::{Dimension, GraphSpec, GraphType};
use crate::config::RenderConfig;
use crate::GraphSpecError;

/// Traces plus the diagnostics recorded while building them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub traces: Vec<Trace>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve the effective graph type of a spec or layer.
///
/// An explicit `type` always wins. Otherwise, in order: `layers` means a
/// composite; `field` means a vector field (3D with three components);
/// `data` means a scatter (`scatter_3d` when rows carry three numbers);
/// `coordinates` means points (`point_3d` for three numbers); anything else
/// is a function. `dimension`
/// picks the 3D variants inside a `composite_3d`.
pub fn infer_type(spec: &GraphSpec, dimension: Dimension) -> GraphType {
    if let Some(graph_type) = &spec.graph_type {
        return graph_type.clone();
    }
    let three_d = dimension == Dimension::Three;

    if !spec.layers.is_empty() {
        return if three_d {
            GraphType::Composite3D
        } else {
            GraphType::Composite2D
        };
    }
    if let Some(field) = &spec.field {
        return if three_d || field.to_vec().len() == 3 {
            GraphType::VectorField3D
        } else {
            GraphType::Vector2D
        };
    }
    if let Some(data) = &spec.data {
        return if three_d || looks_3d(data) {
            GraphType::Scatter3D
        } else {
            GraphType::Scatter2D
        };
    }
    if let Some(coordinates) = &spec.coordinates {
        return if three_d || looks_3d(coordinates) {
            GraphType::Point3D
        } else {
            GraphType::Point2D
        };
    }
    if three_d {
        GraphType::Function3D
    } else {
        GraphType::Function2D
    }
}

/// Build the traces for a spec, collecting diagnostics
pub fn build_traces(spec: &GraphSpec, config: &RenderConfig) -> BuildOutput {
    let mut ctx = BuildContext::new(config);
    let traces = dispatch(spec, &mut ctx);
    BuildOutput {
        traces,
        diagnostics: ctx.into_diagnostics(),
    }
}

/// Dispatch a spec to its builder, or each layer of a composite in order.
///
/// Every trace of a composite gets `showlegend`, true only when the
/// composite has more than one layer. Traces a builder already hid from the
/// legend stay hidden.
pub fn dispatch(spec: &GraphSpec, ctx: &mut BuildContext) -> Vec<Trace> {
    warn_unusable(spec, ctx);
    let graph_type = infer_type(spec, Dimension::Two);
    if graph_type.is_composite() {
        dispatch_layers(spec, graph_type.dimension(), ctx)
    } else {
        build_single(spec, &graph_type, ctx)
    }
}

fn dispatch_layers(spec: &GraphSpec, dimension: Dimension, ctx: &mut BuildContext) -> Vec<Trace> {
    if spec.layers.is_empty() {
        ctx.warn("composite spec has no layers");
        return Vec::new();
    }
    let show_legend = spec.layers.len() > 1;
    let mut traces = Vec::new();

    for (idx, layer) in spec.layers.iter().enumerate() {
        ctx.set_layer(Some(idx));
        let layer_type = infer_type(layer, dimension);
        if layer_type.is_composite() {
            ctx.error("nested composite layers are not supported");
            continue;
        }

        // each layer keeps its own domain and sampling; builders apply
        // their defaults when a layer has none
        let mut resolved = layer.clone();
        resolved.graph_type = Some(layer_type.clone());
        warn_unusable(&resolved, ctx);

        let layer_traces = build_single(&resolved, &layer_type, ctx);
        traces.extend(layer_traces.into_iter().map(|mut trace| {
            trace.showlegend = Some(show_legend && trace.showlegend != Some(false));
            trace
        }));
    }

    ctx.set_layer(None);
    traces
}

/// Loosely typed fields that could not be read are dropped with a warning
fn warn_unusable(spec: &GraphSpec, ctx: &mut BuildContext) {
    for key in spec.unusable_keys() {
        ctx.warn(format!("ignoring unusable `{}` value", key));
    }
}

fn build_single(spec: &GraphSpec, graph_type: &GraphType, ctx: &mut BuildContext) -> Vec<Trace> {
    let Some(builder) = Builder::for_type(graph_type) else {
        ctx.error(GraphSpecError::UnsupportedType(graph_type.to_string()).to_string());
        return Vec::new();
    };
    match builder.build(spec, ctx) {
        Ok(traces) => {
            tracing::debug!(graph_type = %builder, traces = traces.len(), "built traces");
            traces
        }
        Err(e) => {
            ctx.error(e.to_string());
            Vec::new()
        }
    }
}
