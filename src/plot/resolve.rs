//! Domain and sampling normalizers
//!
//! Total functions that turn the shapes a producer may write for `domain` and
//! `sampling` into canonical `[min, max]` ranges and point counts. None of
//! them fail: unrecognised shapes, unparseable bounds and non-finite values
//! fall back to the caller's default. Builders call them once per axis they
//! need, since variants use different axis subsets.

use super::expression::eval_constant;
use super::types::{Axis, Bound, RangeSpec, SamplingSpec};

/// Smallest usable point count on any axis (step computation divides by n-1)
pub const MIN_SAMPLES: usize = 2;

// =============================================================================
// Ranges
// =============================================================================

/// Resolve a 2D plot range from `[a, b]`, `{"x": [a, b]}` or `{"min": a, "max": b}`.
pub fn resolve_range_2d(value: Option<&RangeSpec>, default: [f64; 2]) -> [f64; 2] {
    match value {
        Some(RangeSpec::AxisKeyed(axes)) => match axes.get(Axis::X.key()) {
            Some(RangeSpec::Pair(pair)) => pair_value(pair).unwrap_or(default),
            _ => default,
        },
        Some(other) => direct_range(other).unwrap_or(default),
        None => default,
    }
}

/// Resolve the range for one axis.
///
/// A bare pair or min/max object applies to every axis; a keyed object
/// supplies per-axis ranges.
pub fn resolve_range_axis(value: Option<&RangeSpec>, axis: Axis, default: [f64; 2]) -> [f64; 2] {
    match value {
        Some(RangeSpec::AxisKeyed(axes)) => axes
            .get(axis.key())
            .and_then(direct_range)
            .unwrap_or(default),
        Some(other) => direct_range(other).unwrap_or(default),
        None => default,
    }
}

/// `Pair` and `MinMax` shapes, evaluated
fn direct_range(value: &RangeSpec) -> Option<[f64; 2]> {
    match value {
        RangeSpec::Pair(pair) => pair_value(pair),
        RangeSpec::MinMax { min, max } => pair_value(&[min.clone(), max.clone()]),
        RangeSpec::AxisKeyed(_) | RangeSpec::Unrecognized(_) => None,
    }
}

fn pair_value(pair: &[Bound; 2]) -> Option<[f64; 2]> {
    Some([bound_value(&pair[0])?, bound_value(&pair[1])?])
}

/// Numeric value of a range endpoint; string endpoints are constant expressions
pub fn bound_value(bound: &Bound) -> Option<f64> {
    match bound {
        Bound::Number(n) if n.is_finite() => Some(*n),
        Bound::Number(_) => None,
        Bound::Expr(text) => eval_constant(text),
    }
}

// =============================================================================
// Sample Counts
// =============================================================================

/// Resolve a 2D sample count from a number or an object with `x` or `t`.
pub fn resolve_sample_count_2d(value: Option<&SamplingSpec>, default: usize) -> usize {
    let resolved = match value {
        Some(SamplingSpec::Count(n)) => count_value(*n),
        Some(SamplingSpec::AxisKeyed(axes)) => [Axis::X, Axis::T]
            .iter()
            .find_map(|axis| match axes.get(axis.key()) {
                Some(SamplingSpec::Count(n)) => count_value(*n),
                _ => None,
            }),
        _ => None,
    };
    resolved.unwrap_or(default).max(MIN_SAMPLES)
}

/// Resolve the sample count for one axis; a bare number applies to every axis.
pub fn resolve_sample_count_axis(
    value: Option<&SamplingSpec>,
    axis: Axis,
    default: usize,
) -> usize {
    let resolved = match value {
        Some(SamplingSpec::Count(n)) => count_value(*n),
        Some(SamplingSpec::AxisKeyed(axes)) => match axes.get(axis.key()) {
            Some(SamplingSpec::Count(n)) => count_value(*n),
            _ => None,
        },
        _ => None,
    };
    resolved.unwrap_or(default).max(MIN_SAMPLES)
}

fn count_value(n: f64) -> Option<usize> {
    if n.is_finite() && n >= 0.0 {
        Some(n.round() as usize)
    } else {
        None
    }
}

// =============================================================================
// Structural Inference Helpers
// =============================================================================

/// Axis keys present in a per-axis domain object
pub fn axis_keys(value: Option<&RangeSpec>) -> Vec<Axis> {
    match value {
        Some(RangeSpec::AxisKeyed(axes)) => Axis::ALL
            .iter()
            .copied()
            .filter(|a| axes.contains_key(a.key()))
            .collect(),
        _ => Vec::new(),
    }
}

/// Whether the domain carries any of the given axis keys
pub fn has_axis_keys(value: Option<&RangeSpec>, keys: &[Axis]) -> bool {
    let present = axis_keys(value);
    keys.iter().any(|k| present.contains(k))
}

// =============================================================================
// Sampling
// =============================================================================

/// `n` evenly spaced values over `[min, max]`, both endpoints included.
///
/// Uses `min + (max - min) * i / (n - 1)`; the final element is pinned to
/// `max` so curves always reach the domain boundary exactly.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let last = n - 1;
            (0..n)
                .map(|i| {
                    if i == last {
                        max
                    } else {
                        min + (max - min) * i as f64 / last as f64
                    }
                })
                .collect()
        }
    }
}

/// Clamp a resolved count to `cap`, reporting whether it was reduced
pub fn cap_samples(n: usize, cap: usize) -> (usize, bool) {
    let cap = cap.max(MIN_SAMPLES);
    if n > cap {
        (cap, true)
    } else {
        (n, false)
    }
}
