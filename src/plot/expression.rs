//! Expression compilation and evaluation
//!
//! Thin wrapper over the `meval` expression compiler. An expression is parsed
//! and checked once against the variables a builder will bind, then evaluated
//! many times over a sampling grid. Name errors (unknown variable, unknown
//! function, wrong arity) surface at compile time; math domain errors during
//! evaluation produce `NaN` rather than failing the batch.

use crate::{GraphSpecError, Result};
use meval::{Context, Expr};
use std::str::FromStr;

/// Value every variable is bound to while probing a freshly parsed expression
const PROBE_VALUE: f64 = 0.5;

/// A parsed expression bound to an ordered list of variable names
pub struct CompiledExpr {
    source: String,
    expr: Expr,
    variables: Vec<&'static str>,
    context: Context<'static>,
}

impl std::fmt::Debug for CompiledExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledExpr")
            .field("source", &self.source)
            .field("variables", &self.variables)
            .finish()
    }
}

impl CompiledExpr {
    /// Compile `source` for evaluation with the given variables.
    ///
    /// Accepts an optional assignment prefix (`y = ...`, `f(x) = ...`) and
    /// `**` as a power operator.
    pub fn compile(source: &str, variables: &[&'static str]) -> Result<Self> {
        let body = expression_body(source);
        if body.is_empty() {
            return Err(expression_error(source, "expression is empty"));
        }

        let expr = Expr::from_str(&body).map_err(|e| expression_error(source, &e.to_string()))?;

        let mut context = base_context();
        for name in variables {
            context.var(*name, PROBE_VALUE);
        }
        expr.eval_with_context(&context)
            .map_err(|e| expression_error(source, &e.to_string()))?;

        Ok(Self {
            source: source.to_string(),
            expr,
            variables: variables.to_vec(),
            context,
        })
    }

    /// Compile each source, failing on the first error
    pub fn compile_all(sources: &[String], variables: &[&'static str]) -> Result<Vec<Self>> {
        sources
            .iter()
            .map(|s| Self::compile(s, variables))
            .collect()
    }

    /// The source text as written in the spec
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate with `values` bound positionally to the compiled variables.
    ///
    /// Returns `NaN` when evaluation fails.
    pub fn evaluate(&mut self, values: &[f64]) -> f64 {
        for (name, value) in self.variables.iter().zip(values) {
            self.context.var(*name, *value);
        }
        self.expr
            .eval_with_context(&self.context)
            .unwrap_or(f64::NAN)
    }
}

/// Evaluate a closed constant expression such as `2*PI` or `pi/4`.
///
/// Returns `None` when the text does not parse or the result is not finite.
pub fn eval_constant(source: &str) -> Option<f64> {
    let mut compiled = CompiledExpr::compile(source, &[]).ok()?;
    let value = compiled.evaluate(&[]);
    value.is_finite().then_some(value)
}

/// Builtins plus the names the upstream producer commonly emits
fn base_context() -> Context<'static> {
    let mut ctx = Context::new();
    ctx.var("PI", std::f64::consts::PI)
        .var("E", std::f64::consts::E)
        .func("log", f64::ln)
        .func("log10", f64::log10)
        .func("log2", f64::log2)
        .func("cbrt", f64::cbrt)
        .func("sign", f64::signum)
        .func("sec", |x: f64| 1.0 / x.cos())
        .func("csc", |x: f64| 1.0 / x.sin())
        .func("cot", |x: f64| 1.0 / x.tan())
        .func2("pow", f64::powf);
    ctx
}

/// Strip an assignment prefix and normalize operator spellings
fn expression_body(source: &str) -> String {
    let trimmed = source.trim();
    let body = match assignment_split(trimmed) {
        Some(rhs) => rhs,
        None => trimmed,
    };
    body.replace("**", "^").trim().to_string()
}

/// Right-hand side of `lhs = rhs` when the text holds exactly one plain `=`
fn assignment_split(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut found = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        let prev = if i > 0 { bytes[i - 1] } else { b' ' };
        let next = bytes.get(i + 1).copied().unwrap_or(b' ');
        if matches!(prev, b'<' | b'>' | b'!' | b'=') || next == b'=' {
            return None;
        }
        if found.is_some() {
            return None;
        }
        found = Some(i);
    }
    found.map(|i| &text[i + 1..])
}

fn expression_error(source: &str, message: &str) -> GraphSpecError {
    GraphSpecError::ExpressionError {
        expression: source.to_string(),
        message: message.to_string(),
    }
}
