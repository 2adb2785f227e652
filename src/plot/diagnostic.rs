//! Build diagnostics
//!
//! Builders and the dispatcher report recoverable problems (compile errors,
//! arity mismatches, clamped grids) into a [`BuildContext`] instead of a global
//! log. Each report is also emitted as a `tracing` event so hosts that install
//! a subscriber see it without inspecting the returned values.

use crate::config::RenderConfig;
use serde::Serialize;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Output was produced but adjusted (e.g. grid clamped)
    Warning,
    /// A layer or spec produced no output
    Error,
}

/// A recoverable problem found while building traces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    /// Zero-based layer index inside a composite spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.layer {
            Some(idx) => write!(f, "Layer {}: {}", idx + 1, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Per-call state threaded through the dispatcher and builders
#[derive(Debug)]
pub struct BuildContext<'a> {
    config: &'a RenderConfig,
    layer: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> BuildContext<'a> {
    /// Fresh context with no diagnostics
    pub fn new(config: &'a RenderConfig) -> Self {
        Self {
            config,
            layer: None,
            diagnostics: Vec::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    /// Layer currently being built, if inside a composite
    pub fn layer(&self) -> Option<usize> {
        self.layer
    }

    /// Set or clear the current layer index
    pub fn set_layer(&mut self, layer: Option<usize>) {
        self.layer = layer;
    }

    /// Record a warning
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(layer = ?self.layer, "{}", message);
        self.push(Level::Warning, message);
    }

    /// Record an error
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(layer = ?self.layer, "{}", message);
        self.push(Level::Error, message);
    }

    fn push(&mut self, level: Level, message: String) {
        self.diagnostics.push(Diagnostic {
            level,
            layer: self.layer,
            message,
        });
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, returning its diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Clamp a sample count to `cap`, warning when it is reduced
    pub fn cap_samples(&mut self, what: &str, n: usize, cap: usize) -> usize {
        let (capped, reduced) = crate::plot::resolve::cap_samples(n, cap);
        if reduced {
            self.warn(format!(
                "{} sampling reduced from {} to {} points",
                what, n, capped
            ));
        }
        capped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_carry_layer() {
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        ctx.warn("top level");
        ctx.set_layer(Some(1));
        ctx.error("bad layer");
        let diags = ctx.into_diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].layer, None);
        assert_eq!(diags[1].layer, Some(1));
        assert_eq!(diags[1].level, Level::Error);
        assert_eq!(diags[1].to_string(), "Layer 2: bad layer");
    }

    #[test]
    fn test_cap_samples_warns_once_reduced() {
        let config = RenderConfig::default();
        let mut ctx = BuildContext::new(&config);
        assert_eq!(ctx.cap_samples("curve", 10, 100), 10);
        assert!(ctx.diagnostics().is_empty());
        assert_eq!(ctx.cap_samples("curve", 1000, 100), 100);
        assert_eq!(ctx.diagnostics().len(), 1);
        assert!(ctx.diagnostics()[0].message.contains("1000"));
    }
}
