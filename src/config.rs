//! Render configuration.
//!
//! Limits that keep evaluation cheap enough to run synchronously on a UI
//! thread, plus the validator threshold. Deserializable so the CLI and the
//! WASM binding can accept a partial JSON object; missing fields keep their
//! defaults.

use serde::{Deserialize, Serialize};

/// Tunables for trace building and validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound on samples for one-parameter curves
    pub max_samples: usize,
    /// Upper bound on samples per axis for surfaces
    pub max_grid_samples: usize,
    /// Upper bound on grid points per axis for 2D vector fields
    pub max_field_samples: usize,
    /// Upper bound on grid points per axis for 3D vector fields
    pub max_field_samples_3d: usize,
    /// Fraction of non-finite coordinates above which traces are rejected
    pub invalid_threshold: f64,
    /// Maximum legend label length in characters
    pub label_max_chars: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_samples: 2000,
            max_grid_samples: 200,
            max_field_samples: 40,
            max_field_samples_3d: 12,
            invalid_threshold: 0.8,
            label_max_chars: 30,
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON text; absent fields use defaults.
    pub fn from_json(text: &str) -> crate::Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| crate::GraphSpecError::ParseError(format!("Invalid render config: {}", e)))
    }
}
