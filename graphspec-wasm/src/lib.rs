use graphspec::execute::{execute_all, execute_document};
use graphspec::parser::{self, BlockKind, Segment};
use graphspec::writer::{PlotlyWriter, Theme};
use graphspec::RenderConfig;
use serde_json::json;
use std::cell::Cell;

use wasm_bindgen::prelude::*;

/// Persistent graphspec context for WASM
///
/// Create once per page and reuse for every message render. The theme uses
/// interior mutability to avoid wasm_bindgen's &mut self aliasing issues.
#[wasm_bindgen]
pub struct GraphspecContext {
    config: RenderConfig,
    theme: Cell<Theme>,
}

#[wasm_bindgen]
impl GraphspecContext {
    /// Create a context, optionally from a JSON render config
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<GraphspecContext, JsValue> {
        let config = match config {
            Some(text) => RenderConfig::from_json(&text)
                .map_err(|e| JsValue::from_str(&format!("Config error: {}", e)))?,
            None => RenderConfig::default(),
        };
        Ok(GraphspecContext {
            config,
            theme: Cell::new(Theme::Light),
        })
    }

    /// Switch between `light` and `dark` figures
    pub fn set_theme(&self, theme: &str) -> Result<(), JsValue> {
        let theme = theme
            .parse::<Theme>()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.theme.set(theme);
        Ok(())
    }

    /// Whether the text contains a `<graph_spec>` start marker
    pub fn has_block(&self, text: &str) -> bool {
        parser::find_block_start(text, BlockKind::Graph).is_some()
    }

    /// Render the first block and return the outcome JSON (`null` when absent)
    pub fn render(&self, text: &str) -> Result<String, JsValue> {
        let outcome = execute_document(text, &self.config, &self.writer());
        serde_json::to_string(&outcome)
            .map_err(|e| JsValue::from_str(&format!("Render error: {}", e)))
    }

    /// Render every complete block and return a JSON array of outcomes
    pub fn render_all(&self, text: &str) -> Result<String, JsValue> {
        let outcomes = execute_all(text, &self.config, &self.writer())
            .map_err(|e| JsValue::from_str(&format!("Render error: {}", e)))?;
        serde_json::to_string(&outcomes)
            .map_err(|e| JsValue::from_str(&format!("Render error: {}", e)))
    }

    /// Split a message into prose and block segments, one JSON string each
    pub fn segments(&self, text: &str) -> Result<js_sys::Array, JsValue> {
        let segments = parser::split_document(text)
            .map_err(|e| JsValue::from_str(&format!("Split error: {}", e)))?;

        let array = js_sys::Array::new();
        for segment in segments {
            let value = match segment {
                Segment::Text(text) => json!({"kind": "text", "text": text}),
                Segment::Graph(result) => json!({"kind": "graph", "result": result}),
                Segment::Scene(result) => json!({"kind": "scene", "result": result}),
                Segment::Pending(kind) => json!({"kind": "pending", "block": kind}),
            };
            array.push(&JsValue::from_str(&value.to_string()));
        }
        Ok(array)
    }
}

impl GraphspecContext {
    fn writer(&self) -> PlotlyWriter {
        PlotlyWriter::new().with_theme(self.theme.get())
    }
}
