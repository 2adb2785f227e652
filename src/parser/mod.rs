/*!
Spec tokenizer

Finds fenced `<graph_spec>` / `<scene_spec>` blocks inside a chat or markdown
document and parses their near-JSON payload into typed values.

## Architecture

1. **Block discovery**: [`find_block_start`] answers whether a document
   contains a block at all; the document renderer uses it to decide whether
   to hand a fragment to this crate.

2. **Constant substitution**: the payload may contain bare `PI`/`E` and short
   products such as `2*PI`, which [`constants::substitute_constants`] turns
   into decimal literals. String literals are left untouched.

3. **JSON parse**: `serde_json` deserializes the rewritten payload. Any
   failure is returned as [`TokenizeResult::Error`] together with the raw
   block, so the caller can show the block instead of a chart.

## Example Usage

```rust
use graphspec::parser::{tokenize, TokenizeResult};
use graphspec::GraphType;

let doc = r#"Here you go:
<graph_spec>{"type": "function_2d", "expression": "sin(x)", "domain": [-PI, PI]}</graph_spec>"#;

match tokenize(doc) {
    Some(TokenizeResult::Success { spec, .. }) => {
        assert_eq!(spec.graph_type, Some(GraphType::Function2D));
    }
    other => panic!("unexpected: {:?}", other),
}
```
*/

use crate::naming;
use crate::plot::GraphSpec;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod constants;
pub mod splitter;

pub use constants::substitute_constants;
pub use splitter::{split_document, Segment};

/// Kind of fenced block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    /// `<graph_spec>`: a chart specification
    Graph,
    /// `<scene_spec>`: a free-form 3D scene description
    Scene,
}

impl BlockKind {
    pub const ALL: [BlockKind; 2] = [BlockKind::Graph, BlockKind::Scene];

    pub fn start_marker(&self) -> &'static str {
        match self {
            BlockKind::Graph => naming::GRAPH_SPEC_START,
            BlockKind::Scene => naming::SCENE_SPEC_START,
        }
    }

    pub fn end_marker(&self) -> &'static str {
        match self {
            BlockKind::Graph => naming::GRAPH_SPEC_END,
            BlockKind::Scene => naming::SCENE_SPEC_END,
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockKind::Graph => write!(f, "graph_spec"),
            BlockKind::Scene => write!(f, "scene_spec"),
        }
    }
}

/// Outcome of tokenizing one block
///
/// `raw` is always the complete matched span, markers included.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TokenizeResult<T> {
    Success { raw: String, spec: T },
    Error { raw: String, error: String },
}

impl<T> TokenizeResult<T> {
    /// The matched span including markers
    pub fn raw(&self) -> &str {
        match self {
            TokenizeResult::Success { raw, .. } | TokenizeResult::Error { raw, .. } => raw,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TokenizeResult::Success { .. })
    }

    /// The parsed value, discarding the raw span
    pub fn spec(self) -> Option<T> {
        match self {
            TokenizeResult::Success { spec, .. } => Some(spec),
            TokenizeResult::Error { .. } => None,
        }
    }
}

/// Byte offset of the first start marker of `kind`, or `None` when absent
pub fn find_block_start(src: &str, kind: BlockKind) -> Option<usize> {
    src.find(kind.start_marker())
}

/// Tokenize the first complete `<graph_spec>` block.
///
/// Returns `None` when the document holds no complete block.
pub fn tokenize(src: &str) -> Option<TokenizeResult<GraphSpec>> {
    tokenize_block(src, BlockKind::Graph)
}

/// Tokenize the first complete block of `kind` into any deserializable type
pub fn tokenize_block<T: DeserializeOwned>(src: &str, kind: BlockKind) -> Option<TokenizeResult<T>> {
    find_block_start(src, kind)?;
    match splitter::first_block(src, kind) {
        Ok(Some(block)) => Some(parse_payload(block.raw, block.body)),
        Ok(None) => None,
        Err(e) => {
            tracing::error!(kind = %kind, "block scan failed: {}", e);
            Some(TokenizeResult::Error {
                raw: String::new(),
                error: e.to_string(),
            })
        }
    }
}

/// Substitute constants in `body` and deserialize it
pub(crate) fn parse_payload<T: DeserializeOwned>(raw: &str, body: &str) -> TokenizeResult<T> {
    let json = substitute_constants(body);
    match serde_json::from_str(json.trim()) {
        Ok(spec) => TokenizeResult::Success {
            raw: raw.to_string(),
            spec,
        },
        Err(e) => {
            tracing::debug!("payload rejected: {}", e);
            TokenizeResult::Error {
                raw: raw.to_string(),
                error: e.to_string(),
            }
        }
    }
}
