//! Document splitter
//!
//! Splits a chat message into prose and fenced blocks, in document order. A
//! start marker whose end marker has not arrived yet (the message is still
//! streaming) becomes [`Segment::Pending`] and swallows the rest of the text.

use super::{parse_payload, BlockKind, TokenizeResult};
use crate::plot::GraphSpec;
use crate::{GraphSpecError, Result};
use regex::Regex;
use serde_json::Value;

/// One piece of a split document
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    /// Prose between blocks
    Text(&'a str),
    Graph(TokenizeResult<GraphSpec>),
    Scene(TokenizeResult<Value>),
    /// An unterminated block; its content is not shown yet
    Pending(BlockKind),
}

/// A complete block located in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block<'a> {
    /// Span including markers
    pub raw: &'a str,
    /// Text between the markers
    pub body: &'a str,
}

/// `<start>(.*?)<end>` for one block kind, non-greedy across lines
fn block_pattern(kind: BlockKind) -> Result<Regex> {
    Regex::new(&format!(
        r"(?s){}(.*?){}",
        regex::escape(kind.start_marker()),
        regex::escape(kind.end_marker())
    ))
    .map_err(|e| GraphSpecError::InternalError(format!("Regex error: {}", e)))
}

/// Either block kind; capture 1 is a graph body, capture 2 a scene body
fn any_block_pattern() -> Result<Regex> {
    let graph = block_pattern(BlockKind::Graph)?;
    let scene = block_pattern(BlockKind::Scene)?;
    Regex::new(&format!(
        "{}|{}",
        graph.as_str(),
        scene.as_str().trim_start_matches("(?s)")
    ))
    .map_err(|e| GraphSpecError::InternalError(format!("Regex error: {}", e)))
}

/// First complete block of `kind`
pub(crate) fn first_block(src: &str, kind: BlockKind) -> Result<Option<Block<'_>>> {
    let pattern = block_pattern(kind)?;
    Ok(pattern.captures(src).and_then(|caps| {
        let raw = caps.get(0)?;
        let body = caps.get(1)?;
        Some(Block {
            raw: raw.as_str(),
            body: body.as_str(),
        })
    }))
}

/// Split `src` into prose and parsed blocks, in order.
///
/// Empty prose between adjacent blocks is dropped.
pub fn split_document(src: &str) -> Result<Vec<Segment<'_>>> {
    let pattern = any_block_pattern()?;
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in pattern.captures_iter(src) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        push_text(&mut segments, &src[cursor..whole.start()]);
        if let Some(body) = caps.get(1) {
            segments.push(Segment::Graph(parse_payload(whole.as_str(), body.as_str())));
        } else if let Some(body) = caps.get(2) {
            segments.push(Segment::Scene(parse_payload(whole.as_str(), body.as_str())));
        }
        cursor = whole.end();
    }

    let tail = &src[cursor..];
    match open_block(tail) {
        Some((at, kind)) => {
            push_text(&mut segments, &tail[..at]);
            segments.push(Segment::Pending(kind));
        }
        None => push_text(&mut segments, tail),
    }

    tracing::debug!(segments = segments.len(), "split document");
    Ok(segments)
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text));
    }
}

/// Earliest start marker left in `text`, if any
fn open_block(text: &str) -> Option<(usize, BlockKind)> {
    BlockKind::ALL
        .iter()
        .filter_map(|kind| text.find(kind.start_marker()).map(|at| (at, *kind)))
        .min_by_key(|(at, _)| *at)
}
