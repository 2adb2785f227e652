//! Centralized naming conventions for graphspec markers and generated labels.
//!
//! All literal strings that cross the boundary to the surrounding document
//! (block markers) or to the charting library (trace type names, templates)
//! live here so the parser, builders and writer agree on them.
//!
//! # Categories
//!
//! - **Block markers**: `<graph_spec>` / `<scene_spec>` delimiters
//! - **Constants**: symbolic names substituted before JSON parsing
//! - **Legend labels**: expression-derived trace names (`y = x^2`)

// ============================================================================
// Block Markers
// ============================================================================

/// Start marker for a graph specification block
pub const GRAPH_SPEC_START: &str = "<graph_spec>";

/// End marker for a graph specification block
pub const GRAPH_SPEC_END: &str = "</graph_spec>";

/// Start marker for a 3D scene specification block
pub const SCENE_SPEC_START: &str = "<scene_spec>";

/// End marker for a 3D scene specification block
pub const SCENE_SPEC_END: &str = "</scene_spec>";

// ============================================================================
// Symbolic Constants
// ============================================================================

/// Constant names recognised by the pre-parse substitution, with their values
pub const SYMBOLIC_CONSTANTS: &[(&str, f64)] =
    &[("PI", std::f64::consts::PI), ("E", std::f64::consts::E)];

/// Look up a symbolic constant by its exact (case-sensitive) name.
///
/// ```
/// use graphspec::naming;
/// assert_eq!(naming::constant_value("PI"), Some(std::f64::consts::PI));
/// assert_eq!(naming::constant_value("pi"), None);
/// ```
pub fn constant_value(name: &str) -> Option<f64> {
    SYMBOLIC_CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

// ============================================================================
// Legend Labels
// ============================================================================

/// Suffix appended to truncated legend labels
const ELLIPSIS: &str = "...";

/// Truncate `text` to at most `max_chars` characters, appending `...` when cut.
///
/// Counts characters rather than bytes so multi-byte math symbols are
/// never split.
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Legend label for an expression-driven trace: `"<lhs> = <expr>"`, truncated.
///
/// Sources that already carry an assignment (`y = sin(x)`) are used as written.
pub fn expression_label(lhs: &str, expression: &str, max_chars: usize) -> String {
    let expression = expression.trim();
    if expression.contains('=') {
        return truncate_label(expression, max_chars);
    }
    truncate_label(&format!("{} = {}", lhs, expression), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_lookup() {
        assert_eq!(constant_value("E"), Some(std::f64::consts::E));
        assert_eq!(constant_value("TAU"), None);
    }

    #[test]
    fn test_truncate_short_label_unchanged() {
        assert_eq!(truncate_label("  sin(x) ", 30), "sin(x)");
    }

    #[test]
    fn test_truncate_long_label() {
        let label = truncate_label("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(label, "abcdefg...");
        assert_eq!(label.chars().count(), 10);
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let label = truncate_label("θθθθθθθθθθθθ", 8);
        assert_eq!(label, "θθθθθ...");
    }

    #[test]
    fn test_expression_label() {
        assert_eq!(expression_label("y", "x^2", 30), "y = x^2");
        assert_eq!(expression_label("y", "f(x) = 2*x", 30), "f(x) = 2*x");
    }
}
