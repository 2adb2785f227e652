//! Style name tables: line dash and marker symbol mapping.
//!
//! Producers write loose names (`"dashed"`, `"dotted"`, `"triangle"`, `"o"`);
//! the charting library accepts a fixed vocabulary. Unknown names map to
//! `None` so the trace omits the attribute and the library default applies.

/// Get the library dash name for a line style.
///
/// Supports:
/// - `solid`
/// - `dash` / `dashed`
/// - `dot` / `dotted`
/// - `dashdot` / `dash-dot` / `dotdash`
/// - `longdash` / `long-dash`
/// - `longdashdot` / `long-dash-dot`
pub fn line_dash(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().replace(['_', ' '], "-").as_str() {
        "solid" => Some("solid"),
        "dash" | "dashed" => Some("dash"),
        "dot" | "dotted" => Some("dot"),
        "dashdot" | "dash-dot" | "dotdash" | "dot-dash" => Some("dashdot"),
        "longdash" | "long-dash" => Some("longdash"),
        "longdashdot" | "long-dash-dot" => Some("longdashdot"),
        _ => None,
    }
}

/// Get the library marker symbol for a 2D marker name.
///
/// Accepts matplotlib-style single characters (`o`, `s`, `^`, `v`, `d`,
/// `+`, `x`, `*`) as well as spelled-out names.
pub fn marker_symbol(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "circle" | "o" | "dot" | "." => Some("circle"),
        "circle-open" | "ring" => Some("circle-open"),
        "square" | "s" => Some("square"),
        "diamond" | "d" => Some("diamond"),
        "triangle" | "triangle-up" | "^" => Some("triangle-up"),
        "triangle-down" | "v" => Some("triangle-down"),
        "triangle-left" | "<" => Some("triangle-left"),
        "triangle-right" | ">" => Some("triangle-right"),
        "cross" | "plus" | "+" => Some("cross"),
        "x" => Some("x"),
        "star" | "*" => Some("star"),
        "hexagon" | "h" => Some("hexagon"),
        "pentagon" | "p" => Some("pentagon"),
        _ => None,
    }
}

/// Get the marker symbol for 3D scatter traces.
///
/// 3D scenes support a smaller symbol set; 2D-only shapes map to the
/// closest available one.
pub fn marker_symbol_3d(name: &str) -> Option<&'static str> {
    match marker_symbol(name)? {
        "circle" | "hexagon" | "pentagon" => Some("circle"),
        "circle-open" => Some("circle-open"),
        "square" => Some("square"),
        "diamond" | "triangle-up" | "triangle-down" | "triangle-left" | "triangle-right"
        | "star" => Some("diamond"),
        "cross" => Some("cross"),
        "x" => Some("x"),
        _ => None,
    }
}

/// Default colorscale for surfaces and cone traces
pub const DEFAULT_COLORSCALE: &str = "Viridis";

/// Normalize a colormap name to the library's capitalized colorscale name.
///
/// Names the library does not know pass through unchanged.
pub fn colorscale(name: &str) -> String {
    const KNOWN: &[&str] = &[
        "Viridis", "Plasma", "Inferno", "Magma", "Cividis", "Jet", "Hot", "Blues", "Reds",
        "Greens", "Greys", "YlOrRd", "YlGnBu", "RdBu", "Portland", "Picnic", "Rainbow",
        "Electric", "Earth", "Bluered", "Blackbody",
    ];
    let trimmed = name.trim();
    KNOWN
        .iter()
        .find(|k| k.eq_ignore_ascii_case(trimmed))
        .map(|k| k.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}
