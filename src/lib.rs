/*!
# graphspec - chart specifications embedded in chat text

Turns `<graph_spec>` blocks written by a language model into traces for a
2D/3D charting library (the Plotly trace schema).

## Example

```text
Here is the curve you asked for:
<graph_spec>
{
  "type": "parametric_2d",
  "expressions": ["cos(t)", "sin(t)"],
  "domain": {"t": [0, 2*PI]},
  "style": {"color": "#d62728", "lineStyle": "dashed"}
}
</graph_spec>
```

## Architecture

A block flows through a fixed chain:
- **Tokenizer** → finds the block, substitutes `PI`/`E`, parses the JSON
- **Normalizers** → coerce domain and sampling shapes into ranges and counts
- **Dispatcher** → picks a trace builder per spec or per composite layer
- **Builders** → evaluate expressions over a grid and emit traces
- **Validator** → rejects output that is mostly `NaN`
- **Writer** → wraps traces into a Plotly figure

## Core Components

- [`parser`] - Block extraction, constant substitution, JSON parsing
- [`plot`] - Spec types, normalizers, builders and the dispatcher
- [`validate`] - Non-finite output check
- [`writer`] - Output format abstraction layer
- [`execute`] - The whole chain as one call
*/

pub mod config;
pub mod naming;
pub mod parser;
pub mod plot;
pub mod execute;
pub mod validate;
pub mod writer;

// Re-export key types for convenience
pub use config::RenderConfig;
pub use parser::{tokenize, TokenizeResult};
pub use plot::{build_traces, BuildOutput, GraphSpec, GraphType, Trace};
pub use execute::{execute_document, RenderOutcome};
pub use validate::{validate_traces, Validation};

/// Main library error type
#[derive(thiserror::Error, Debug)]
pub enum GraphSpecError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Expression error in '{expression}': {message}")]
    ExpressionError { expression: String, message: String },

    #[error("Arity error: {0}")]
    ArityError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unsupported graph type: {0}")]
    UnsupportedType(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Output generation error: {0}")]
    WriterError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type Result<T> = std::result::Result<T, GraphSpecError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::plot::{TraceKind, Values};

    fn parse(doc: &str) -> GraphSpec {
        match tokenize(doc) {
            Some(TokenizeResult::Success { spec, .. }) => spec,
            other => panic!("expected a parsed spec, got {:?}", other),
        }
    }

    fn series(values: &Option<Values>) -> &[f64] {
        values.as_ref().and_then(Values::as_series).unwrap()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn test_end_to_end_function_curve() {
        let spec = parse(
            r#"<graph_spec>{"type":"function_2d","expression":"x^2","domain":[-2,2],"sampling":5}</graph_spec>"#,
        );
        let output = build_traces(&spec, &RenderConfig::default());
        assert_eq!(output.traces.len(), 1);
        assert_close(series(&output.traces[0].x), &[-2.0, -1.0, 0.0, 1.0, 2.0]);
        assert_close(series(&output.traces[0].y), &[4.0, 1.0, 0.0, 1.0, 4.0]);
        assert!(validate_traces(&output.traces).valid);
    }

    #[test]
    fn test_end_to_end_parametric_loop() {
        let spec = parse(
            r#"<graph_spec>{"type":"parametric_2d","expressions":["cos(t)","sin(t)"],"domain":{"t":[0,"2*PI"]},"sampling":{"t":4}}</graph_spec>"#,
        );
        let output = build_traces(&spec, &RenderConfig::default());
        assert_eq!(output.traces.len(), 1);
        let x = series(&output.traces[0].x);
        let y = series(&output.traces[0].y);
        assert_eq!(x.len(), 4);
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!(y[0].abs() < 1e-12);
        assert!((x[3] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_to_end_parse_error_keeps_raw() {
        let doc = r#"Sure! <graph_spec>{"type":"function_2d","expression":"x",}</graph_spec>"#;
        match tokenize(doc) {
            Some(TokenizeResult::Error { raw, error }) => {
                assert_eq!(raw, r#"<graph_spec>{"type":"function_2d","expression":"x",}</graph_spec>"#);
                assert!(!error.is_empty());
            }
            other => panic!("expected an error result, got {:?}", other),
        }
    }

    #[test]
    fn test_end_to_end_composite_legend() {
        let three = parse(
            r#"<graph_spec>{"type":"composite_2d","domain":[-PI,PI],"sampling":20,"layers":[
                {"type":"function_2d","expression":"sin(x)"},
                {"type":"function_2d","expression":"cos(x)"},
                {"type":"scatter_2d","data":[[0,0],[1,1]]}
            ]}</graph_spec>"#,
        );
        let output = build_traces(&three, &RenderConfig::default());
        assert_eq!(output.traces.len(), 3);
        assert!(output.traces.iter().all(|t| t.showlegend == Some(true)));

        let one = parse(
            r#"<graph_spec>{"type":"composite_2d","layers":[{"type":"function_2d","expression":"x"}]}</graph_spec>"#,
        );
        let output = build_traces(&one, &RenderConfig::default());
        assert!(!output.traces.is_empty());
        assert!(output.traces.iter().all(|t| t.showlegend == Some(false)));
    }

    #[test]
    fn test_build_is_idempotent() {
        let spec = parse(
            r#"<graph_spec>{"type":"vector_2d","field":["-y","x"],"sampling":7}</graph_spec>"#,
        );
        let config = RenderConfig::default();
        // arrow paths are NaN-separated, so compare the serialized form
        let first = serde_json::to_string(&build_traces(&spec, &config).traces).unwrap();
        let second = serde_json::to_string(&build_traces(&spec, &config).traces).unwrap();
        assert_eq!(first, second);
        assert!(first.contains("null"));
    }

    #[test]
    fn test_reparse_after_serialize_builds_same_traces() {
        let spec = parse(
            r#"<graph_spec>{"type":"function_3d","expression":"x*y","domain":[-1,1],"sampling":4}</graph_spec>"#,
        );
        let text = serde_json::to_string(&spec).unwrap();
        let again: GraphSpec = serde_json::from_str(&text).unwrap();
        let config = RenderConfig::default();
        let a = build_traces(&spec, &config);
        let b = build_traces(&again, &config);
        assert_eq!(a, b);
        assert_eq!(a.traces[0].kind, TraceKind::Surface);
    }

    #[test]
    fn test_validator_properties() {
        let zeros = Trace::scatter(vec![0.0; 20], vec![0.0; 20], plot::TraceMode::Lines);
        assert!(validate_traces(&[zeros]).valid);

        // 82 of 100 values are NaN
        let mut x = vec![f64::NAN; 50];
        x[..18].fill(0.0);
        let mostly_nan = Trace::scatter(x, vec![f64::NAN; 50], plot::TraceMode::Lines);
        let result = validate_traces(&[mostly_nan]);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains('%'));

        let empty = validate_traces(&[]);
        assert!(!empty.valid);
        assert!(empty.error.is_some());
    }

    #[test]
    fn test_loosely_typed_fields_do_not_fail_the_block() {
        let bar = parse(
            r#"<graph_spec>{"type":"bar_2d","data":[3,5],"labels":[2019,2020]}</graph_spec>"#,
        );
        let output = build_traces(&bar, &RenderConfig::default());
        assert_eq!(
            output.traces[0].x,
            Some(Values::Labels(vec!["2019".to_string(), "2020".to_string()]))
        );

        let histogram = parse(
            r#"<graph_spec>{"type":"histogram_2d","data":[1,2,3],"bins":10.0}</graph_spec>"#,
        );
        let output = build_traces(&histogram, &RenderConfig::default());
        assert_eq!(output.traces[0].nbinsx, Some(10));
        assert!(output.diagnostics.is_empty());

        let curve = parse(
            r#"<graph_spec>{"expression":"x","sampling":3,"style":{"lineWidth":"2"}}</graph_spec>"#,
        );
        let output = build_traces(&curve, &RenderConfig::default());
        assert_eq!(output.traces[0].line.as_ref().unwrap().width, Some(2.0));
    }

    #[test]
    fn test_unknown_type_renders_nothing() {
        let spec = parse(r#"<graph_spec>{"type":"sankey","data":[1,2]}</graph_spec>"#);
        assert_eq!(spec.graph_type, Some(GraphType::Unsupported("sankey".to_string())));
        let output = build_traces(&spec, &RenderConfig::default());
        assert!(output.traces.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
    }

    #[cfg(feature = "plotly")]
    #[test]
    fn test_execute_document_chart() {
        let doc = r#"<graph_spec>{"type":"pie_2d","data":[["a",1],["b",3]],"title":"Share"}</graph_spec>"#;
        let outcome = execute_document(doc, &RenderConfig::default(), &writer::PlotlyWriter::new()).unwrap();
        match outcome {
            RenderOutcome::Chart { figure, .. } => {
                assert_eq!(figure["data"][0]["type"], "pie");
                assert_eq!(figure["layout"]["title"]["text"], "Share");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
