//! Symbolic constant substitution
//!
//! Producers write bare `PI` and `E` (and short products such as `2*PI`)
//! where JSON only allows numbers. Before the payload is handed to
//! `serde_json`, a small scanner rewrites the recognised forms into decimal
//! literals:
//!
//! ```text
//! constant_expr := sign? operand (op operand)?
//! operand       := NUMBER | CONST
//! op            := '*' | '/' | '+' | '-'
//! CONST         := 'PI' | 'E'
//! ```
//!
//! A binary form is only rewritten when exactly one operand is a constant; a
//! lone constant is always rewritten. The sign is only read where a JSON
//! value may start (after `[`, `,`, `:`, `{` or at the beginning). String
//! literals are copied verbatim, as is everything the grammar does not
//! cover, so compound expressions like `2*PI+1` remain invalid JSON and fail
//! the parse that follows.

use crate::naming::constant_value;

/// Replace recognised constant expressions outside string literals
pub fn substitute_constants(text: &str) -> String {
    Substituter::new(text).run()
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    /// A complete string literal including its quotes
    Str(&'a str),
    Number(&'a str),
    Ident(&'a str),
    Op(u8),
    Space(&'a str),
    /// Punctuation, or a run the grammar does not understand
    Other(&'a str),
}

impl<'a> Token<'a> {
    fn text(&self) -> &'a str {
        match *self {
            Token::Str(s)
            | Token::Number(s)
            | Token::Ident(s)
            | Token::Space(s)
            | Token::Other(s) => s,
            Token::Op(b'+') => "+",
            Token::Op(b'-') => "-",
            Token::Op(b'*') => "*",
            Token::Op(_) => "/",
        }
    }
}

fn lex(text: &str) -> Vec<Token<'_>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let end = match c {
            b'"' => {
                let end = string_end(bytes, i);
                tokens.push(Token::Str(&text[i..end]));
                end
            }
            b'0'..=b'9' => {
                let end = number_end(bytes, i);
                let word = word_end(bytes, end);
                if word > end {
                    // `2E`, `3PI`: not a number followed by a name
                    tokens.push(Token::Other(&text[i..word]));
                    word
                } else {
                    tokens.push(Token::Number(&text[i..end]));
                    end
                }
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let end = word_end(bytes, i);
                tokens.push(Token::Ident(&text[i..end]));
                end
            }
            b'+' | b'-' | b'*' | b'/' => {
                tokens.push(Token::Op(c));
                i + 1
            }
            c if c.is_ascii_whitespace() => {
                let mut end = i;
                while end < bytes.len() && bytes[end].is_ascii_whitespace() {
                    end += 1;
                }
                tokens.push(Token::Space(&text[i..end]));
                end
            }
            _ => {
                let len = text[i..].chars().next().map_or(1, char::len_utf8);
                tokens.push(Token::Other(&text[i..i + len]));
                i + len
            }
        };
        i = end;
    }
    tokens
}

/// Index just past the closing quote (or the end of input when unterminated)
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// `\d+(\.\d+)?([eE][+-]?\d+)?`
fn number_end(bytes: &[u8], start: usize) -> usize {
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut i = digits(start);
    if i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i = digits(i + 1);
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = digits(j);
        }
    }
    i
}

fn word_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    i
}

// =============================================================================
// Scanner
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Operand {
    Number(f64),
    Constant(f64),
}

struct Substituter<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> Substituter<'a> {
    fn new(text: &'a str) -> Self {
        Self { tokens: lex(text) }
    }

    fn run(self) -> String {
        let mut out = String::new();
        let mut pos = 0;
        while pos < self.tokens.len() {
            if let Some((value, next)) = self.constant_expr(pos) {
                out.push_str(&value.to_string());
                pos = next;
            } else {
                out.push_str(self.tokens[pos].text());
                pos += 1;
            }
        }
        out
    }

    /// Try to read `sign? operand (op operand)?` at `start`
    fn constant_expr(&self, start: usize) -> Option<(f64, usize)> {
        let (sign, first_at) = match self.tokens.get(start) {
            Some(Token::Op(b'-')) if self.in_value_position(start) => (-1.0, start + 1),
            Some(Token::Op(b'+')) if self.in_value_position(start) => (1.0, start + 1),
            _ => (1.0, start),
        };
        let (first, after_first) = self.operand(first_at)?;

        if let Some((value, end)) = self.binary_tail(sign, first, after_first) {
            return Some((value, end));
        }
        match first {
            Operand::Constant(c) => Some((sign * c, after_first)),
            Operand::Number(_) => None,
        }
    }

    /// `op operand` after the first operand, when exactly one side is a constant
    fn binary_tail(&self, sign: f64, first: Operand, at: usize) -> Option<(f64, usize)> {
        let op_at = self.skip_space(at);
        let op = match self.tokens.get(op_at) {
            Some(Token::Op(op)) => *op,
            _ => return None,
        };
        let (second, end) = self.operand(self.skip_space(op_at + 1))?;
        let (a, b) = match (first, second) {
            (Operand::Number(a), Operand::Constant(b)) | (Operand::Constant(a), Operand::Number(b)) => {
                (sign * a, b)
            }
            _ => return None,
        };
        let value = match op {
            b'*' => a * b,
            b'/' => a / b,
            b'+' => a + b,
            _ => a - b,
        };
        value.is_finite().then_some((value, end))
    }

    fn operand(&self, at: usize) -> Option<(Operand, usize)> {
        match self.tokens.get(at)? {
            Token::Number(text) => text.parse().ok().map(|n| (Operand::Number(n), at + 1)),
            Token::Ident(name) => constant_value(name).map(|c| (Operand::Constant(c), at + 1)),
            _ => None,
        }
    }

    fn skip_space(&self, mut at: usize) -> usize {
        while let Some(Token::Space(_)) = self.tokens.get(at) {
            at += 1;
        }
        at
    }

    /// Whether a JSON value may begin at `at`
    fn in_value_position(&self, at: usize) -> bool {
        let previous = self.tokens[..at]
            .iter()
            .rev()
            .find(|t| !matches!(t, Token::Space(_)));
        match previous {
            None => true,
            Some(Token::Other(p)) => matches!(*p, "[" | "," | ":" | "{"),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{E, PI};

    fn parsed(text: &str) -> serde_json::Value {
        serde_json::from_str(&substitute_constants(text)).unwrap()
    }

    fn close(value: &serde_json::Value, expected: f64) -> bool {
        (value.as_f64().unwrap() - expected).abs() < 1e-12
    }

    #[test]
    fn test_bare_constants() {
        let v = parsed("[PI, E]");
        assert!(close(&v[0], PI));
        assert!(close(&v[1], E));
    }

    #[test]
    fn test_number_op_constant() {
        let v = parsed("[2*PI, 3 * E, 1+PI, 4-PI, 1/E]");
        assert!(close(&v[0], 2.0 * PI));
        assert!(close(&v[1], 3.0 * E));
        assert!(close(&v[2], 1.0 + PI));
        assert!(close(&v[3], 4.0 - PI));
        assert!(close(&v[4], 1.0 / E));
    }

    #[test]
    fn test_constant_op_number() {
        let v = parsed("[PI/2, PI - 1, E*0.5, PI+2.5]");
        assert!(close(&v[0], PI / 2.0));
        assert!(close(&v[1], PI - 1.0));
        assert!(close(&v[2], E * 0.5));
        assert!(close(&v[3], PI + 2.5));
    }

    #[test]
    fn test_leading_sign_in_value_position() {
        let v = parsed(r#"{"domain": [-PI, PI], "a": -2*PI, "b": -PI/4}"#);
        assert!(close(&v["domain"][0], -PI));
        assert!(close(&v["domain"][1], PI));
        assert!(close(&v["a"], -2.0 * PI));
        assert!(close(&v["b"], -PI / 4.0));
    }

    #[test]
    fn test_strings_untouched() {
        let text = r#"{"expression": "sin(PI*x) + E", "note": "say \"2*PI\"", "v": PI}"#;
        let v = parsed(text);
        assert_eq!(v["expression"], "sin(PI*x) + E");
        assert_eq!(v["note"], "say \"2*PI\"");
        assert!(close(&v["v"], PI));
    }

    #[test]
    fn test_names_and_numbers_not_split() {
        for text in ["PIE", "E1", "2E", "3PI", "1e5", "1.5E-3", "true", "x_PI"] {
            assert_eq!(substitute_constants(text), text);
        }
    }

    #[test]
    fn test_plain_json_unchanged() {
        let text = r#"{"type": "function_2d", "domain": [-2, 2.5], "sampling": 5}"#;
        assert_eq!(substitute_constants(text), text);
    }

    #[test]
    fn test_compound_expression_stays_invalid() {
        let out = substitute_constants("[2*PI+1]");
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_err());
        let out = substitute_constants("[PI*PI]");
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_err());
    }

    #[test]
    fn test_division_by_zero_left_alone() {
        assert_eq!(substitute_constants("PI/0"), "PI/0");
    }

    #[test]
    fn test_non_ascii_outside_strings() {
        assert_eq!(substitute_constants("θ PI"), format!("θ {}", PI));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(substitute_constants(r#"{"a": "PI"#), r#"{"a": "PI"#);
    }
}
