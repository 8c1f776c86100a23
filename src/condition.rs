//! Condition Compiler (C2): lifts a decision-table cell string, plus the
//! target field it gates, into an expression string that [`crate::expr`]
//! can parse. Ported line-for-line from
//! `original_source/python/jdm_parser.py::parse_condition`; see the table
//! in spec.md §4.2 for the shape-to-expression mapping this implements.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RANGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[(.+)\.\.(.+)\]$").unwrap());
static ENDSWITH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^endsWith\(\$,\s*(.+)\)$").unwrap());
static STARTSWITH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^startsWith\(\$,\s*(.+)\)$").unwrap());
static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^['"].*['"]$"#).unwrap());

/// Translates a raw rule cell into an expression string for `field`, or
/// `None` for a wildcard cell (empty/absent — matches any input).
pub fn compile_condition(raw: Option<&Value>, field: &str) -> Option<String> {
    match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => compile_string_cell(s, field),
        Some(other) => Some(format!("{field} {}", json_scalar(other))),
    }
}

fn compile_string_cell(raw: &str, field: &str) -> Option<String> {
    let trimmed = raw.trim().replace('_', "");
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = RANGE_RE.captures(&trimmed) {
        let lo = caps[1].trim();
        let hi = caps[2].trim();
        return Some(format!("{field} >= {lo} and {field} <= {hi}"));
    }

    if let Some(items) = parse_array_literal(&trimmed) {
        return Some(format!("{field} in {items}"));
    }

    if let Some(caps) = ENDSWITH_RE.captures(&trimmed) {
        let arg = normalize_quotes(caps[1].trim());
        return Some(format!("{field}.endswith({arg})"));
    }

    if let Some(caps) = STARTSWITH_RE.captures(&trimmed) {
        let arg = normalize_quotes(caps[1].trim());
        return Some(format!("{field}.startswith({arg})"));
    }

    if QUOTED_RE.is_match(&trimmed) {
        return Some(format!("{field} == {trimmed}"));
    }

    if trimmed.contains('$') {
        return Some(trimmed.replace('$', field));
    }

    Some(format!("{field} {trimmed}"))
}

/// Attempts a JSON-array-of-scalars parse of `trimmed` after normalizing
/// single quotes to double quotes, mirroring the source's
/// `json.loads("[" + trimmed.replace("'", '"') + "]")` attempt. Returns the
/// array rendered as our own list-literal syntax (`[a, b, c]`) on success.
fn parse_array_literal(trimmed: &str) -> Option<String> {
    let normalized = normalize_quotes(trimmed);
    let wrapped = format!("[{normalized}]");
    let parsed: Value = serde_json::from_str(&wrapped).ok()?;
    let items = parsed.as_array()?;
    if items.is_empty() {
        return None;
    }
    if !items.iter().all(|v| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_))) {
        return None;
    }
    let rendered: Vec<String> = items.iter().map(json_scalar).collect();
    Some(format!("[{}]", rendered.join(", ")))
}

fn json_scalar(v: &Value) -> String {
    match v {
        Value::String(s) => format!("{s:?}"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn normalize_quotes(s: &str) -> String {
    s.replace('\'', "\"")
}
