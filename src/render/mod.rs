//! Result payload rendering
//!
//! Turns one task result payload (and nested sub-fields) into display text.
//! Pure transformation: no clock, no I/O, no hidden state.

use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;

pub mod redact;

/// Fields whose raw values are re-rendered in place when formatting a
/// sequence of sub-results (iteration constructs nest full results here).
pub const VERBOSE_FIELDS: [&str; 9] = [
    "cmd", "command", "start", "end", "delta", "msg", "stdout", "stderr", "results",
];

/// Joined scalar sequences longer than this render as a multi-line block.
pub const WRAP_THRESHOLD: usize = 75;

/// Payload shapes the formatter cannot classify
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("cannot render an empty sequence")]
    EmptySequence,
    #[error("sequence element {index} is not a scalar")]
    MixedSequence { index: usize },
}

/// Render a payload as display text.
///
/// Mappings serialize as indented, key-sorted structured text; a non-empty
/// whitelist restricts a top-level mapping to the listed keys (nested
/// mappings are never filtered). Sequences are classified by their first
/// element: sub-result mappings get their verbose fields re-rendered in
/// place, scalar lists flatten on embedded newlines and switch to a
/// multi-line block once the joined length exceeds [`WRAP_THRESHOLD`].
pub fn render(value: &Value, whitelist: &BTreeSet<String>) -> Result<String, RenderError> {
    if let Value::Object(map) = value
        && !whitelist.is_empty()
    {
        let filtered: serde_json::Map<String, Value> = map
            .iter()
            .filter(|(key, _)| whitelist.contains(key.as_str()))
            .map(|(key, val)| (key.clone(), val.clone()))
            .collect();
        return Ok(pretty(&Value::Object(filtered)));
    }
    render_value(value)
}

fn render_value(value: &Value) -> Result<String, RenderError> {
    match value {
        Value::Object(_) => Ok(pretty(value)),
        Value::Array(items) => render_sequence(items),
        scalar => Ok(scalar_text(scalar)),
    }
}

/// The first element decides how the whole sequence is treated; callers feed
/// homogeneous lists in practice.
fn render_sequence(items: &[Value]) -> Result<String, RenderError> {
    let first = items.first().ok_or(RenderError::EmptySequence)?;

    if first.is_object() {
        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::Object(map) => {
                    let mut copy = map.clone();
                    for field in VERBOSE_FIELDS {
                        if let Some(raw) = map.get(field) {
                            copy.insert(field.to_string(), Value::String(render_value(raw)?));
                        }
                    }
                    rendered.push(Value::Object(copy));
                }
                other => rendered.push(other.clone()),
            }
        }
        return Ok(pretty(&Value::Array(rendered)));
    }

    // Scalar list: flatten embedded line breaks before the length decision.
    let mut lines = Vec::new();
    for (index, item) in items.iter().enumerate() {
        if item.is_object() || item.is_array() {
            return Err(RenderError::MixedSequence { index });
        }
        for line in scalar_text(item).split('\n') {
            lines.push(line.to_string());
        }
    }

    let joined_len: usize = lines.iter().map(String::len).sum();
    if joined_len > WRAP_THRESHOLD {
        Ok(format!("\n{}", lines.join("\n")))
    } else {
        Ok(lines.join(" "))
    }
}

/// Canonical text for a scalar: strings unquoted, everything else in its
/// JSON form.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
