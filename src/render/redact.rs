//! Suppression and redaction of result payloads
//!
//! Decides whether a result is logged at all, and strips or rewrites the
//! parts that must not reach the log file before rendering.

use serde_json::Value;
use std::collections::BTreeSet;

use super::{RenderError, render};

/// Marker flag instructing the writer to suppress the result entirely.
pub const NO_LOG_KEY: &str = "_no_log";
/// Marker flag instructing the writer to redact the body instead.
pub const VERBOSE_OVERRIDE_KEY: &str = "_verbose_override";
/// Sub-mapping describing the arguments the task was invoked with.
pub const INVOCATION_KEY: &str = "invocation";

/// Replacement body for redacted results.
pub const REDACTED_PLACEHOLDER: &str = "omitted";

/// True when the payload carries a no-log marker set true and the
/// configuration says to honor it. Suppressed results produce no line.
pub fn is_suppressed(payload: &Value, respect_no_log: bool) -> bool {
    respect_no_log
        && payload
            .get(NO_LOG_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
}

/// Render the payload into the data segment of a log line.
///
/// A verbose-override marker redacts the whole body to
/// [`REDACTED_PLACEHOLDER`]. Otherwise the invocation sub-mapping is split
/// off and prepended as `<invocation> => <body> `; `format_invocation`
/// selects between compact serialization and full recursive rendering for
/// the invocation part. Marker keys never reach the output.
pub fn render_body(
    payload: &Value,
    whitelist: &BTreeSet<String>,
    format_invocation: bool,
) -> Result<String, RenderError> {
    let Value::Object(map) = payload else {
        return render(payload, whitelist);
    };

    if map.contains_key(VERBOSE_OVERRIDE_KEY) {
        return Ok(REDACTED_PLACEHOLDER.to_string());
    }

    let mut copy = map.clone();
    copy.remove(NO_LOG_KEY);
    copy.remove(VERBOSE_OVERRIDE_KEY);
    let invocation = copy.remove(INVOCATION_KEY);

    let body = render(&Value::Object(copy), whitelist)?;

    match invocation {
        Some(invocation) => {
            let rendered = if format_invocation {
                render(&invocation, &BTreeSet::new())?
            } else {
                invocation.to_string()
            };
            Ok(format!("{} => {} ", rendered, body))
        }
        None => Ok(body),
    }
}
