//! Log line composition
//!
//! Fills the configured message template with the timestamp, playbook name,
//! task identity, event category, and rendered data.

use chrono::Local;
use eyre::{Result, eyre};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write as _;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Named values available to the message template.
#[derive(Debug, Clone)]
pub struct MessageContext<'a> {
    pub now: &'a str,
    pub playbook: &'a str,
    pub task_name: &'a str,
    pub task_action: &'a str,
    pub category: &'a str,
    pub data: &'a str,
}

impl<'a> MessageContext<'a> {
    fn lookup(&self, name: &str) -> Option<&'a str> {
        match name {
            "now" => Some(self.now),
            "playbook" => Some(self.playbook),
            "task_name" => Some(self.task_name),
            "task_action" => Some(self.task_action),
            "category" => Some(self.category),
            "data" => Some(self.data),
            _ => None,
        }
    }
}

/// Substitute the named placeholders in `template`. A placeholder the
/// context does not know is a configuration error, not a silent drop.
pub fn compose(template: &str, ctx: &MessageContext) -> Result<String> {
    let mut line = String::with_capacity(template.len() + ctx.data.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];
        let value = ctx
            .lookup(name)
            .ok_or_else(|| eyre!("unknown placeholder {{{}}} in msg_format", name))?;

        line.push_str(&template[last..whole.start()]);
        line.push_str(value);
        last = whole.end();
    }
    line.push_str(&template[last..]);

    Ok(line)
}

/// Format the local clock with the configured strftime pattern. Computed at
/// call time, never cached.
pub fn timestamp(time_format: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", Local::now().format(time_format))
        .map_err(|_| eyre!("invalid time_format pattern: {}", time_format))?;
    Ok(out)
}

/// Reject templates with unknown placeholders at configuration time.
pub fn validate_template(template: &str) -> Result<()> {
    let probe = MessageContext {
        now: "",
        playbook: "",
        task_name: "",
        task_action: "",
        category: "",
        data: "",
    };
    compose(template, &probe).map(|_| ())
}

/// Reject strftime patterns chrono cannot format.
pub fn validate_time_format(time_format: &str) -> Result<()> {
    timestamp(time_format).map(|_| ())
}
