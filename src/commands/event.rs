//! Dispatch and inspect lifecycle events

use colored::*;
use eyre::{Context, Result, eyre};
use std::io::{self, Read};

use crate::cli::EventAction;
use crate::config::Config;
use crate::event::{EventBody, EventKind, Router};

pub fn run(action: EventAction, config: &Config) -> Result<()> {
    match action {
        EventAction::Dispatch { event, payload } => dispatch(&event, payload.as_deref(), config),
        EventAction::List => list(),
    }
}

fn dispatch(event: &str, payload: Option<&str>, config: &Config) -> Result<()> {
    let kind = EventKind::from_str(event).ok_or_else(|| eyre!("Unknown event kind: {}", event))?;

    // Read the event body from stdin if not provided
    let payload_str = match payload {
        Some(p) => p.to_string(),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read payload from stdin")?;
            buffer
        }
    };

    let body: EventBody = if payload_str.trim().is_empty() {
        EventBody::default()
    } else {
        serde_json::from_str(&payload_str).context("Failed to parse payload JSON")?
    };

    log::debug!("Dispatching event: {}", kind.name());

    let mut router = Router::new(config.clone())?;
    router.handle(kind, &body)?;
    router.flush()
}

fn list() -> Result<()> {
    println!("{}", "Recognized lifecycle events:".bold());
    println!();

    for kind in EventKind::all() {
        match kind.route() {
            Some((category, level)) => {
                println!(
                    "  {:<22} {} {}",
                    kind.name(),
                    format!("{:<13}", category).cyan(),
                    format!("{}", level).to_lowercase().dimmed()
                );
            }
            None => {
                println!("  {:<22} {}", kind.name(), "updates the current playbook".dimmed());
            }
        }
    }

    Ok(())
}
