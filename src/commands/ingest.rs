//! Consume a stream of engine events
//!
//! Each input line is one JSON event envelope. A malformed line or a failed
//! append costs that event only; the stream keeps going.

use colored::*;
use eyre::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use crate::config::Config;
use crate::event::{EngineEvent, Router};

pub fn run(file: Option<PathBuf>, config: &Config) -> Result<()> {
    let reader: Box<dyn BufRead> = match &file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event stream: {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut router = Router::new(config.clone())?;
    let mut processed = 0usize;
    let mut failed = 0usize;

    for (number, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read event stream")?;
        if line.trim().is_empty() {
            continue;
        }

        let event: EngineEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                log::error!("Skipping malformed event on line {}: {}", number + 1, e);
                failed += 1;
                continue;
            }
        };

        match router.handle(event.event, &event.body) {
            Ok(()) => processed += 1,
            Err(e) => {
                log::error!(
                    "Failed to process {} event on line {}: {}",
                    event.event.name(),
                    number + 1,
                    e
                );
                failed += 1;
            }
        }
    }

    router.flush()?;

    println!(
        "{} Processed {} event(s) across {} host(s)",
        "✓".green(),
        processed,
        router.sink_count()
    );
    if failed > 0 {
        println!("{} Skipped {} malformed or failed event(s)", "⚠".yellow(), failed);
    }

    Ok(())
}
