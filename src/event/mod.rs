//! Engine lifecycle events
//!
//! The automation engine notifies us with named lifecycle events, each
//! carrying a result envelope. This module defines the closed set of event
//! kinds and the static (category, severity) table that drives routing.

use log::Level;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod router;

pub use router::Router;

/// Lifecycle event kinds recognized by the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    RunnerOk,
    RunnerFailed,
    RunnerSkipped,
    RunnerUnreachable,
    RunnerAsyncFailed,
    PlaybookStart,
    ImportForHost,
    NotImportForHost,
}

impl EventKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "runnerok" | "ok" => Some(Self::RunnerOk),
            "runnerfailed" | "failed" => Some(Self::RunnerFailed),
            "runnerskipped" | "skipped" => Some(Self::RunnerSkipped),
            "runnerunreachable" | "unreachable" => Some(Self::RunnerUnreachable),
            "runnerasyncfailed" | "asyncfailed" => Some(Self::RunnerAsyncFailed),
            "playbookstart" => Some(Self::PlaybookStart),
            "importforhost" | "imported" => Some(Self::ImportForHost),
            "notimportforhost" | "notimported" => Some(Self::NotImportForHost),
            _ => None,
        }
    }

    /// Wire name, matching the serde tag.
    pub fn name(self) -> &'static str {
        match self {
            Self::RunnerOk => "runner_ok",
            Self::RunnerFailed => "runner_failed",
            Self::RunnerSkipped => "runner_skipped",
            Self::RunnerUnreachable => "runner_unreachable",
            Self::RunnerAsyncFailed => "runner_async_failed",
            Self::PlaybookStart => "playbook_start",
            Self::ImportForHost => "import_for_host",
            Self::NotImportForHost => "not_import_for_host",
        }
    }

    /// The (category label, severity) pair for events that produce a log
    /// line. `PlaybookStart` produces no line; it only updates the current
    /// playbook name.
    pub fn route(self) -> Option<(&'static str, Level)> {
        match self {
            Self::RunnerOk => Some(("OK", Level::Info)),
            Self::RunnerFailed => Some(("FAILED", Level::Error)),
            Self::RunnerSkipped => Some(("SKIPPED", Level::Info)),
            Self::RunnerUnreachable => Some(("UNREACHABLE", Level::Warn)),
            Self::RunnerAsyncFailed => Some(("ASYNC_FAILED", Level::Error)),
            Self::PlaybookStart => None,
            Self::ImportForHost => Some(("IMPORTED", Level::Info)),
            Self::NotImportForHost => Some(("NOTIMPORTED", Level::Info)),
        }
    }

    pub fn all() -> [EventKind; 8] {
        [
            Self::RunnerOk,
            Self::RunnerFailed,
            Self::RunnerSkipped,
            Self::RunnerUnreachable,
            Self::RunnerAsyncFailed,
            Self::PlaybookStart,
            Self::ImportForHost,
            Self::NotImportForHost,
        ]
    }
}

/// Result envelope carried by a lifecycle event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventBody {
    #[serde(default)]
    pub playbook: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub task_name: Option<String>,
    #[serde(default)]
    pub task_action: Option<String>,
    #[serde(default)]
    pub result: Value,
}

/// One line of an ingest stream: the event kind plus its body.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineEvent {
    pub event: EventKind,
    #[serde(flatten)]
    pub body: EventBody,
}
