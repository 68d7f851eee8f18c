//! Event routing
//!
//! Drives filter → format → compose → sink for each lifecycle event. The
//! router is the one place holding mutable pipeline state: the per-host sink
//! registry and the current playbook name.

use eyre::{Context, Result, eyre};
use std::collections::BTreeSet;

use super::{EventBody, EventKind};
use crate::compose::{self, MessageContext};
use crate::config::Config;
use crate::render::redact;
use crate::sink::SinkRegistry;

pub struct Router {
    config: Config,
    whitelist: BTreeSet<String>,
    registry: SinkRegistry,
    playbook: Option<String>,
}

impl Router {
    /// Build the pipeline context: resolves the log folder (created
    /// idempotently) and primes the empty sink registry.
    pub fn new(config: Config) -> Result<Self> {
        let registry = SinkRegistry::new(
            config.expanded_log_folder(),
            config.max_bytes,
            config.backup_count,
        )?;
        let whitelist = config.whitelist();

        Ok(Self {
            config,
            whitelist,
            registry,
            playbook: None,
        })
    }

    /// Process one lifecycle event to completion.
    ///
    /// Unrenderable payloads degrade to a raw-text fallback line instead of
    /// losing the event; a failed sink write is an error for this event
    /// only, callers decide whether the stream continues.
    pub fn handle(&mut self, kind: EventKind, body: &EventBody) -> Result<()> {
        if let Some(playbook) = &body.playbook {
            self.playbook = Some(playbook.clone());
        }

        let Some((category, level)) = kind.route() else {
            log::info!("Playbook started: {}", self.playbook.as_deref().unwrap_or("-"));
            return Ok(());
        };

        if redact::is_suppressed(&body.result, self.config.respect_no_log) {
            log::debug!(
                "Result for host {} carries the no-log marker, not logging",
                body.host.as_deref().unwrap_or("-")
            );
            return Ok(());
        }

        let host = body
            .host
            .as_deref()
            .ok_or_else(|| eyre!("event {} is missing a host identifier", kind.name()))?;

        let data = match redact::render_body(&body.result, &self.whitelist, self.config.format_invocation) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Unrenderable result for host {}: {}; logging raw payload", host, err);
                body.result.to_string()
            }
        };

        let now = compose::timestamp(&self.config.time_format)?;
        let ctx = MessageContext {
            now: &now,
            playbook: self.playbook.as_deref().unwrap_or("-"),
            task_name: body.task_name.as_deref().unwrap_or("-"),
            task_action: body.task_action.as_deref().unwrap_or("-"),
            category,
            data: &data,
        };
        let line = compose::compose(&self.config.msg_format, &ctx)?;

        log::log!(level, "{} {} - {}", category, host, ctx.task_name);

        self.registry
            .get_or_create(host)?
            .append(&line)
            .with_context(|| format!("Failed to append to log for host: {}", host))
    }

    pub fn current_playbook(&self) -> Option<&str> {
        self.playbook.as_deref()
    }

    pub fn sink_count(&self) -> usize {
        self.registry.len()
    }

    /// Teardown: flush every open sink.
    pub fn flush(&mut self) -> Result<()> {
        self.registry.flush_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn test_config(folder: &Path) -> Config {
        Config {
            log_folder: folder.to_path_buf(),
            max_bytes: 0,
            backup_count: 0,
            time_format: "%Y".to_string(),
            msg_format: "{category} - {task_name} - {data}\n".to_string(),
            format_invocation: false,
            respect_no_log: true,
            whitelist_dict_keys: String::new(),
        }
    }

    fn body(host: &str, task: &str, result: serde_json::Value) -> EventBody {
        EventBody {
            playbook: None,
            host: Some(host.to_string()),
            task_name: Some(task.to_string()),
            task_action: Some("shell".to_string()),
            result,
        }
    }

    #[test]
    fn test_ok_event_appends_line() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        router
            .handle(EventKind::RunnerOk, &body("web01", "ping", json!({"rc": 0})))
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert!(content.starts_with("OK - ping - "));
        assert!(content.contains("\"rc\": 0"));
    }

    #[test]
    fn test_playbook_start_updates_state_without_logging() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        config.msg_format = "{playbook} {category}\n".to_string();
        let mut router = Router::new(config).unwrap();

        let start = EventBody {
            playbook: Some("site.yml".to_string()),
            ..EventBody::default()
        };
        router.handle(EventKind::PlaybookStart, &start).unwrap();
        assert_eq!(router.current_playbook(), Some("site.yml"));
        assert_eq!(router.sink_count(), 0);

        router
            .handle(EventKind::RunnerFailed, &body("web01", "deploy", json!({"rc": 1})))
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert_eq!(content, "site.yml FAILED\n");
    }

    #[test]
    fn test_no_log_marker_suppresses_line() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        router
            .handle(
                EventKind::RunnerOk,
                &body("web01", "secret", json!({"_no_log": true, "stdout": "hidden"})),
            )
            .unwrap();

        assert_eq!(router.sink_count(), 0);
        assert!(!temp.path().join("web01").exists());
    }

    #[test]
    fn test_no_log_marker_ignored_when_disabled() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        config.respect_no_log = false;
        let mut router = Router::new(config).unwrap();

        router
            .handle(
                EventKind::RunnerOk,
                &body("web01", "secret", json!({"_no_log": true, "stdout": "visible"})),
            )
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert!(content.contains("visible"));
    }

    #[test]
    fn test_verbose_override_redacts_data_segment() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        router
            .handle(
                EventKind::RunnerOk,
                &body("web01", "ping", json!({"_verbose_override": true, "stdout": "secret"})),
            )
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert_eq!(content, "OK - ping - omitted\n");
    }

    #[test]
    fn test_same_host_appends_in_arrival_order() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        router
            .handle(EventKind::RunnerOk, &body("web01", "first", json!("one")))
            .unwrap();
        router
            .handle(EventKind::RunnerSkipped, &body("web01", "second", json!("two")))
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert_eq!(content, "OK - first - one\nSKIPPED - second - two\n");
        assert_eq!(router.sink_count(), 1);
    }

    #[test]
    fn test_different_hosts_use_different_files() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        router
            .handle(EventKind::RunnerOk, &body("web01", "t", json!("a")))
            .unwrap();
        router
            .handle(EventKind::RunnerUnreachable, &body("db01", "t", json!("b")))
            .unwrap();
        router.flush().unwrap();

        assert!(fs::read_to_string(temp.path().join("web01")).unwrap().contains("OK"));
        assert!(
            fs::read_to_string(temp.path().join("db01"))
                .unwrap()
                .contains("UNREACHABLE")
        );
        assert_eq!(router.sink_count(), 2);
    }

    #[test]
    fn test_malformed_payload_falls_back_to_raw_line() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        router
            .handle(EventKind::RunnerFailed, &body("web01", "loop", json!([])))
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert_eq!(content, "FAILED - loop - []\n");
    }

    #[test]
    fn test_missing_host_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut router = Router::new(test_config(temp.path())).unwrap();

        let headless = EventBody {
            result: json!({"rc": 0}),
            ..EventBody::default()
        };
        assert!(router.handle(EventKind::RunnerOk, &headless).is_err());
    }

    #[test]
    fn test_whitelist_limits_rendered_keys() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(temp.path());
        config.whitelist_dict_keys = "rc,stdout".to_string();
        let mut router = Router::new(config).unwrap();

        router
            .handle(
                EventKind::RunnerOk,
                &body("web01", "run", json!({"rc": 0, "stdout": "out", "internal": "noise"})),
            )
            .unwrap();
        router.flush().unwrap();

        let content = fs::read_to_string(temp.path().join("web01")).unwrap();
        assert!(content.contains("\"rc\""));
        assert!(content.contains("\"stdout\""));
        assert!(!content.contains("internal"));
    }
}
