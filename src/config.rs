//! Option resolution
//!
//! Options come from a YAML config file (fallback chain below) and may be
//! overridden per-option through `HOSTLOG_*` environment variables, so an
//! automation engine can configure the writer without shipping a file.
//! Malformed values fail fast here, before any log line is produced.

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compose;

pub const DEFAULT_TIME_FORMAT: &str = "%b %d %Y %H:%M:%S";
pub const DEFAULT_MSG_FORMAT: &str = "{now} - {playbook} - {task_name} - {task_action} - {category} - {data}\n\n";

/// Writer configuration, resolved once per process
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Folder the per-host log files are created in
    pub log_folder: PathBuf,
    /// Sink rollover threshold in bytes, 0 = unbounded
    pub max_bytes: u64,
    /// Rotated files kept per host, 0 = no rotation
    pub backup_count: usize,
    /// strftime pattern for the line timestamp
    pub time_format: String,
    /// Line template over {now} {playbook} {task_name} {task_action} {category} {data}
    pub msg_format: String,
    /// Fully render invocation arguments instead of compact serialization
    pub format_invocation: bool,
    /// Honor the no-log marker on result payloads
    pub respect_no_log: bool,
    /// Comma-separated mapping keys to render, empty = all keys
    pub whitelist_dict_keys: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_folder: default_log_folder(),
            max_bytes: 0,
            backup_count: 0,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            msg_format: DEFAULT_MSG_FORMAT.to_string(),
            format_invocation: false,
            respect_no_log: true,
            whitelist_dict_keys: String::new(),
        }
    }
}

fn default_log_folder() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hostlog")
        .join("hosts")
}

impl Config {
    /// Load configuration with fallback chain, then apply `HOSTLOG_*`
    /// environment overrides and validate the result.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::resolve_file(config_path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn resolve_file(config_path: Option<&PathBuf>) -> Result<Self> {
        // An explicitly requested config file must load
        if let Some(path) = config_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()));
        }

        // Check HOSTLOG_CONFIG env var
        if let Ok(env_path) = env::var("HOSTLOG_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from HOSTLOG_CONFIG: {}", e);
                    }
                }
            }
        }

        // Try ~/.config/hostlog/hostlog.yaml
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("hostlog").join("hostlog.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", path.display(), e);
                    }
                }
            }
        }

        // Try ./hostlog.yaml (for development)
        let local_config = PathBuf::from("hostlog.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load local config: {}", e);
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(folder) = env::var("HOSTLOG_LOG_FOLDER") {
            self.log_folder = PathBuf::from(folder);
        }
        if let Ok(value) = env::var("HOSTLOG_MAX_BYTES") {
            self.max_bytes = value
                .parse()
                .map_err(|_| eyre!("HOSTLOG_MAX_BYTES is not a valid byte count: {}", value))?;
        }
        if let Ok(value) = env::var("HOSTLOG_BACKUP_COUNT") {
            self.backup_count = value
                .parse()
                .map_err(|_| eyre!("HOSTLOG_BACKUP_COUNT is not a valid count: {}", value))?;
        }
        if let Ok(value) = env::var("HOSTLOG_TIME_FORMAT") {
            self.time_format = value;
        }
        if let Ok(value) = env::var("HOSTLOG_MSG_FORMAT") {
            self.msg_format = value;
        }
        if let Ok(value) = env::var("HOSTLOG_FORMAT_INVOCATION") {
            self.format_invocation = parse_bool("HOSTLOG_FORMAT_INVOCATION", &value)?;
        }
        if let Ok(value) = env::var("HOSTLOG_RESPECT_NO_LOG") {
            self.respect_no_log = parse_bool("HOSTLOG_RESPECT_NO_LOG", &value)?;
        }
        if let Ok(value) = env::var("HOSTLOG_WHITELIST_KEYS") {
            self.whitelist_dict_keys = value;
        }
        Ok(())
    }

    /// Reject templates and time formats that cannot produce a line.
    pub fn validate(&self) -> Result<()> {
        compose::validate_template(&self.msg_format).context("Invalid msg_format")?;
        compose::validate_time_format(&self.time_format).context("Invalid time_format")?;
        Ok(())
    }

    /// The whitelisted mapping keys, empty set = no filtering.
    pub fn whitelist(&self) -> BTreeSet<String> {
        self.whitelist_dict_keys
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Log folder with `~` and env vars expanded.
    pub fn expanded_log_folder(&self) -> PathBuf {
        Self::expand_path(&self.log_folder)
    }

    /// Expand a path that may contain ~ or env vars
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(eyre!("{} is not a valid boolean: {}", name, value)),
    }
}
