use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "hostlog",
    about = "Per-host human readable task log writer for automation runs",
    version = env!("GIT_DESCRIBE")
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to hostlog.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Handle lifecycle events from the automation engine
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Process a stream of newline-delimited JSON event envelopes
    Ingest {
        /// File to read events from (stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Diagnose setup issues
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Dispatch one lifecycle event
    Dispatch {
        /// Event kind (runner_ok, runner_failed, playbook_start, etc.)
        event: String,

        /// Event body JSON (reads from stdin if not provided)
        #[arg(long)]
        payload: Option<String>,
    },

    /// List recognized event kinds and how they are routed
    List,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show resolved configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}
