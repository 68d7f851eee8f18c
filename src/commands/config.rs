//! Show resolved configuration

use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(config)?),
        OutputFormat::Text => {
            println!("{}", "Configuration:".bold());
            println!("  log_folder:        {}", config.expanded_log_folder().display());
            println!("  max_bytes:         {}", config.max_bytes);
            println!("  backup_count:      {}", config.backup_count);
            println!("  time_format:       {}", config.time_format);
            println!("  msg_format:        {}", config.msg_format.escape_debug());
            println!("  format_invocation: {}", config.format_invocation);
            println!("  respect_no_log:    {}", config.respect_no_log);

            let whitelist = config.whitelist();
            if whitelist.is_empty() {
                println!("  whitelist:         {}", "disabled".dimmed());
            } else {
                let keys: Vec<String> = whitelist.into_iter().collect();
                println!("  whitelist:         {}", keys.join(", "));
            }
        }
    }

    Ok(())
}
