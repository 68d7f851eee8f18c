//! Diagnose hostlog setup issues

use colored::*;
use eyre::Result;

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    println!("{}", "Hostlog Doctor".bold());
    println!("{}", "═".repeat(50));
    println!();

    let mut issues = 0;

    // Log folder existence and writability
    let log_folder = config.expanded_log_folder();
    if log_folder.exists() {
        match tempfile::tempfile_in(&log_folder) {
            Ok(_) => println!("{} Log folder writable: {}", "✓".green(), log_folder.display()),
            Err(e) => {
                println!("{} Log folder not writable: {} ({})", "✗".red(), log_folder.display(), e);
                issues += 1;
            }
        }
    } else {
        println!(
            "{} Log folder missing: {} (created on first event)",
            "⚠".yellow(),
            log_folder.display()
        );
    }

    // Config file discovery
    if let Some(config_dir) = dirs::config_dir() {
        let config_file = config_dir.join("hostlog").join("hostlog.yaml");
        if config_file.exists() {
            println!("{} Config file: {}", "✓".green(), config_file.display());
        } else {
            println!("{} No config file, using defaults: {}", "⚠".yellow(), config_file.display());
        }
    }

    // Template and time format
    match config.validate() {
        Ok(()) => println!("{} Message template and time format valid", "✓".green()),
        Err(e) => {
            println!("{} {:#}", "✗".red(), e);
            issues += 1;
        }
    }

    println!();
    println!("{}", "Rotation:".bold());
    if config.max_bytes == 0 {
        println!("  {} log files grow unbounded (max_bytes = 0)", "⚠".yellow());
    } else if config.backup_count == 0 {
        println!(
            "  {} max_bytes = {} but backup_count = 0 disables rotation",
            "⚠".yellow(),
            config.max_bytes
        );
    } else {
        println!(
            "  {} roll over at {} bytes, keep {} rotated file(s)",
            "✓".green(),
            config.max_bytes,
            config.backup_count
        );
    }

    println!();
    println!("{}", "═".repeat(50));
    if issues == 0 {
        println!("{} All checks passed!", "✓".green().bold());
    } else {
        println!("{} {} issue(s) found", "⚠".yellow().bold(), issues);
    }

    Ok(())
}
