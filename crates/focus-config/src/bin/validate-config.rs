//! Config validation CLI tool
//!
//! Validates a focusd configuration file and reports any errors.

use focus_util::{default_config_path, format_duration};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a focusd configuration file.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-config {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match focus_config::load_config(&config_path) {
        Ok(config) => {
            let timer = &config.timer;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", focus_config::CURRENT_CONFIG_VERSION);
            println!("  Focus: {}", format_duration(timer.focus_duration));
            println!("  Break: {}", format_duration(timer.break_duration));
            println!(
                "  Long break: {} (every {} focus sessions)",
                format_duration(timer.long_break_duration),
                timer.long_break_interval
            );
            println!(
                "  Auto-start: focus={} break={}",
                timer.auto_start_focus, timer.auto_start_break
            );
            println!("  Scripts: {}", config.scripts.len());

            for script in &config.scripts {
                let triggers: Vec<&str> = script.triggers.iter().map(|t| t.as_str()).collect();
                let state = if script.enabled { "" } else { " (disabled)" };
                println!(
                    "  - {}{}: {} [{}]",
                    script.name,
                    state,
                    script.argv.join(" "),
                    triggers.join(", ")
                );
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                focus_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                focus_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                focus_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                focus_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        focus_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
