use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;

use crate::config::Config;

use super::OutputFormat;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# footy configuration

# Path to SQLite database (default: platform data dir, footy/footy.db)
# database_path: footy.db

# Player API
# api_base_url: https://685945b9138a18086dfdca1a.mockapi.io
# request_timeout_secs: 10

# remote: every search refetches the player list
# local: search filters the players already loaded
search_mode: remote

# AI insights (Gemini). Without an API key insights fall back to local summaries.
ai:
  # api_key: your-key
  model: gemini-2.0-flash
  timeout_secs: 15
"#;

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&redacted(config))?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        println!("footy-core: {}", footy_core::version());

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("database_path: {}", config.database_path.value.display());
                        println!("  source: {}", config.database_path.source);
                        println!();

                        println!("api_base_url: {}", config.api_base_url.value);
                        println!("  source: {}", config.api_base_url.source);
                        println!();

                        println!("request_timeout_secs: {}", config.request_timeout_secs.value);
                        println!("  source: {}", config.request_timeout_secs.source);
                        println!();

                        println!("search_mode: {}", config.search_mode.value);
                        println!("  source: {}", config.search_mode.source);
                        println!();

                        println!("ai:");
                        println!(
                            "  api_key: {}",
                            if config.ai.is_configured() {
                                "(set)"
                            } else {
                                "(not set)"
                            }
                        );
                        println!("  model: {}", config.ai.model);
                        println!("  endpoint: {}", config.ai.endpoint);
                        println!("  timeout_secs: {}", config.ai.timeout_secs);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = Config::default_config_path();

                // Check if config already exists
                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'footy config show' to view current configuration.");
                    return Ok(());
                }

                // Create parent directory
                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}

/// Copy of `config` safe to print: the AI key is masked.
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.ai.api_key.is_some() {
        shown.ai.api_key = Some("********".to_string());
    }
    shown
}
