use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;

use commands::{
    ConfigCommand, FavoritesCommand, InsightsCommand, PlayersCommand, ProfileCommand,
    SettingsCommand,
};
use config::Config;
use db::{init_db, SqliteStore};
use footy_core::{CatalogClient, GeminiClient, Session, SessionOptions};

#[derive(Parser)]
#[command(name = "footy")]
#[command(version)]
#[command(about = "Browse football players and keep your favorites", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the player catalog
    Players(PlayersCommand),

    /// Manage favorite players
    Favorites(FavoritesCommand),

    /// AI summary and similar players for a player
    Insights(InsightsCommand),

    /// Manage your profile
    Profile(ProfileCommand),

    /// Manage app settings
    Settings(SettingsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("FOOTY_LOG")
                .unwrap_or_else(|_| "footy=warn,footy_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Builds a hydrated session from the configuration.
async fn open_session(config: &Config) -> Result<Session, Box<dyn std::error::Error>> {
    let pool = init_db(&config.database_path.value).await?;
    let storage = SqliteStore::new(pool);

    let catalog = CatalogClient::new(config.api_base_url.value.clone(), config.request_timeout())?;
    let generator = GeminiClient::new(config.ai.clone())?;
    if !config.ai.is_configured() {
        tracing::debug!("No AI key configured; insights use local fallbacks");
    }

    let options = SessionOptions {
        search_mode: config.search_mode.value,
        insight_timeout: config.insight_timeout(),
    };

    let session = Session::new(
        Arc::new(catalog),
        Arc::new(storage),
        Arc::new(generator),
        options,
    );
    session.hydrate().await;
    Ok(session)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;
    tracing::debug!(
        "Using database {}",
        config.database_path.value.display()
    );

    match cli.command {
        Some(Commands::Players(cmd)) => {
            let session = open_session(&config).await?;
            cmd.run(&session).await?;
        }
        Some(Commands::Favorites(cmd)) => {
            let session = open_session(&config).await?;
            cmd.run(&session).await?;
        }
        Some(Commands::Insights(cmd)) => {
            let session = open_session(&config).await?;
            cmd.run(&session).await?;
        }
        Some(Commands::Profile(cmd)) => {
            let session = open_session(&config).await?;
            cmd.run(&session).await?;
        }
        Some(Commands::Settings(cmd)) => {
            let session = open_session(&config).await?;
            cmd.run(&session).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
