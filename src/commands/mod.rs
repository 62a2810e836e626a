mod config_cmd;
mod favorites;
mod insights;
mod players;
mod profile;
mod settings;

pub use config_cmd::ConfigCommand;
pub use favorites::FavoritesCommand;
pub use insights::InsightsCommand;
pub use players::PlayersCommand;
pub use profile::ProfileCommand;
pub use settings::SettingsCommand;

use clap::ValueEnum;
use footy_core::Player;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width - 3).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

/// Prints a player table, or the players as JSON.
fn print_players(players: &[Player], format: &OutputFormat) -> Result<(), serde_json::Error> {
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(players)?);
        return Ok(());
    }

    if players.is_empty() {
        println!("No players found");
        return Ok(());
    }

    println!(
        "{:<6}  {:<26}  {:<20}  {:<12}  RATING",
        "ID", "NAME", "TEAM", "POSITION"
    );
    println!("{}", "-".repeat(80));
    for player in players {
        let name = if player.is_captain {
            format!("{} (C)", player.player_name)
        } else {
            player.player_name.clone()
        };
        println!(
            "{:<6}  {:<26}  {:<20}  {:<12}  {:.1}",
            truncate(&player.id, 6),
            truncate(&name, 26),
            truncate(&player.team, 20),
            truncate(&player.position, 12),
            player.average_rating()
        );
    }
    println!("\nTotal: {} player(s)", players.len());
    Ok(())
}
