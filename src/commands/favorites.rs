use clap::{Args, Subcommand};
use std::io::{self, Write};

use footy_core::{Session, Toggled};

use super::{print_players, OutputFormat};

#[derive(Args)]
pub struct FavoritesCommand {
    #[command(subcommand)]
    pub command: FavoritesSubcommand,
}

#[derive(Subcommand)]
pub enum FavoritesSubcommand {
    /// List favorite players
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a player to favorites
    Add {
        /// Player ID
        id: String,
    },

    /// Remove a player from favorites
    Remove {
        /// Player ID
        id: String,
    },

    /// Add the player if missing, remove it otherwise
    Toggle {
        /// Player ID
        id: String,
    },

    /// Remove every favorite
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl FavoritesCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FavoritesSubcommand::List { format } => {
                let favorites = session.favorites.favorites().await;
                print_players(&favorites, format)?;
                Ok(())
            }

            FavoritesSubcommand::Add { id } => {
                let player = session.catalog.fetch_player(id).await?;
                let name = player.player_name.clone();
                session.favorites.add(player).await?;
                session.persist_root().await?;
                println!("Added {} to favorites", name);
                Ok(())
            }

            FavoritesSubcommand::Remove { id } => {
                if !session.favorites.is_favorite(id).await {
                    return Err(format!("Player '{}' is not a favorite", id).into());
                }
                session.favorites.remove(id).await?;
                session.persist_root().await?;
                println!("Removed {} from favorites", id);
                Ok(())
            }

            FavoritesSubcommand::Toggle { id } => {
                let player = session.catalog.fetch_player(id).await?;
                let name = player.player_name.clone();
                let outcome = session.favorites.toggle(player).await?;
                session.persist_root().await?;
                match outcome {
                    Toggled::Added => println!("Added {} to favorites", name),
                    Toggled::Removed => println!("Removed {} from favorites", name),
                }
                Ok(())
            }

            FavoritesSubcommand::Clear { force } => {
                let count = session.favorites.favorites().await.len();
                if count == 0 {
                    println!("No favorites to clear");
                    return Ok(());
                }

                if !force {
                    print!("Remove all {} favorite(s)? [y/N] ", count);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Cancelled");
                        return Ok(());
                    }
                }

                session.favorites.clear().await?;
                session.persist_root().await?;
                println!("Cleared {} favorite(s)", count);
                Ok(())
            }
        }
    }
}
