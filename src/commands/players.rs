use clap::{Args, Subcommand};

use footy_core::{filter, FilterCriteria, SearchMode, Session};

use super::{print_players, OutputFormat};

#[derive(Args)]
pub struct PlayersCommand {
    #[command(subcommand)]
    pub command: PlayersSubcommand,
}

#[derive(Subcommand)]
pub enum PlayersSubcommand {
    /// List players in the catalog
    List {
        /// Only show this team's players
        #[arg(long)]
        team: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Search players by name, team or position
    Search {
        /// Text to look for (case-insensitive)
        query: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Combine team, position, favorites and name filters
    Browse {
        /// Team name
        #[arg(long)]
        team: Option<String>,

        /// Position (exact match)
        #[arg(long)]
        position: Option<String>,

        /// Text contained in the player's name
        #[arg(long, short)]
        query: Option<String>,

        /// Only show favorites
        #[arg(long)]
        favorites: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a player's details
    Show {
        /// Player ID
        id: String,

        /// Also list the players that follow in the catalog
        #[arg(long, default_value_t = 0)]
        next: usize,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List teams with their player counts
    Teams {
        /// Only print the sorted team names
        #[arg(long)]
        names: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List the positions present in the catalog
    Positions {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl PlayersCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PlayersSubcommand::List { team, format } => {
                session.catalog.fetch_all().await?;
                if team.is_some() {
                    session.catalog.set_selected_team(team.clone()).await;
                }
                let state = session.catalog.snapshot().await;
                print_players(&state.filtered_players, format)?;
                Ok(())
            }

            PlayersSubcommand::Search { query, format } => {
                if let SearchMode::Local = session.catalog.search_mode() {
                    session.catalog.fetch_all().await?;
                }
                session.catalog.search_players(query).await?;
                let state = session.catalog.snapshot().await;
                print_players(&state.filtered_players, format)?;
                Ok(())
            }

            PlayersSubcommand::Browse {
                team,
                position,
                query,
                favorites,
                format,
            } => {
                session.catalog.fetch_all().await?;

                let mut criteria = FilterCriteria::new().favorites_only(*favorites);
                if let Some(team) = team {
                    criteria = criteria.with_team(team);
                }
                if let Some(position) = position {
                    criteria = criteria.with_position(position);
                }
                if let Some(query) = query {
                    criteria = criteria.with_query(query);
                }

                let players = session.browse(&criteria).await;
                print_players(&players, format)?;
                Ok(())
            }

            PlayersSubcommand::Show { id, next, format } => {
                let player = session.catalog.fetch_player(id).await?;
                let is_favorite = session.favorites.is_favorite(&player.id).await;

                let following = if *next > 0 {
                    session.catalog.fetch_all().await?;
                    session.catalog.next_players(&player.id, *next).await
                } else {
                    Vec::new()
                };

                match format {
                    OutputFormat::Json => {
                        let output = serde_json::json!({
                            "player": player,
                            "isFavorite": is_favorite,
                            "next": following,
                        });
                        println!("{}", serde_json::to_string_pretty(&output)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", player);
                        println!(
                            "Favorite: {}",
                            if is_favorite { "yes" } else { "no" }
                        );
                        if !following.is_empty() {
                            println!("\nUp next:");
                            for p in &following {
                                println!("  - {} [{}] {}", p.player_name, p.id, p.team);
                            }
                        }
                    }
                }
                Ok(())
            }

            PlayersSubcommand::Teams { names, format } => {
                session.catalog.fetch_all().await?;
                let state = session.catalog.snapshot().await;

                if *names {
                    let names = filter::team_names(&state.players);
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&names)?);
                        }
                        OutputFormat::Text => {
                            for name in &names {
                                println!("{}", name);
                            }
                        }
                    }
                    return Ok(());
                }

                let teams = state.teams;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&teams)?);
                    }
                    OutputFormat::Text => {
                        if teams.is_empty() {
                            println!("No teams found");
                            return Ok(());
                        }
                        println!("{:<30}  PLAYERS", "TEAM");
                        println!("{}", "-".repeat(40));
                        for team in &teams {
                            println!("{:<30}  {}", team.name, team.count);
                        }
                        println!("\nTotal: {} team(s)", teams.len());
                    }
                }
                Ok(())
            }

            PlayersSubcommand::Positions { format } => {
                session.catalog.fetch_all().await?;
                let positions = session.catalog.positions().await;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&positions)?);
                    }
                    OutputFormat::Text => {
                        if positions.is_empty() {
                            println!("No positions found");
                        }
                        for position in &positions {
                            println!("{}", position);
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
