use clap::{Args, Subcommand};

use footy_core::{Profile, Session};

use super::OutputFormat;

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the profile
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Change the display name
    SetName {
        /// New name
        name: String,
    },

    /// Point the avatar at an image
    SetAvatar {
        /// Image URI or path
        uri: String,
    },

    /// Restore the default name and remove the avatar
    Reset,
}

impl ProfileCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ProfileSubcommand::Show { format } => {
                let profile = session.profile.profile().await;
                let favorites = session.favorites.favorites().await.len();

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&profile)?);
                    }
                    OutputFormat::Text => {
                        print_profile(&profile);
                        println!("Favorites: {}", favorites);
                    }
                }
                Ok(())
            }

            ProfileSubcommand::SetName { name } => {
                let profile = session.profile.set_name(name).await?;
                session.persist_root().await?;
                println!("Updated profile:");
                print_profile(&profile);
                Ok(())
            }

            ProfileSubcommand::SetAvatar { uri } => {
                let profile = session.profile.set_avatar(uri.as_str()).await?;
                session.persist_root().await?;
                println!("Updated profile:");
                print_profile(&profile);
                Ok(())
            }

            ProfileSubcommand::Reset => {
                let profile = session.profile.reset().await?;
                session.persist_root().await?;
                println!("Profile reset:");
                print_profile(&profile);
                Ok(())
            }
        }
    }
}

fn print_profile(profile: &Profile) {
    println!("Name: {}", profile.name);
    println!(
        "Avatar: {}",
        profile.avatar.as_deref().unwrap_or("(none)")
    );
    println!("Member since: {}", profile.join_date.format("%B %-d, %Y"));
}
