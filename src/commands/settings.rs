use clap::{Args, Subcommand, ValueEnum};

use footy_core::{AppSettings, Session, Theme};

use super::OutputFormat;

#[derive(Clone, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<&ThemeArg> for Theme {
    fn from(arg: &ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

#[derive(Args)]
pub struct SettingsCommand {
    #[command(subcommand)]
    pub command: SettingsSubcommand,
}

#[derive(Subcommand)]
pub enum SettingsSubcommand {
    /// Show app settings
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Switch between light and dark theme
    SetTheme {
        #[arg(value_enum)]
        theme: ThemeArg,
    },

    /// Change the app language (e.g. "en")
    SetLanguage { language: String },

    /// Mark onboarding as done
    CompleteOnboarding,

    /// Change notification preferences
    Notifications {
        /// Enable or disable notifications
        #[arg(long)]
        enabled: Option<bool>,

        /// Play a sound
        #[arg(long)]
        sound: Option<bool>,

        /// Vibrate
        #[arg(long)]
        vibration: Option<bool>,
    },
}

impl SettingsCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let updated = match &self.command {
            SettingsSubcommand::Show { format } => {
                let settings = session.settings().await;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&settings)?);
                    }
                    OutputFormat::Text => print_settings(&settings),
                }
                return Ok(());
            }

            SettingsSubcommand::SetTheme { theme } => {
                let theme = Theme::from(theme);
                session.update_settings(|s| s.theme = theme).await?
            }

            SettingsSubcommand::SetLanguage { language } => {
                let language = language.trim();
                if language.is_empty() {
                    return Err("Language cannot be empty".into());
                }
                let language = language.to_string();
                session.update_settings(|s| s.language = language).await?
            }

            SettingsSubcommand::CompleteOnboarding => {
                session
                    .update_settings(|s| s.is_onboarding_completed = true)
                    .await?
            }

            SettingsSubcommand::Notifications {
                enabled,
                sound,
                vibration,
            } => {
                session
                    .update_settings(|s| {
                        if let Some(enabled) = enabled {
                            s.notifications.enabled = *enabled;
                        }
                        if let Some(sound) = sound {
                            s.notifications.sound = *sound;
                        }
                        if let Some(vibration) = vibration {
                            s.notifications.vibration = *vibration;
                        }
                    })
                    .await?
            }
        };

        println!("Updated settings:");
        print_settings(&updated);
        Ok(())
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn print_settings(settings: &AppSettings) {
    println!("Theme: {}", settings.theme);
    println!("Language: {}", settings.language);
    println!(
        "Onboarding: {}",
        if settings.is_onboarding_completed {
            "completed"
        } else {
            "pending"
        }
    );
    println!(
        "Notifications: {} (sound {}, vibration {})",
        on_off(settings.notifications.enabled),
        on_off(settings.notifications.sound),
        on_off(settings.notifications.vibration)
    );
}
