use clap::Args;
use std::time::Duration;

use footy_core::Session;

use super::OutputFormat;

/// AI summary and similar players for one player
#[derive(Args)]
pub struct InsightsCommand {
    /// Player ID
    pub id: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl InsightsCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        session.catalog.fetch_all().await?;
        let player = match session.catalog.find_player(&self.id).await {
            Some(player) => player,
            None => session.catalog.fetch_player(&self.id).await?,
        };
        let candidates = session.catalog.snapshot().await.players;

        // A single request has nothing to debounce
        let task = session.insight_task().with_debounce(Duration::ZERO);
        task.view(player.clone(), candidates).await;
        task.settle().await;

        let insight = task
            .latest()
            .ok_or_else(|| format!("No insights produced for player '{}'", self.id))?;

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&insight)?);
            }
            OutputFormat::Text => {
                println!("{}", player.player_name);
                println!("{}\n", "=".repeat(player.player_name.chars().count()));
                println!("{}", insight.summary);

                println!("\nSimilar players:");
                if insight.similar.is_empty() {
                    println!("  (none)");
                }
                for p in &insight.similar {
                    println!(
                        "  - {} [{}] {}, {} (age {})",
                        p.player_name,
                        p.id,
                        p.position,
                        p.team,
                        p.age(session.insights.current_year())
                    );
                }
            }
        }
        Ok(())
    }
}
