//! AI summaries and similar-player suggestions with deterministic fallbacks.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use tokio::time::timeout;

use super::generator::{InsightError, TextGenerator};
use crate::models::Player;

/// Most similar players ever returned.
pub const MAX_SIMILAR: usize = 4;
/// Age gap (years) under which the fallback treats two players as similar.
pub const SIMILAR_AGE_RANGE: i32 = 3;
pub const DEFAULT_INSIGHT_TIMEOUT: Duration = Duration::from_secs(15);

/// Asks a [`TextGenerator`] about players. Never fails: every error path ends
/// in a locally computed answer.
pub struct InsightRequester {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    current_year: i32,
}

impl InsightRequester {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            timeout: DEFAULT_INSIGHT_TIMEOUT,
            current_year: Utc::now().year(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pins the year used for age calculations.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// A short analyst-style summary of `player`.
    pub async fn get_insights(&self, player: &Player) -> String {
        let prompt = insight_prompt(player, self.current_year);
        match self.ask(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Insights for {} fall back to local summary: {}", player.id, e);
                fallback_insight(player)
            }
        }
    }

    /// Up to [`MAX_SIMILAR`] players from `candidates` resembling `player`.
    pub async fn get_similar_players(&self, player: &Player, candidates: &[Player]) -> Vec<Player> {
        let prompt = similar_prompt(player, candidates, self.current_year);
        let suggested = match self.ask(&prompt).await {
            Ok(text) => match_suggestions(&text, player, candidates),
            Err(e) => {
                tracing::warn!("Similar players for {} fall back to heuristic: {}", player.id, e);
                Vec::new()
            }
        };

        if suggested.is_empty() {
            return fallback_similar(player, candidates, self.current_year);
        }
        suggested
    }

    async fn ask(&self, prompt: &str) -> Result<String, InsightError> {
        let text = timeout(self.timeout, self.generator.generate(prompt))
            .await
            .map_err(|_| InsightError::Timeout)??;

        let text = text.trim();
        if text.is_empty() {
            return Err(InsightError::Malformed("empty response".to_string()));
        }
        Ok(text.to_string())
    }
}

fn profile_lines(player: &Player, current_year: i32) -> String {
    format!(
        "- Name: {}\n- Team: {}\n- Position: {}\n- Age: {}\n- Minutes Played: {}\n- Passing Accuracy: {:.1}%\n- Is Captain: {}",
        player.player_name,
        player.team,
        player.position,
        player.age(current_year),
        player.minutes_played,
        player.passing_percent(),
        if player.is_captain { "Yes" } else { "No" },
    )
}

pub fn insight_prompt(player: &Player, current_year: i32) -> String {
    format!(
        "Analyze this football player and provide 2-3 key insights:\n{}\n\n\
         Provide brief, professional insights about:\n\
         1. Playing style and strengths\n\
         2. Performance level\n\
         3. Career stage/potential\n\n\
         Keep it under 100 words, football analyst style.",
        profile_lines(player, current_year)
    )
}

pub fn similar_prompt(player: &Player, candidates: &[Player], current_year: i32) -> String {
    let roster: Vec<String> = candidates
        .iter()
        .map(|p| {
            format!(
                "{} ({}, {}, Age: {})",
                p.player_name,
                p.team,
                p.position,
                p.age(current_year)
            )
        })
        .collect();

    format!(
        "Based on this football player profile:\n{}\n\n\
         From this list of available players:\n{}\n\n\
         Suggest 3-5 similar players based on:\n\
         1. Playing position\n\
         2. Age range (±{} years)\n\
         3. Team style/league\n\
         4. Performance level\n\
         5. Playing time\n\n\
         Return ONLY the exact player names from the list, separated by commas, no additional text or explanation.\n\
         Example format: \"Player Name 1, Player Name 2, Player Name 3\"",
        profile_lines(player, current_year),
        roster.join("\n"),
        SIMILAR_AGE_RANGE
    )
}

/// The summary used when the generator cannot answer.
pub fn fallback_insight(player: &Player) -> String {
    format!(
        "{} is a {} for {}. With {} minutes played and {:.1}% passing accuracy, they show {}.",
        player.player_name,
        player.position,
        player.team,
        player.minutes_played,
        player.passing_percent(),
        if player.is_captain {
            "strong leadership as team captain"
        } else {
            "solid performance levels"
        }
    )
}

/// Splits a comma-separated answer into names, dropping quotes and blanks.
pub fn parse_suggested_names(text: &str) -> Vec<String> {
    text.split(',')
        .map(|name| {
            name.trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '.')
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Matches suggested names against `candidates`, in suggestion order.
///
/// A suggestion matches a candidate when either name contains the other,
/// ignoring case. `player` itself is never returned.
pub fn match_suggestions(text: &str, player: &Player, candidates: &[Player]) -> Vec<Player> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut matched = Vec::new();

    for name in parse_suggested_names(text) {
        let name_lower = name.to_lowercase();
        for candidate in candidates {
            if candidate.id == player.id || seen.contains(candidate.id.as_str()) {
                continue;
            }
            let candidate_lower = candidate.player_name.to_lowercase();
            if candidate_lower.contains(&name_lower) || name_lower.contains(&candidate_lower) {
                seen.insert(&candidate.id);
                matched.push(candidate.clone());
                if matched.len() == MAX_SIMILAR {
                    return matched;
                }
            }
        }
    }

    matched
}

/// Candidates sharing `player`'s position or within [`SIMILAR_AGE_RANGE`]
/// years of their age, in catalog order.
pub fn fallback_similar(player: &Player, candidates: &[Player], current_year: i32) -> Vec<Player> {
    let age = player.age(current_year);
    candidates
        .iter()
        .filter(|p| p.id != player.id)
        .filter(|p| {
            p.position == player.position
                || p.age(current_year).saturating_sub(age).saturating_abs() <= SIMILAR_AGE_RANGE
        })
        .take(MAX_SIMILAR)
        .cloned()
        .collect()
}
