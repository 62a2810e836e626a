//! Pure derivations over a slice of players.
//!
//! Two call shapes are supported and intentionally kept apart:
//!
//! - [`by_team`] / [`search`]: the catalog cache's view, where a team
//!   selection and a text search each replace the view on their own.
//! - [`compose`]: the browse view, an AND chain of team, position,
//!   favorites-only and player-name filters.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{Player, TeamCount};

/// Criteria for [`compose`]. `None`/blank fields do not filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub team: Option<String>,
    pub position: Option<String>,
    pub query: String,
    pub favorites_only: bool,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn favorites_only(mut self, favorites_only: bool) -> Self {
        self.favorites_only = favorites_only;
        self
    }
}

/// Players of `team`, or every player when no team is selected.
pub fn by_team(players: &[Player], team: Option<&str>) -> Vec<Player> {
    match team {
        Some(team) => players.iter().filter(|p| p.team == team).cloned().collect(),
        None => players.to_vec(),
    }
}

/// Players whose name, team or position contains `query`, ignoring case.
///
/// A blank query matches everyone.
pub fn search(players: &[Player], query: &str) -> Vec<Player> {
    let query = query.trim();
    if query.is_empty() {
        return players.to_vec();
    }
    let query_lower = query.to_lowercase();

    players
        .iter()
        .filter(|p| {
            p.player_name.to_lowercase().contains(&query_lower)
                || p.team.to_lowercase().contains(&query_lower)
                || p.position.to_lowercase().contains(&query_lower)
        })
        .cloned()
        .collect()
}

/// Narrows `players` by team, then position, then favorites, then name.
pub fn compose(
    players: &[Player],
    criteria: &FilterCriteria,
    favorite_ids: &HashSet<String>,
) -> Vec<Player> {
    let query_lower = criteria.query.trim().to_lowercase();

    players
        .iter()
        .filter(|p| criteria.team.as_deref().map_or(true, |t| p.team == t))
        .filter(|p| criteria.position.as_deref().map_or(true, |pos| p.position == pos))
        .filter(|p| !criteria.favorites_only || favorite_ids.contains(&p.id))
        .filter(|p| query_lower.is_empty() || p.player_name.to_lowercase().contains(&query_lower))
        .cloned()
        .collect()
}

/// Players per team, in order of each team's first appearance.
pub fn team_counts(players: &[Player]) -> Vec<TeamCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TeamCount> = Vec::new();

    for player in players {
        match index.get(player.team.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(player.team.as_str(), counts.len());
                counts.push(TeamCount {
                    name: player.team.clone(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// Distinct team names, sorted.
pub fn team_names(players: &[Player]) -> Vec<String> {
    players
        .iter()
        .map(|p| p.team.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct positions, sorted.
pub fn positions(players: &[Player]) -> Vec<String> {
    players
        .iter()
        .map(|p| p.position.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
