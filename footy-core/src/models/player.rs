use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single rating left on a player's profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub rating: u8,
    pub comment: String,
    pub author: String,
    pub date: String,
}

impl Feedback {
    pub fn new(rating: u8, comment: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            rating,
            comment: comment.into(),
            author: author.into(),
            date: String::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }
}

/// A football player as served by the players API.
///
/// Field names on the wire follow the API exactly (`playerName`, `YoB`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: String,
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub team: String,
    pub position: String,
    #[serde(rename = "YoB")]
    pub year_of_birth: i32,
    #[serde(rename = "MinutesPlayed")]
    pub minutes_played: u32,
    #[serde(rename = "PassingAccuracy")]
    pub passing_accuracy: f64,
    #[serde(rename = "isCaptain", default)]
    pub is_captain: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
}

/// Earliest birth year accepted from the API.
pub const MIN_YEAR_OF_BIRTH: i32 = 1900;

/// Why a player record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidPlayer {
    #[error("player id is empty")]
    EmptyId,
    #[error("passing accuracy {0} is outside [0, 1]")]
    PassingAccuracy(f64),
    #[error("feedback #{index} has rating {rating} (expected 1-5)")]
    Rating { index: usize, rating: u8 },
    #[error("year of birth {year} is outside 1900..={latest}")]
    YearOfBirth { year: i32, latest: i32 },
}

impl Player {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            player_name: name.into(),
            team: team.into(),
            position: position.into(),
            year_of_birth: 2000,
            minutes_played: 0,
            passing_accuracy: 0.0,
            is_captain: false,
            image: String::new(),
            feedbacks: Vec::new(),
        }
    }

    pub fn with_year_of_birth(mut self, year: i32) -> Self {
        self.year_of_birth = year;
        self
    }

    pub fn with_minutes_played(mut self, minutes: u32) -> Self {
        self.minutes_played = minutes;
        self
    }

    pub fn with_passing_accuracy(mut self, accuracy: f64) -> Self {
        self.passing_accuracy = accuracy;
        self
    }

    pub fn with_captain(mut self, is_captain: bool) -> Self {
        self.is_captain = is_captain;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_feedbacks(mut self, feedbacks: Vec<Feedback>) -> Self {
        self.feedbacks = feedbacks;
        self
    }

    /// Checks the invariants a record must satisfy before it enters the catalog.
    pub fn validate(&self) -> Result<(), InvalidPlayer> {
        if self.id.trim().is_empty() {
            return Err(InvalidPlayer::EmptyId);
        }
        if !(0.0..=1.0).contains(&self.passing_accuracy) {
            return Err(InvalidPlayer::PassingAccuracy(self.passing_accuracy));
        }
        let latest = Utc::now().year();
        if !(MIN_YEAR_OF_BIRTH..=latest).contains(&self.year_of_birth) {
            return Err(InvalidPlayer::YearOfBirth {
                year: self.year_of_birth,
                latest,
            });
        }
        for (index, feedback) in self.feedbacks.iter().enumerate() {
            if !(1..=5).contains(&feedback.rating) {
                return Err(InvalidPlayer::Rating {
                    index,
                    rating: feedback.rating,
                });
            }
        }
        Ok(())
    }

    pub fn age(&self, current_year: i32) -> i32 {
        current_year.saturating_sub(self.year_of_birth)
    }

    /// Mean feedback rating, or 0 when nobody has rated the player yet.
    pub fn average_rating(&self) -> f64 {
        if self.feedbacks.is_empty() {
            return 0.0;
        }
        let total: u32 = self.feedbacks.iter().map(|f| u32::from(f.rating)).sum();
        f64::from(total) / self.feedbacks.len() as f64
    }

    pub fn passing_percent(&self) -> f64 {
        self.passing_accuracy * 100.0
    }

    /// Minutes rendered as "1h 30m", or "45m" under an hour.
    pub fn formatted_minutes(&self) -> String {
        let hours = self.minutes_played / 60;
        let mins = self.minutes_played % 60;
        if hours > 0 {
            format!("{}h {}m", hours, mins)
        } else {
            format!("{}m", mins)
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.is_captain {
            format!("{} (C)", self.player_name)
        } else {
            self.player_name.clone()
        };
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        writeln!(f, "Team: {}", self.team)?;
        writeln!(f, "Position: {}", self.position)?;
        writeln!(f, "Born: {}", self.year_of_birth)?;
        writeln!(f, "Minutes: {}", self.formatted_minutes())?;
        writeln!(f, "Passing: {:.1}%", self.passing_percent())?;

        if !self.feedbacks.is_empty() {
            writeln!(
                f,
                "\nFeedback ({}, avg {:.1}):",
                self.feedbacks.len(),
                self.average_rating()
            )?;
            for feedback in &self.feedbacks {
                writeln!(
                    f,
                    "  - [{}/5] {} ({})",
                    feedback.rating, feedback.comment, feedback.author
                )?;
            }
        }

        Ok(())
    }
}

/// Number of catalog players per team.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamCount {
    pub name: String,
    pub count: usize,
}
