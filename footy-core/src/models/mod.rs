mod player;
mod profile;

pub use player::{Feedback, InvalidPlayer, Player, TeamCount, MIN_YEAR_OF_BIRTH};
pub use profile::{AppSettings, NotificationSettings, Profile, Theme, DEFAULT_PROFILE_NAME};
