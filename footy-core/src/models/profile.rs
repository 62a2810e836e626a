use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROFILE_NAME: &str = "Football Fan";

/// The local user's profile. The avatar is a reference (URI) to an image
/// picked on the device, never the image itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub avatar: Option<String>,
    pub name: String,
    pub join_date: NaiveDate,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            avatar: None,
            name: DEFAULT_PROFILE_NAME.to_string(),
            join_date: Utc::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub sound: bool,
    pub vibration: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            vibration: true,
        }
    }
}

/// App-wide preferences kept alongside the profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub theme: Theme,
    pub language: String,
    pub is_onboarding_completed: bool,
    pub notifications: NotificationSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "en".to_string(),
            is_onboarding_completed: false,
            notifications: NotificationSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile = Profile::default();
        assert_eq!(profile.name, "Football Fan");
        assert!(profile.avatar.is_none());
        assert_eq!(profile.join_date, Utc::now().date_naive());
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.language, "en");
        assert!(settings.notifications.enabled);
    }

    #[test]
    fn test_profile_join_date_format() {
        let profile = Profile {
            avatar: Some("file:///avatar.jpg".to_string()),
            name: "Ana".to_string(),
            join_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["joinDate"], "2024-06-01");
        assert_eq!(json["avatar"], "file:///avatar.jpg");
    }
}
