//! User preference values and the fixed set of mutations applied to them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::ConferenceId;

/// Local-storage key the preferences are persisted under.
pub const PREFERENCES_KEY: &str = "confradar-preferences";

pub const DEFAULT_DAYS_BEFORE_DEADLINE: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

keyword_enum!(Theme {
    Light => "light",
    Dark => "dark",
    System => "system",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

keyword_enum!(ViewMode {
    Grid => "grid",
    List => "list",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimezoneMode {
    #[default]
    Local,
    Aoe,
}

keyword_enum!(TimezoneMode {
    Local => "local",
    Aoe => "aoe",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    #[default]
    Relative,
    Absolute,
}

keyword_enum!(DateFormat {
    Relative => "relative",
    Absolute => "absolute",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    pub days_before_deadline: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            days_before_deadline: DEFAULT_DAYS_BEFORE_DEADLINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub date_format: DateFormat,
    /// Timezone label used when the timezone mode is `local`. Empty means the
    /// machine's own timezone.
    pub timezone: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            timezone: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub favorites: BTreeSet<ConferenceId>,
    pub timezone_mode: TimezoneMode,
    pub notifications: NotificationSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceMutation {
    SetTheme(Theme),
    SetViewMode(ViewMode),
    ToggleFavorite(ConferenceId),
    SetTimezoneMode(TimezoneMode),
    SetNotificationSettings(NotificationSettings),
    SetDisplaySettings(DisplaySettings),
    Reset,
}

impl UserPreferences {
    /// Returns the snapshot produced by `mutation`; `self` is left untouched.
    pub fn apply(&self, mutation: &PreferenceMutation) -> Self {
        let mut next = self.clone();
        match mutation {
            PreferenceMutation::SetTheme(theme) => next.theme = *theme,
            PreferenceMutation::SetViewMode(view_mode) => next.view_mode = *view_mode,
            PreferenceMutation::ToggleFavorite(id) => {
                if !next.favorites.remove(id) {
                    next.favorites.insert(id.clone());
                }
            }
            PreferenceMutation::SetTimezoneMode(mode) => next.timezone_mode = *mode,
            PreferenceMutation::SetNotificationSettings(settings) => {
                next.notifications = settings.clone()
            }
            PreferenceMutation::SetDisplaySettings(settings) => next.display = settings.clone(),
            PreferenceMutation::Reset => next = Self::default(),
        }
        next
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_a_favorite_twice_restores_the_set() {
        let original = UserPreferences::default()
            .apply(&PreferenceMutation::ToggleFavorite("icml-2025".into()));
        let toggle = PreferenceMutation::ToggleFavorite("neurips-2025".into());

        let once = original.apply(&toggle);
        assert!(once.is_favorite("neurips-2025"));

        let twice = once.apply(&toggle);
        assert_eq!(twice.favorites, original.favorites);
        assert!(twice.is_favorite("icml-2025"));
    }

    #[test]
    fn apply_returns_a_new_snapshot() {
        let before = UserPreferences::default();
        let after = before.apply(&PreferenceMutation::SetTheme(Theme::Dark));
        assert_eq!(before.theme, Theme::System);
        assert_eq!(after.theme, Theme::Dark);
    }

    #[test]
    fn reset_restores_defaults() {
        let changed = UserPreferences::default()
            .apply(&PreferenceMutation::SetViewMode(ViewMode::List))
            .apply(&PreferenceMutation::SetTimezoneMode(TimezoneMode::Aoe));
        assert_eq!(
            changed.apply(&PreferenceMutation::Reset),
            UserPreferences::default()
        );
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let prefs: UserPreferences =
            serde_json::from_str(r#"{"theme":"dark","favorites":["a"]}"#).expect("prefs");
        assert_eq!(prefs.theme, Theme::Dark);
        assert_eq!(prefs.view_mode, ViewMode::Grid);
        assert_eq!(prefs.notifications.days_before_deadline, 7);
        assert!(prefs.is_favorite("a"));
    }
}
