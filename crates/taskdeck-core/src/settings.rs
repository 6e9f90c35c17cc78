//! User preferences record and partial updates.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Priority;
use crate::view::NamedView;

/// Raised when a token names no variant of a preference enum.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized value '{0}'")]
pub struct ParseTokenError(pub String);

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $token:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $token)] $variant),+
        }

        impl $name {
            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseTokenError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($token => Ok(Self::$variant),)+
                    _ => Err(ParseTokenError(s.to_string())),
                }
            }
        }
    };
}

token_enum! {
    /// Color scheme.
    pub enum Theme {
        /// Light scheme.
        #[default]
        Light => "light",
        /// Dark scheme.
        Dark => "dark",
        /// Follow the operating system.
        System => "system",
    }
}

token_enum! {
    /// Landing view of the dashboard.
    pub enum DefaultView {
        /// Full list.
        #[default]
        All => "all",
        /// Due today.
        Today => "today",
        /// Due this week.
        Week => "week",
        /// Completed.
        Completed => "completed",
        /// Overdue.
        Overdue => "overdue",
    }
}

token_enum! {
    /// First day of the displayed week. Stored as a preference only.
    pub enum WeekStart {
        /// Monday.
        #[default]
        Monday => "monday",
        /// Sunday.
        Sunday => "sunday",
    }
}

token_enum! {
    /// Clock style for timestamps.
    pub enum TimeFormat {
        /// `3:04 PM`.
        #[default]
        TwelveHour => "12h",
        /// `15:04`.
        TwentyFourHour => "24h",
    }
}

impl DefaultView {
    /// Named view to open, or `None` for the full list.
    #[must_use]
    pub const fn named(self) -> Option<NamedView> {
        match self {
            Self::All => None,
            Self::Today => Some(NamedView::Today),
            Self::Week => Some(NamedView::Week),
            Self::Completed => Some(NamedView::Completed),
            Self::Overdue => Some(NamedView::Overdue),
        }
    }
}

/// Persisted preferences. [`Settings::default`] is the record used when none is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// Color scheme.
    pub theme: Theme,
    /// Landing view.
    pub default_view: DefaultView,
    /// Whether completed tasks stay in the main list.
    pub show_completed: bool,
    /// Master switch for sounds.
    pub sound_enabled: bool,
    /// Remind before due dates.
    pub due_date_reminders: bool,
    /// Play a sound on completion.
    pub completion_sounds: bool,
    /// Send a daily summary.
    pub daily_digest: bool,
    /// First day of the displayed week.
    pub start_of_week: WeekStart,
    /// Clock style.
    pub time_format: TimeFormat,
    /// Priority preselected for new tasks.
    pub default_priority: Priority,
    /// Hide completed tasks automatically.
    pub auto_archive_completed: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            default_view: DefaultView::All,
            show_completed: true,
            sound_enabled: true,
            due_date_reminders: true,
            completion_sounds: true,
            daily_digest: false,
            start_of_week: WeekStart::Monday,
            time_format: TimeFormat::TwelveHour,
            default_priority: Priority::Medium,
            auto_archive_completed: false,
        }
    }
}

impl Settings {
    /// Merge `patch` onto `self`, keeping every field the patch leaves unset.
    #[must_use]
    pub fn merged(mut self, patch: &SettingsPatch) -> Self {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field { self.$field = value; })*
            };
        }
        take!(
            theme,
            default_view,
            show_completed,
            sound_enabled,
            due_date_reminders,
            completion_sounds,
            daily_digest,
            start_of_week,
            time_format,
            default_priority,
            auto_archive_completed,
        );
        self
    }

    /// `(key, value)` pairs in wire order, for display.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("theme", self.theme.to_string()),
            ("default_view", self.default_view.to_string()),
            ("show_completed", self.show_completed.to_string()),
            ("sound_enabled", self.sound_enabled.to_string()),
            ("due_date_reminders", self.due_date_reminders.to_string()),
            ("completion_sounds", self.completion_sounds.to_string()),
            ("daily_digest", self.daily_digest.to_string()),
            ("start_of_week", self.start_of_week.to_string()),
            ("time_format", self.time_format.to_string()),
            ("default_priority", self.default_priority.to_string()),
            ("auto_archive_completed", self.auto_archive_completed.to_string()),
        ]
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsPatch {
    /// Color scheme.
    pub theme: Option<Theme>,
    /// Landing view.
    pub default_view: Option<DefaultView>,
    /// Keep completed tasks in the main list.
    pub show_completed: Option<bool>,
    /// Master switch for sounds.
    pub sound_enabled: Option<bool>,
    /// Due date reminders.
    pub due_date_reminders: Option<bool>,
    /// Completion sounds.
    pub completion_sounds: Option<bool>,
    /// Daily summary.
    pub daily_digest: Option<bool>,
    /// First day of the displayed week.
    pub start_of_week: Option<WeekStart>,
    /// Clock style.
    pub time_format: Option<TimeFormat>,
    /// Priority for new tasks.
    pub default_priority: Option<Priority>,
    /// Hide completed tasks automatically.
    pub auto_archive_completed: Option<bool>,
}

/// Raised when a `key=value` assignment cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The key names no setting.
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    /// The value is not valid for the key.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Rejected input.
        value: String,
    },
}

impl SettingsPatch {
    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record one textual assignment such as `time_format = 24h`.
    ///
    /// # Errors
    /// Returns [`SettingsError`] for unknown keys or unparsable values.
    pub fn assign(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        let invalid = || SettingsError::InvalidValue {
            key: key.clone(),
            value: value.to_string(),
        };
        match key.as_str() {
            "theme" => self.theme = Some(value.parse().map_err(|_| invalid())?),
            "default_view" => self.default_view = Some(value.parse().map_err(|_| invalid())?),
            "start_of_week" => self.start_of_week = Some(value.parse().map_err(|_| invalid())?),
            "time_format" => self.time_format = Some(value.parse().map_err(|_| invalid())?),
            "default_priority" => {
                self.default_priority = Some(value.parse().map_err(|_| invalid())?);
            }
            "show_completed" => self.show_completed = Some(parse_flag(value).ok_or_else(invalid)?),
            "sound_enabled" => self.sound_enabled = Some(parse_flag(value).ok_or_else(invalid)?),
            "due_date_reminders" => {
                self.due_date_reminders = Some(parse_flag(value).ok_or_else(invalid)?);
            }
            "completion_sounds" => {
                self.completion_sounds = Some(parse_flag(value).ok_or_else(invalid)?);
            }
            "daily_digest" => self.daily_digest = Some(parse_flag(value).ok_or_else(invalid)?),
            "auto_archive_completed" => {
                self.auto_archive_completed = Some(parse_flag(value).ok_or_else(invalid)?);
            }
            _ => return Err(SettingsError::UnknownKey(key)),
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_fixed_record() {
        let settings = Settings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.default_view, DefaultView::All);
        assert!(settings.show_completed);
        assert!(!settings.daily_digest);
        assert_eq!(settings.start_of_week, WeekStart::Monday);
        assert_eq!(settings.time_format, TimeFormat::TwelveHour);
        assert_eq!(settings.default_priority, Priority::Medium);
        assert!(!settings.auto_archive_completed);
    }

    #[test]
    fn patch_overrides_only_set_fields() {
        let mut patch = SettingsPatch::default();
        assert!(patch.is_empty());
        patch
            .assign("time-format", "24H")
            .unwrap_or_else(|err| panic!("assign time format: {err}"));
        patch
            .assign("daily_digest", "on")
            .unwrap_or_else(|err| panic!("assign digest: {err}"));

        let merged = Settings::default().merged(&patch);
        assert_eq!(merged.time_format, TimeFormat::TwentyFourHour);
        assert!(merged.daily_digest);
        assert_eq!(merged.theme, Theme::Light);
    }

    #[test]
    fn assignment_rejects_unknown_keys_and_values() {
        let mut patch = SettingsPatch::default();
        assert_eq!(
            patch.assign("colour", "red"),
            Err(SettingsError::UnknownKey("colour".into()))
        );
        assert!(matches!(
            patch.assign("theme", "neon"),
            Err(SettingsError::InvalidValue { .. })
        ));
        assert!(patch.is_empty());
    }

    #[test]
    fn entries_use_wire_tokens() {
        let entries = Settings::default().entries();
        assert_eq!(entries.len(), 11);
        assert!(entries.contains(&("time_format", "12h".to_string())));
        assert!(entries.contains(&("start_of_week", "monday".to_string())));
    }

    #[test]
    fn default_view_maps_to_named_views() {
        assert_eq!(DefaultView::All.named(), None);
        assert_eq!(DefaultView::Overdue.named(), Some(NamedView::Overdue));
    }
}
