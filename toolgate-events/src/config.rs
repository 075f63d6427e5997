use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const EVENTS_ENABLED_ENV: &str = "TOOLGATE_EVENTS_ENABLED";
pub const EVENTS_FILE_ENV: &str = "TOOLGATE_EVENTS_FILE";
pub const DEFAULT_EVENTS_FILE: &str = "logs/toolgate-events.jsonl";

/// The events switch also accepts `enabled`, unlike the feature flags.
const TRUTHY: [&str; 5] = ["1", "true", "yes", "on", "enabled"];

/// Where and whether events are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    pub enabled: bool,
    pub output_path: PathBuf,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_path: PathBuf::from(DEFAULT_EVENTS_FILE),
        }
    }
}

impl EventsConfig {
    pub fn enabled_at(output_path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            output_path: output_path.into(),
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let enabled = lookup(EVENTS_ENABLED_ENV).is_some_and(|raw| {
            let normalized = raw.trim().to_ascii_lowercase();
            TRUTHY.contains(&normalized.as_str())
        });
        let output_path = lookup(EVENTS_FILE_ENV)
            .filter(|raw| !raw.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_EVENTS_FILE), PathBuf::from);
        Self {
            enabled,
            output_path,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_disabled() {
        let config = EventsConfig::from_lookup(|_| None);
        assert_eq!(config, EventsConfig::default());
        assert!(!config.enabled);
        assert_eq!(config.output_path, PathBuf::from(DEFAULT_EVENTS_FILE));
    }

    #[test]
    fn test_enabled_token_and_custom_path() {
        let config = EventsConfig::from_lookup(|name| match name {
            EVENTS_ENABLED_ENV => Some(" Enabled ".to_string()),
            EVENTS_FILE_ENV => Some("/tmp/events.jsonl".to_string()),
            _ => None,
        });
        assert!(config.enabled);
        assert_eq!(config.output_path, PathBuf::from("/tmp/events.jsonl"));
    }

    #[test]
    fn test_falsy_value_disables() {
        let config = EventsConfig::from_lookup(|name| {
            (name == EVENTS_ENABLED_ENV).then(|| "0".to_string())
        });
        assert!(!config.enabled);
    }
}
