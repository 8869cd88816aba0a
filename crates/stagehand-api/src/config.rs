//! Server configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;

use stagehand_playback::application::context::PlaybackSettings;

use crate::error::AppError;

/// Everything the server needs at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// JSON or YAML project file.
    pub project_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Prefix joined onto manifest asset paths.
    pub asset_base_url: String,
    pub settings: PlaybackSettings,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PROJECT_PATH` is unset or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `PROJECT_PATH` is missing or any value
    /// fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let project_path = lookup("PROJECT_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                AppError::Config("PROJECT_PATH environment variable must be set".to_owned())
            })?;
        let defaults = PlaybackSettings::default();

        Ok(Self {
            project_path,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&lookup, "PORT", 3000)?,
            asset_base_url: lookup("ASSET_BASE_URL").unwrap_or_default(),
            settings: PlaybackSettings {
                text_speed: parse_or(&lookup, "TEXT_SPEED", defaults.text_speed)?,
                music_volume: parse_or(&lookup, "MUSIC_VOLUME", defaults.music_volume)?
                    .clamp(0.0, 1.0),
                sfx_volume: parse_or(&lookup, "SFX_VOLUME", defaults.sfx_volume)?
                    .clamp(0.0, 1.0),
                enable_skip: parse_or(&lookup, "ENABLE_SKIP", defaults.enable_skip)?,
            },
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_applies_defaults() {
        // Arrange
        let lookup = lookup_from(&[("PROJECT_PATH", "game.yaml")]);

        // Act
        let config = ServerConfig::from_lookup(lookup).unwrap();

        // Assert
        assert_eq!(config.project_path, PathBuf::from("game.yaml"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.asset_base_url, "");
        assert_eq!(config.settings, PlaybackSettings::default());
    }

    #[test]
    fn test_from_lookup_reads_overrides() {
        let lookup = lookup_from(&[
            ("PROJECT_PATH", "game.json"),
            ("PORT", "8080"),
            ("ASSET_BASE_URL", "https://cdn.example.com"),
            ("MUSIC_VOLUME", "0.5"),
            ("ENABLE_SKIP", "false"),
        ]);

        let config = ServerConfig::from_lookup(lookup).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.asset_base_url, "https://cdn.example.com");
        assert!((config.settings.music_volume - 0.5).abs() < f32::EPSILON);
        assert!(!config.settings.enable_skip);
    }

    #[test]
    fn test_missing_project_path_is_a_config_error() {
        let result = ServerConfig::from_lookup(lookup_from(&[]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_unparseable_port_is_a_config_error() {
        let lookup = lookup_from(&[("PROJECT_PATH", "game.json"), ("PORT", "eighty")]);

        let result = ServerConfig::from_lookup(lookup);

        assert!(matches!(result, Err(AppError::Config(message)) if message.contains("PORT")));
    }
}
