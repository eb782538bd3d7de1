use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::options::{PrecipitationUnit, TemperatureUnit, UnitOptions, WindspeedUnit};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const DEFAULT_USER_AGENT: &str = concat!("meteo/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub forecast: String,
    pub archive: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: DEFAULT_FORECAST_URL.to_string(),
            archive: DEFAULT_ARCHIVE_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timeout_secs = 10
/// timezone = "Europe/Berlin"
/// temperature_unit = "fahrenheit"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Override for the forecast endpoint, e.g. a self-hosted instance.
    pub forecast_url: Option<String>,
    /// Override for the historical archive endpoint.
    pub archive_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,

    pub timezone: Option<String>,
    pub temperature_unit: Option<TemperatureUnit>,
    pub windspeed_unit: Option<WindspeedUnit>,
    pub precipitation_unit: Option<PrecipitationUnit>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "open-meteo", "meteo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            forecast: self.forecast_url.clone().unwrap_or(defaults.forecast),
            archive: self.archive_url.clone().unwrap_or(defaults.archive),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// Unit defaults to seed request options with.
    pub fn unit_options(&self) -> UnitOptions {
        UnitOptions {
            temperature_unit: self.temperature_unit,
            windspeed_unit: self.windspeed_unit,
            precipitation_unit: self.precipitation_unit,
            timezone: self.timezone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_public_endpoints() {
        let cfg = Config::default();
        assert_eq!(cfg.endpoints(), Endpoints::default());
        assert_eq!(cfg.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(cfg.user_agent().starts_with("meteo/"));
        assert_eq!(cfg.unit_options(), UnitOptions::default());
    }

    #[test]
    fn overrides_take_precedence() {
        let cfg = Config::from_toml(
            r#"
            forecast_url = "http://localhost:8080/v1/forecast"
            timeout_secs = 5
            timezone = "Europe/Berlin"
            windspeed_unit = "mph"
            "#,
        )
        .expect("valid toml");

        let endpoints = cfg.endpoints();
        assert_eq!(endpoints.forecast, "http://localhost:8080/v1/forecast");
        assert_eq!(endpoints.archive, DEFAULT_ARCHIVE_URL);
        assert_eq!(cfg.timeout(), Duration::from_secs(5));

        let units = cfg.unit_options();
        assert_eq!(units.windspeed_unit, Some(WindspeedUnit::Mph));
        assert_eq!(units.timezone.as_deref(), Some("Europe/Berlin"));
    }

    #[test]
    fn unknown_unit_fails_to_parse() {
        let err = Config::from_toml(r#"temperature_unit = "kelvin""#).unwrap_err();
        assert!(format!("{err:#}").contains("Unknown temperature unit"));
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let cfg = Config {
            forecast_url: Some("http://localhost:8080/v1/forecast".into()),
            timeout_secs: Some(7),
            windspeed_unit: Some(WindspeedUnit::Kn),
            ..Default::default()
        };
        cfg.save_to(&path).expect("save");

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn load_reports_broken_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = Config {
            archive_url: Some("http://archive.local".into()),
            temperature_unit: Some(TemperatureUnit::Fahrenheit),
            precipitation_unit: Some(PrecipitationUnit::Inch),
            ..Default::default()
        };

        let text = cfg.to_toml().unwrap();
        assert!(text.contains("temperature_unit = \"fahrenheit\""));
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }
}
