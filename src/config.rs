//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the coast-treks.toml file.
//! It configures the NOAA station, the reference location used for sunrise and sunset,
//! the tide cache, and the defaults applied to route requests.

use crate::error::{Result, TrekError};
use crate::solar::Observer;
use chrono_tz::Tz;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "coast-treks.toml";

/// Application configuration loaded from coast-treks.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// NOAA station configuration
    pub station: StationConfig,
    /// Reference location for daylight computation
    pub location: LocationConfig,
    /// Tide cache configuration
    pub cache: CacheConfig,
    /// Defaults for route and leg requests
    pub defaults: DefaultsConfig,
}

/// NOAA tide station configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StationConfig {
    /// NOAA station ID ("9442396" is La Push, WA)
    pub id: String,
    /// Human-readable station name for reference
    pub name: String,
    /// Data API endpoint
    pub base_url: String,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Location whose sunrise and sunset decide which samples are daylight
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LocationConfig {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// IANA zone name, e.g. "America/Los_Angeles"
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Cache directory; `~/.tide-cache` when unset
    pub dir: Option<PathBuf>,
    /// Entry lifetime in hours
    pub ttl_hours: u64,
}

/// Values used when a request leaves them out
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DefaultsConfig {
    pub min_daily_distance: f64,
    pub max_daily_distance: f64,
    /// Walking speed in miles per hour
    pub speed: f64,
    /// Safety margin below each restriction height, in feet
    pub min_buffer: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            station: StationConfig {
                id: "9442396".to_string(),
                name: "La Push, WA".to_string(),
                base_url: "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter".to_string(),
                timeout_secs: 30,
            },
            location: LocationConfig {
                name: "La Push".to_string(),
                latitude: 47.9053,
                longitude: -124.626,
                timezone: "America/Los_Angeles".to_string(),
            },
            cache: CacheConfig {
                dir: None,
                ttl_hours: 24,
            },
            defaults: DefaultsConfig {
                min_daily_distance: 3.0,
                max_daily_distance: 10.0,
                speed: 1.0,
                min_buffer: 2.0,
            },
        }
    }
}

impl Config {
    /// Load configuration from coast-treks.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("Loaded configuration for station: {}", config.station.name);
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format: {}", e);
                    warn!("Using default configuration (La Push, WA)");
                    Self::default()
                }
            },
            Err(_) => {
                info!(
                    "No config file at {}, using default configuration (La Push, WA)",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Build the daylight observer from the location section.
    pub fn observer(&self) -> Result<Observer> {
        let timezone: Tz = self.location.timezone.parse().map_err(|_| {
            TrekError::invalid(format!("unknown timezone '{}'", self.location.timezone))
        })?;
        Ok(Observer {
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            timezone,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_hours.saturating_mul(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.station.id, "9442396");
        assert_eq!(config.station.name, "La Push, WA");
        assert_eq!(config.cache.ttl_hours, 24);
        assert_eq!(config.defaults.min_daily_distance, 3.0);
        assert_eq!(config.defaults.max_daily_distance, 10.0);
        assert_eq!(config.cache_ttl(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let config = Config::load_from_path("/nonexistent/path");
        // Should fallback to default
        assert_eq!(config.station.id, "9442396");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.defaults.speed = 1.5;
        config.cache.dir = Some(dir.path().join("cache"));
        config.save_to_path(&path).unwrap();

        assert_eq!(Config::load_from_path(&path), config);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "station = 12").unwrap();
        assert_eq!(Config::load_from_path(&path), Config::default());
    }

    #[test]
    fn test_observer_timezone() {
        let observer = Config::default().observer().unwrap();
        assert_eq!(observer.timezone, chrono_tz::America::Los_Angeles);

        let mut config = Config::default();
        config.location.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.observer().unwrap_err().is_invalid_input());
    }
}
