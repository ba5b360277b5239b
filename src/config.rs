//! Application-level configuration: session timings and join constraints.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LIVE_QUIZ_BACK_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Seconds counted down before question 1.
    pub countdown_secs: u32,
    /// How long the ready barrier waits before releasing on its own.
    pub ready_barrier_timeout: Duration,
    /// Width of the numeric join PIN.
    pub pin_length: u32,
    /// Maximum trimmed player name length.
    pub max_player_name_len: usize,
    /// Capacity of each game's broadcast topic.
    pub channel_capacity: usize,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration from file");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 3,
            ready_barrier_timeout: Duration::from_secs(10),
            pin_length: 6,
            max_player_name_len: 24,
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file.
struct RawConfig {
    countdown_secs: Option<u32>,
    ready_barrier_timeout_secs: Option<u64>,
    pin_length: Option<u32>,
    max_player_name_len: Option<usize>,
    channel_capacity: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            countdown_secs: raw.countdown_secs.unwrap_or(defaults.countdown_secs),
            ready_barrier_timeout: raw
                .ready_barrier_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.ready_barrier_timeout),
            pin_length: raw.pin_length.unwrap_or(defaults.pin_length),
            max_player_name_len: raw
                .max_player_name_len
                .unwrap_or(defaults.max_player_name_len),
            channel_capacity: raw.channel_capacity.unwrap_or(defaults.channel_capacity),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_session_contract() {
        let config = AppConfig::default();
        assert_eq!(config.countdown_secs, 3);
        assert_eq!(config.ready_barrier_timeout, Duration::from_secs(10));
        assert_eq!(config.pin_length, 6);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let raw: RawConfig = serde_json::from_str(r#"{"pin_length": 4}"#).unwrap();
        let config: AppConfig = raw.into();
        assert_eq!(config.pin_length, 4);
        assert_eq!(config.countdown_secs, 3);
    }
}
