use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
    pub matching: MatchingSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    pub redis_url: Option<String>,
    pub ttl_secs: Option<u64>,
    pub l1_cache_size: Option<u64>,
}

/// Which clock defines "today" for the daily quotas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayBoundary {
    #[default]
    Utc,
    /// Midnight in the server's local zone.
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_daily_like_limit")]
    pub daily_like_limit: u32,
    #[serde(default = "default_daily_pass_limit")]
    pub daily_pass_limit: u32,
    #[serde(default)]
    pub unlimited_likes: bool,
    #[serde(default)]
    pub unlimited_passes: bool,
    #[serde(default = "default_undo_window_secs")]
    pub undo_window_secs: i64,
    #[serde(default)]
    pub day_boundary: DayBoundary,
    #[serde(default = "default_candidate_limit")]
    pub default_candidate_limit: usize,
    #[serde(default = "default_max_candidate_limit")]
    pub max_candidate_limit: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_pick_view_retention_days")]
    pub pick_view_retention_days: u32,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            daily_like_limit: default_daily_like_limit(),
            daily_pass_limit: default_daily_pass_limit(),
            unlimited_likes: false,
            unlimited_passes: false,
            undo_window_secs: default_undo_window_secs(),
            day_boundary: DayBoundary::Utc,
            default_candidate_limit: default_candidate_limit(),
            max_candidate_limit: default_max_candidate_limit(),
            sweep_interval_secs: default_sweep_interval_secs(),
            pick_view_retention_days: default_pick_view_retention_days(),
        }
    }
}

fn default_daily_like_limit() -> u32 { 20 }
fn default_daily_pass_limit() -> u32 { 100 }
fn default_undo_window_secs() -> i64 { 10 }
fn default_candidate_limit() -> usize { 20 }
fn default_max_candidate_limit() -> usize { 100 }
fn default_sweep_interval_secs() -> u64 { 30 }
fn default_pick_view_retention_days() -> u32 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml, then config/local.toml)
    /// 3. Environment variables (prefixed with EMBER_)
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local config file (for development overrides)
            .add_source(File::with_name("config/local").required(false))
            // e.g. EMBER_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("EMBER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        // DATABASE_URL is the conventional deploy-time override.
        if let Ok(url) = std::env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("EMBER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_defaults() {
        let m = MatchingSettings::default();
        assert_eq!(m.daily_like_limit, 20);
        assert_eq!(m.daily_pass_limit, 100);
        assert_eq!(m.undo_window_secs, 10);
        assert_eq!(m.day_boundary, DayBoundary::Utc);
        assert!(!m.unlimited_likes);
    }

    #[test]
    fn logging_defaults() {
        assert_eq!(default_log_level(), "info");
        assert_eq!(default_log_format(), "json");
    }
}
