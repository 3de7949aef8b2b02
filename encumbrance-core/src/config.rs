//! Runtime configuration.

use crate::store::default_data_dir;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the data directory.
pub const ENV_DATA_DIR: &str = "ENCUMBRANCE_DATA_DIR";

/// Environment variable with the auto-save interval in seconds.
pub const ENV_AUTOSAVE_SECS: &str = "ENCUMBRANCE_AUTOSAVE_SECS";

/// Default auto-save interval.
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for a session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where `storage.json` and exports live.
    pub data_dir: PathBuf,

    /// How often the session snapshot is written.
    pub autosave_interval: Duration,

    /// Restore the last session snapshot on start.
    pub restore_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().unwrap_or_else(|| PathBuf::from("encumbrance-data")),
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            restore_on_start: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `ENCUMBRANCE_*` environment variables.
    ///
    /// An unparseable interval is ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        if let Ok(secs) = std::env::var(ENV_AUTOSAVE_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config.autosave_interval = Duration::from_secs(secs),
                Err(e) => tracing::warn!("Ignoring {ENV_AUTOSAVE_SECS}={secs:?}: {e}"),
            }
        }

        config
    }

    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the auto-save interval. Zero disables auto-save.
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    /// Set whether the last session is restored on start.
    pub fn with_restore_on_start(mut self, restore: bool) -> Self {
        self.restore_on_start = restore;
        self
    }

    /// Directory exports are written to by default.
    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_data_dir("/tmp/enc")
            .with_autosave_interval(Duration::from_secs(30))
            .with_restore_on_start(false);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/enc"));
        assert_eq!(config.autosave_interval, Duration::from_secs(30));
        assert!(!config.restore_on_start);
        assert_eq!(config.exports_dir(), PathBuf::from("/tmp/enc/exports"));
    }

    #[test]
    fn test_default_interval_is_ten_seconds() {
        let config = Config::default();
        assert_eq!(config.autosave_interval, Duration::from_secs(10));
        assert!(config.restore_on_start);
    }
}
