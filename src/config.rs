use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::app_dirs::AppDirs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Live stats refresh interval.
    pub tick_rate_ms: u64,
    pub leaderboard_size: usize,
    /// Races listed on the profile screen.
    pub recent_sessions: usize,
    /// Overrides the platform data location.
    pub data_file: Option<PathBuf>,
    /// Race texts, one per line, instead of the built-in set.
    pub texts_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            leaderboard_size: 10,
            recent_sessions: 10,
            data_file: None,
            texts_file: None,
        }
    }
}

impl Config {
    pub fn data_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(AppDirs::data_path)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self {
            path: AppDirs::config_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// Like `load`, but a missing file is first written out with defaults
    /// so there is something to edit.
    pub fn load_or_init(&self) -> Config {
        if self.path.exists() {
            return self.load();
        }
        let cfg = Config::default();
        match self.save(&cfg) {
            Ok(()) => info!(path = %self.path.display(), "wrote default config"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "could not write default config"),
        }
        cfg
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    /// Missing or unreadable files fall back to defaults.
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            tick_rate_ms: 250,
            leaderboard_size: 5,
            recent_sessions: 3,
            data_file: Some(PathBuf::from("/tmp/races.json")),
            texts_file: Some(PathBuf::from("/tmp/texts.txt")),
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn first_run_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);

        assert_eq!(store.load_or_init(), Config::default());
        assert!(path.exists());
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn existing_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "recent_sessions": 4 }"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load_or_init();
        assert_eq!(cfg.recent_sessions, 4);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{ "recent_sessions": 4 }"#);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "leaderboard_size": 3 }"#).unwrap();
        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.leaderboard_size, 3);
        assert_eq!(cfg.tick_rate_ms, 100);
    }

    #[test]
    fn malformed_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn data_file_overrides_platform_path() {
        let cfg = Config {
            data_file: Some(PathBuf::from("/tmp/mine.json")),
            ..Config::default()
        };
        assert_eq!(cfg.data_path(), PathBuf::from("/tmp/mine.json"));
    }
}
