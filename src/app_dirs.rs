use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typing-racer";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    /// Store file holding players and races.
    pub fn data_path() -> PathBuf {
        Self::project()
            .map(|dirs| dirs.data_local_dir().join("store.json"))
            .unwrap_or_else(|| PathBuf::from("typing_racer_store.json"))
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|dirs| dirs.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typing_racer_config.json"))
    }

    /// Log file, kept next to the store it describes.
    pub fn log_path_for(data_path: &std::path::Path) -> PathBuf {
        data_path.with_file_name(format!("{APP_NAME}.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn log_sits_beside_the_store() {
        let log = AppDirs::log_path_for(Path::new("/tmp/racer/store.json"));
        assert_eq!(log, Path::new("/tmp/racer/typing-racer.log"));
    }

    #[test]
    fn paths_have_expected_names() {
        assert!(AppDirs::data_path().to_string_lossy().ends_with("store.json"));
        assert!(AppDirs::config_path().to_string_lossy().ends_with("config.json"));
    }
}
