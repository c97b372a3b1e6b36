use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::alerts::model::CategorySelection;
use super::fetch::DEFAULT_FEED_URL;
use super::session::SESSION_SECS;

/// Application settings, persisted as settings.json in the app config dir.
/// Runtime alert state (seen cache, history, active alert) is never saved.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub feed_url: String,
    pub poll_interval_secs: u64,
    pub alert_dwell_secs: u64,
    pub session_secs: u32,
    /// Selection restored on startup; live toggles keep this in sync.
    #[serde(default)]
    pub selection: CategorySelection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            poll_interval_secs: 5,
            alert_dwell_secs: 15,
            session_secs: SESSION_SECS,
            selection: CategorySelection::default(),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            if let Ok(content) = fs::read_to_string(&self.config_path) {
                if let Ok(settings) = serde_json::from_str(&content) {
                    return settings;
                }
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alerts::model::ImplingKind;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let settings = manager.load();
        assert_eq!(settings.poll_interval_secs, 5);
        assert_eq!(settings.alert_dwell_secs, 15);
        assert_eq!(settings.session_secs, 3600);
        assert!(settings.selection.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.poll_interval_secs = 10;
        settings.selection.toggle(ImplingKind::Crystal);

        manager.save(&settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded.poll_interval_secs, 10);
        assert!(loaded.selection.is_enabled(ImplingKind::Crystal));
        assert!(!loaded.selection.is_enabled(ImplingKind::Lucky));
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(dir.path().join("settings.json"), "not json").unwrap();

        let settings = manager.load();
        assert_eq!(settings.feed_url, DEFAULT_FEED_URL);
    }
}
