//! Where Verse Studio keeps its files.
//!
//! `settings.toml` and the command history sit in the platform config
//! directory under `verse-studio/`.  Downloaded audio goes to the user's
//! download folder, or `<local data>/verse-studio/` when the platform has
//! none.  Any directory the platform cannot provide falls back to `.`.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Line-editor history of the interactive session.
    pub history_file: PathBuf,
    /// Default target for `download`.
    pub download_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "verse-studio";

    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let download_dir = dirs::download_dir().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(Self::APP_NAME)
        });

        Self {
            settings_file: config_dir.join("settings.toml"),
            history_file: config_dir.join("history.txt"),
            config_dir,
            download_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
