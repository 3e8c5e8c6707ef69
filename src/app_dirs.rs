use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "flick")
    }

    /// `<config dir>/flick/config.json`
    pub fn config_path() -> Option<PathBuf> {
        Self::project().map(|pd| pd.config_dir().join("config.json"))
    }

    /// Default log file, under `$HOME/.local/state/flick` when `HOME` is set.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("flick");
            Some(state_dir.join("flick.log"))
        } else {
            Self::project().map(|pd| pd.data_local_dir().join("flick.log"))
        }
    }
}
