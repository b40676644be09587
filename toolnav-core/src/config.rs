use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "~/.config/toolnav/";
pub const DATABASE_FILE: &str = "toolnav.db";
pub const EXPORT_DIR: &str = "exports";

/// Filesystem layout of a toolnav installation: one data directory holding
/// the SQLite database and the export directory.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Build a config from a user supplied path, expanding `~`.
    pub fn from_user_path(raw: &str) -> Self {
        let expanded = shellexpand::tilde(raw);
        Self::new(PathBuf::from(expanded.as_ref()))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORT_DIR)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
