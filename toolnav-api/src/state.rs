use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use toolnav_core::export::ExportStore;
use toolnav_core::{AppConfig, Database};

/// Shared handler state. SQLite access is serialised through one mutex.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    pub exports: Arc<ExportStore>,
    pub dataset_root: Option<PathBuf>,
}

impl AppState {
    pub fn new(db: Database, exports: ExportStore) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            exports: Arc::new(exports),
            dataset_root: None,
        }
    }

    /// Open the database and export directory described by `config`.
    pub fn open(config: &AppConfig) -> toolnav_core::Result<Self> {
        std::fs::create_dir_all(config.data_dir())?;
        let db = Database::new(&config.db_path())?;
        let exports = ExportStore::new(&config.export_dir())?;
        Ok(Self::new(db, exports))
    }

    /// Restrict reconcile dataset paths to files under `root`.
    pub fn with_dataset_root(mut self, root: PathBuf) -> Self {
        self.dataset_root = Some(root);
        self
    }
}
