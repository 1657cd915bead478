use crate::config::AppConfig;
use crate::db::RegistrarDb;

/// State shared by every request handler.
pub struct AppState {
    /// The registrar store.
    pub db: RegistrarDb,
    /// Server configuration; the identity middleware reads the header and login URL from here.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: RegistrarDb, config: AppConfig) -> Self {
        Self { db, config }
    }
}
