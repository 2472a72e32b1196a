use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::errors::StoreError;
use crate::services::store::{ClinicStore, SqliteStore};

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub store: Box<dyn ClinicStore>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        let db = Arc::new(Mutex::new(conn));
        Self {
            store: Box::new(SqliteStore::new(Arc::clone(&db))),
            db,
            config,
        }
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.db.lock().map_err(|_| StoreError::Poisoned)
    }
}
