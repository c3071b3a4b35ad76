use crate::auth::AuthConfig;
use crate::db::Database;
use crate::models::VisitorData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub visitors: Arc<Mutex<VisitorData>>,
    pub db: Database,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(data_path: PathBuf, visitors: VisitorData, db: Database, auth: AuthConfig) -> Self {
        Self {
            data_path,
            visitors: Arc::new(Mutex::new(visitors)),
            db,
            auth: Arc::new(auth),
        }
    }
}
