use std::sync::Arc;

use anyhow::Context;

use crate::config::AppConfig;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = Database::connect(&config.db_name)
            .await
            .context("open database")?;
        Ok(Self { db, config })
    }
}
