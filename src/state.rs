use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::store::{postgres::PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Connects to Postgres. Returns the pool too so the caller can migrate.
    pub async fn init() -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(config.database.connect_options()?)
            .await
            .context("connect to database")?;

        let store = Arc::new(PgStore::new(db.clone())) as Arc<dyn Store>;
        Ok((Self::from_parts(config, store), db))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Self {
        Self { config, store }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{DatabaseConfig, JwtConfig};
        use crate::store::memory::MemoryStore;

        let config = Arc::new(AppConfig {
            database: DatabaseConfig {
                url: None,
                host: "localhost".into(),
                port: 5432,
                username: "postgres".into(),
                password: String::new(),
                name: "zakfit_test".into(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test".into(),
            },
        });

        Self::from_parts(config, Arc::new(MemoryStore::new()))
    }
}
