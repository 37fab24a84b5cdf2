use std::sync::Arc;

use classbook_config::{CorsConfig, DatabaseConfig, JwtConfig};
use classbook_core::AppError;
use classbook_db::{MemoryStore, PgStore, SchoolStore, init_db_pool, run_migrations};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<dyn SchoolStore>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SchoolStore>,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            store,
            jwt_config,
            cors_config,
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(jwt_config: JwtConfig) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            jwt_config,
            CorsConfig::default(),
        )
    }
}

/// Picks the store from `DATABASE_URL`, applying pending migrations when it
/// is PostgreSQL.
pub async fn init_store(config: &DatabaseConfig) -> Result<Arc<dyn SchoolStore>, AppError> {
    if config.url.is_none() {
        warn!("DATABASE_URL is not set; data is kept in memory and lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = init_db_pool(config).await?;
    run_migrations(&pool).await?;
    info!("Connected to PostgreSQL and applied migrations");
    Ok(Arc::new(PgStore::new(pool)))
}

pub async fn init_app_state() -> Result<AppState, AppError> {
    let store = init_store(&DatabaseConfig::from_env()).await?;
    Ok(AppState::new(
        store,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
