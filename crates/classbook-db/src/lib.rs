//! # Classbook DB
//!
//! Entity store for the Classbook API.
//!
//! [`SchoolStore`] is the persistence contract. Two implementations are
//! provided: [`PgStore`] over a PostgreSQL pool, and [`MemoryStore`] used
//! when no `DATABASE_URL` is configured and throughout the tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use classbook_db::{PgStore, SchoolStore, init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! run_migrations(&pool).await?;
//! let store: Arc<dyn SchoolStore> = Arc::new(PgStore::new(pool));
//! ```

pub mod checks;
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::{PgStore, init_db_pool, run_migrations};
pub use store::SchoolStore;

// Re-export PgPool for convenience
pub use sqlx::PgPool;
