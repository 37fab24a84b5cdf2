//! Storage backend configuration.
//!
//! When `DATABASE_URL` is set the API persists to PostgreSQL; otherwise it
//! falls back to a process-local in-memory store, which is what the
//! integration tests and quick local runs use.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`: PostgreSQL connection string (optional)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 5)

use std::env;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}
