//! # Classbook CLI
//!
//! Database seeding utilities for Classbook testing and development.
//!
//! This library crate provides the seeding functionality used by the CLI binary.
//! Seeded records go through the same validators and store checks as API
//! writes, so anything the seeder produces could have been submitted over HTTP.
//!
//! ## Usage
//!
//! ```ignore
//! use classbook_cli::seeder::{seed_all, SeedConfig};
//!
//! let config = SeedConfig::default().with_students(200);
//! seed_all(&store, config).await?;
//! ```

pub mod seeder;
