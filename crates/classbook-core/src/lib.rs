//! # Classbook Core
//!
//! Core types, errors, and utilities for the Classbook API.
//!
//! - [`errors`]: Application error type with HTTP response conversion and
//!   per-field validation messages
//! - [`password`]: Password hashing and verification for API users
//! - [`serde`]: Serde helpers for tri-state (absent / null / value) fields
//!
//! # Example
//!
//! ```ignore
//! use classbook_core::errors::{AppError, FieldErrors};
//!
//! let mut fields = FieldErrors::new();
//! fields.add("days_of_week", "Days of the week must be between 1 and 7");
//! let error: AppError = fields.into_result().unwrap_err();
//! ```

pub mod errors;
pub mod password;
pub mod serde;

// Re-export commonly used types at crate root
pub use errors::{AppError, ErrorResponse, FieldErrors};
pub use password::{hash_password, verify_password};
