//! Student data models and DTOs.
//!
//! This module re-exports student models from the `classbook-models` crate
//! together with the list filters, which only the student endpoints accept.

pub use classbook_models::filters::{StudentListParams, StudentQuery};
pub use classbook_models::students::*;
