//! Classroom models re-exported from the shared `classbook-models` crate.

pub use classbook_models::classrooms::*;
