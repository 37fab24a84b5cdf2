//! Teacher models re-exported from the shared `classbook-models` crate.

pub use classbook_models::filters::{TeacherListParams, TeacherQuery};
pub use classbook_models::teachers::*;
