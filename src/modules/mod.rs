pub mod auth;
pub mod classrooms;
pub mod grades;
pub mod students;
pub mod teachers;

use anyhow::anyhow;
use classbook_core::AppError;
use classbook_models::{Action, Resource, resolve};

/// Error for an action that is routed only so that callers are
/// authenticated before being refused.
pub(crate) fn unsupported(resource: Resource, action: Action) -> AppError {
    match resolve(resource, action) {
        Err(e) => e,
        Ok(mode) => AppError::internal(anyhow!(
            "{:?} on {:?} renders {:?} but has no handler",
            action,
            resource,
            mode
        )),
    }
}
