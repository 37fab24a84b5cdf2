//! Login request and token response, re-exported from `classbook-models`.

pub use classbook_models::users::{LoginRequest, LoginResponse};
