//! # Classbook Auth
//!
//! Authentication types and JWT utilities for the Classbook API.
//!
//! Every resource endpoint sits behind a single capability check: the caller
//! presents a valid access token or is rejected. Tokens carry no roles or
//! permissions.
//!
//! - [`claims`]: JWT claim structure for access tokens
//! - [`jwt`]: Token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use classbook_auth::{create_access_token, verify_token};
//! use classbook_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(42, "registrar@school.test", &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert_eq!(claims.sub, "42");
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
