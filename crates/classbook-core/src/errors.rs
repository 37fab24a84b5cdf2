//! Application error type shared by every layer of the API.
//!
//! [`AppError`] pairs an HTTP status with an [`anyhow::Error`] and, for
//! validation failures, a map of offending fields to human-readable reasons.
//! Services return it directly and handlers propagate it with `?`.

use std::collections::BTreeMap;

use anyhow::{Error, anyhow};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Body returned for every non-2xx response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow!(message.into()))
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            anyhow!("Method \"{}\" not allowed.", method),
        )
    }

    /// A 400 carrying one or more field-level reasons.
    pub fn validation(fields: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow!("Validation failed"),
            fields: Some(fields.0),
        }
    }

    /// Shorthand for a validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.add(field, message);
        Self::validation(fields)
    }

    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        fields.extend_from_validator(errors);
        Self::validation(fields)
    }

    pub fn is_validation(&self) -> bool {
        self.fields.is_some()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(error = %self.error, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            fields: self.fields,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Accumulates per-field validation messages so every failing field of a
/// record is reported at once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Merges the output of a `validator` derive. Nested structs are
    /// flattened into the parent's namespace since the wire shape is flat.
    pub fn extend_from_validator(&mut self, errors: &ValidationErrors) {
        for (field, kind) in errors.errors() {
            match kind {
                ValidationErrorsKind::Field(errs) => {
                    for err in errs {
                        let message = err
                            .message
                            .as_ref()
                            .map(|msg| msg.to_string())
                            .unwrap_or_else(|| default_message(field, &err.code));
                        self.add(field, message);
                    }
                }
                ValidationErrorsKind::Struct(inner) => self.extend_from_validator(inner),
                ValidationErrorsKind::List(items) => {
                    for inner in items.values() {
                        self.extend_from_validator(inner);
                    }
                }
            }
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self))
        }
    }
}

fn default_message(field: &str, code: &str) -> String {
    match code {
        "email" => "Enter a valid email address.".to_string(),
        "length" => format!("Ensure {} has a valid length.", field),
        "range" => format!("Ensure {} is within the allowed range.", field),
        _ => format!("{} is invalid", field),
    }
}
