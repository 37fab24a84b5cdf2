//! Request extractors that turn malformed input into the API's error shape.

use std::convert::Infallible;
use std::str::FromStr;

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use classbook_core::{AppError, FieldErrors};
use classbook_models::validation::REQUIRED_MESSAGE;

pub const NOT_FOUND_MESSAGE: &str = "Not found.";

/// Maps a serde failure such as ``missing field `fullname` `` or
/// `rank: invalid type: string "x", expected i32` to a field error.
fn field_errors_from(body_text: &str) -> Option<FieldErrors> {
    let detail = body_text
        .split_once("target type: ")
        .map_or(body_text, |(_, detail)| detail);
    let detail = detail
        .rsplit_once(" at line ")
        .map_or(detail, |(detail, _)| detail);

    let mut fields = FieldErrors::new();
    if let Some((_, rest)) = detail.split_once("missing field `") {
        let field = rest.split('`').next().unwrap_or(rest);
        fields.add(field, REQUIRED_MESSAGE);
        return Some(fields);
    }

    let (path, message) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path != "."
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    if !is_path {
        return None;
    }
    let field = path.split(['.', '[']).next().unwrap_or(path);
    fields.add(field, message);
    Some(fields)
}

fn body_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            AppError::bad_request(anyhow!("Missing 'Content-Type: application/json' header"))
        }
        JsonRejection::JsonSyntaxError(_) => AppError::bad_request(anyhow!("Malformed JSON body")),
        JsonRejection::JsonDataError(err) => match field_errors_from(&err.body_text()) {
            Some(fields) => AppError::validation(fields),
            None => AppError::bad_request(anyhow!("Invalid request body")),
        },
        other => AppError::bad_request(anyhow!("{}", other.body_text())),
    }
}

/// JSON body whose syntax and shape errors become 400 responses. Field
/// validators run in the services, next to the checks that need the store,
/// so that every failing field is reported together.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(body_error)?;

        Ok(ValidatedJson(value))
    }
}

/// Id path segment. Anything that does not parse as `T` cannot name a record,
/// so it is a 404 rather than a 400.
#[derive(Debug, Clone, Copy)]
pub struct IdPath<T>(pub T);

impl<T, S> FromRequestParts<S> for IdPath<T>
where
    T: FromStr + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found(anyhow!(NOT_FOUND_MESSAGE)))?;

        raw.parse()
            .map(IdPath)
            .map_err(|_| AppError::not_found(anyhow!(NOT_FOUND_MESSAGE)))
    }
}

/// Query-string parameters for list filters. A repeated key keeps its last
/// value and anything that does not fit `T` yields `T::default()`, so a
/// filter can narrow a list but never fail the request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterQuery<T>(pub T);

fn last_values(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in pairs {
        params.insert(key, Value::String(value));
    }
    params
}

impl<T, S> FromRequestParts<S> for FilterQuery<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();

        let params = serde_json::from_value(Value::Object(last_values(pairs))).unwrap_or_default();
        Ok(FilterQuery(params))
    }
}
