use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use classbook_core::{AppError, ErrorResponse};
use classbook_models::GradeId;

use crate::middleware::auth::AuthUser;
use crate::modules::grades::model::{Grade, GradeInput, GradePatch};
use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::validator::{IdPath, ValidatedJson};

#[utoipa::path(
    get,
    path = "/api/grades",
    responses(
        (status = 200, description = "Grades ordered by rank", body = Vec<Grade>),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_grades(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Grade>>, AppError> {
    let grades = GradeService::list(state.store.as_ref()).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = GradeInput,
    responses(
        (status = 201, description = "Grade created", body = Grade),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn create_grade(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<GradeInput>,
) -> Result<(StatusCode, Json<Grade>), AppError> {
    let grade = GradeService::create(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[utoipa::path(
    get,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade details", body = Grade),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_grade(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<GradeId>,
) -> Result<Json<Grade>, AppError> {
    let grade = GradeService::get(state.store.as_ref(), id).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    request_body = GradeInput,
    responses(
        (status = 200, description = "Grade replaced", body = Grade),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn update_grade(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<GradeId>,
    ValidatedJson(input): ValidatedJson<GradeInput>,
) -> Result<Json<Grade>, AppError> {
    let grade = GradeService::update(state.store.as_ref(), id, input).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    patch,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    request_body = GradePatch,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn patch_grade(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<GradeId>,
    ValidatedJson(patch): ValidatedJson<GradePatch>,
) -> Result<Json<Grade>, AppError> {
    let grade = GradeService::partial_update(state.store.as_ref(), id, patch).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    params(("id" = i64, Path, description = "Grade ID")),
    responses(
        (status = 204, description = "Grade deleted; its students and classrooms are detached"),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn delete_grade(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<GradeId>,
) -> Result<StatusCode, AppError> {
    GradeService::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
