use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use classbook_core::{AppError, ErrorResponse};
use classbook_models::ClassroomId;

use crate::middleware::auth::AuthUser;
use crate::modules::classrooms::model::{
    Classroom, ClassroomDetailView, ClassroomInput, ClassroomPatch,
};
use crate::modules::classrooms::service::ClassroomService;
use crate::state::AppState;
use crate::validator::{IdPath, ValidatedJson};

#[utoipa::path(
    get,
    path = "/api/classrooms",
    responses(
        (status = 200, description = "Classrooms ordered by identifier", body = Vec<Classroom>),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_classrooms(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Classroom>>, AppError> {
    let classrooms = ClassroomService::list(state.store.as_ref()).await?;
    Ok(Json(classrooms))
}

#[utoipa::path(
    post,
    path = "/api/classrooms",
    request_body = ClassroomInput,
    responses(
        (status = 201, description = "Classroom created", body = Classroom),
        (status = 400, description = "Validation failed, duplicate identifier or unknown grade", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn create_classroom(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ClassroomInput>,
) -> Result<(StatusCode, Json<Classroom>), AppError> {
    let classroom = ClassroomService::create(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/api/classrooms/{id}",
    params(("id" = i64, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom with its Grade expanded", body = ClassroomDetailView),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_classroom(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<ClassroomId>,
) -> Result<Json<ClassroomDetailView>, AppError> {
    let classroom = ClassroomService::get(state.store.as_ref(), id).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    put,
    path = "/api/classrooms/{id}",
    params(("id" = i64, Path, description = "Classroom ID")),
    request_body = ClassroomInput,
    responses(
        (status = 200, description = "Classroom replaced", body = Classroom),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn update_classroom(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<ClassroomId>,
    ValidatedJson(input): ValidatedJson<ClassroomInput>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::update(state.store.as_ref(), id, input).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    patch,
    path = "/api/classrooms/{id}",
    params(("id" = i64, Path, description = "Classroom ID")),
    request_body = ClassroomPatch,
    responses(
        (status = 200, description = "Classroom updated", body = Classroom),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn patch_classroom(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<ClassroomId>,
    ValidatedJson(patch): ValidatedJson<ClassroomPatch>,
) -> Result<Json<Classroom>, AppError> {
    let classroom = ClassroomService::partial_update(state.store.as_ref(), id, patch).await?;
    Ok(Json(classroom))
}

#[utoipa::path(
    delete,
    path = "/api/classrooms/{id}",
    params(("id" = i64, Path, description = "Classroom ID")),
    responses(
        (status = 204, description = "Classroom deleted and removed from every member's classes"),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Classroom not found", body = ErrorResponse)
    ),
    tag = "Classrooms",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn delete_classroom(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<ClassroomId>,
) -> Result<StatusCode, AppError> {
    ClassroomService::delete(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
