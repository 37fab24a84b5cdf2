use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::{AppError, ErrorResponse};
use classbook_models::{Action, MemberId, Resource};

use crate::middleware::auth::AuthUser;
use crate::modules::students::model::{
    StudentDetailView, StudentInput, StudentListParams, StudentListView, StudentPatch,
    StudentView, StudentWriteView,
};
use crate::modules::students::service::StudentService;
use crate::modules::unsupported;
use crate::state::AppState;
use crate::validator::{FilterQuery, IdPath, ValidatedJson};

#[utoipa::path(
    get,
    path = "/api/members/students",
    params(StudentListParams),
    responses(
        (status = 200, description = "Students ordered by full name", body = Vec<StudentListView>),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_students(
    _auth: AuthUser,
    State(state): State<AppState>,
    FilterQuery(params): FilterQuery<StudentListParams>,
) -> Result<Json<Vec<StudentView>>, AppError> {
    let students = StudentService::list(state.store.as_ref(), &params).await?;
    Ok(Json(students))
}

#[utoipa::path(
    post,
    path = "/api/members/students",
    request_body = StudentInput,
    responses(
        (status = 201, description = "Student created", body = StudentWriteView),
        (status = 400, description = "Validation failed, duplicate id_doc or unknown grade/classes", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, input))]
pub async fn create_student(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<StudentInput>,
) -> Result<(StatusCode, Json<StudentView>), AppError> {
    let student = StudentService::create(state.store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/members/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student with Grade and Classrooms expanded", body = StudentDetailView),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_student(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<MemberId>,
) -> Result<Json<StudentView>, AppError> {
    let student = StudentService::get(state.store.as_ref(), id).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/members/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = StudentInput,
    responses(
        (status = 200, description = "Student replaced", body = StudentWriteView),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, input))]
pub async fn update_student(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<MemberId>,
    ValidatedJson(input): ValidatedJson<StudentInput>,
) -> Result<Json<StudentView>, AppError> {
    let student = StudentService::update(state.store.as_ref(), id, input).await?;
    Ok(Json(student))
}

#[utoipa::path(
    patch,
    path = "/api/members/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    request_body = StudentPatch,
    responses(
        (status = 200, description = "Student updated", body = StudentWriteView),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth, patch))]
pub async fn patch_student(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<MemberId>,
    ValidatedJson(patch): ValidatedJson<StudentPatch>,
) -> Result<Json<StudentView>, AppError> {
    let student = StudentService::partial_update(state.store.as_ref(), id, patch).await?;
    Ok(Json(student))
}

/// Students are never deleted through the API; set `active` to false instead.
#[utoipa::path(
    delete,
    path = "/api/members/students/{id}",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 405, description = "Deleting students is not allowed", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn delete_student(_auth: AuthUser) -> Result<StatusCode, AppError> {
    Err(unsupported(Resource::Student, Action::Destroy))
}
