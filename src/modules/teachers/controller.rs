use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use tracing::instrument;

use classbook_core::{AppError, ErrorResponse};
use classbook_models::{Action, MemberId, Resource};

use crate::middleware::auth::AuthUser;
use crate::modules::teachers::model::{
    TeacherDetailView, TeacherListParams, TeacherListView, TeacherView,
};
use crate::modules::teachers::service::TeacherService;
use crate::modules::unsupported;
use crate::state::AppState;
use crate::validator::{FilterQuery, IdPath};

#[utoipa::path(
    get,
    path = "/api/members/teachers",
    params(TeacherListParams),
    responses(
        (status = 200, description = "Teachers ordered by full name", body = Vec<TeacherListView>),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_teachers(
    _auth: AuthUser,
    State(state): State<AppState>,
    FilterQuery(params): FilterQuery<TeacherListParams>,
) -> Result<Json<Vec<TeacherView>>, AppError> {
    let teachers = TeacherService::list(state.store.as_ref(), &params).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    get,
    path = "/api/members/teachers/{id}",
    params(("id" = i64, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher with Classrooms expanded", body = TeacherDetailView),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth))]
pub async fn get_teacher(
    _auth: AuthUser,
    State(state): State<AppState>,
    IdPath(id): IdPath<MemberId>,
) -> Result<Json<TeacherView>, AppError> {
    let teacher = TeacherService::get(state.store.as_ref(), id).await?;
    Ok(Json(teacher))
}

#[instrument(skip_all)]
pub async fn create_teacher(_auth: AuthUser) -> Result<StatusCode, AppError> {
    Err(unsupported(Resource::Teacher, Action::Create))
}

#[instrument(skip_all)]
pub async fn update_teacher(_auth: AuthUser) -> Result<StatusCode, AppError> {
    Err(unsupported(Resource::Teacher, Action::Update))
}

#[instrument(skip_all)]
pub async fn patch_teacher(_auth: AuthUser) -> Result<StatusCode, AppError> {
    Err(unsupported(Resource::Teacher, Action::PartialUpdate))
}

#[instrument(skip_all)]
pub async fn delete_teacher(_auth: AuthUser) -> Result<StatusCode, AppError> {
    Err(unsupported(Resource::Teacher, Action::Destroy))
}
