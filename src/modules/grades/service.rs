use anyhow::anyhow;
use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_models::GradeId;
use tracing::instrument;
use validator::Validate;

use crate::modules::grades::model::{Grade, GradeData, GradeInput, GradePatch};

pub struct GradeService;

fn grade_not_found() -> AppError {
    AppError::not_found(anyhow!("Grade not found"))
}

impl GradeService {
    #[instrument(skip(store))]
    pub async fn list(store: &dyn SchoolStore) -> Result<Vec<Grade>, AppError> {
        store.list_grades().await
    }

    #[instrument(skip(store))]
    pub async fn get(store: &dyn SchoolStore, id: GradeId) -> Result<Grade, AppError> {
        store.get_grade(id).await?.ok_or_else(grade_not_found)
    }

    #[instrument(skip(store))]
    pub async fn create(store: &dyn SchoolStore, input: GradeInput) -> Result<Grade, AppError> {
        input.validate().map_err(|e| AppError::from_validation(&e))?;
        store.create_grade(input.into_data()).await
    }

    #[instrument(skip(store))]
    pub async fn update(
        store: &dyn SchoolStore,
        id: GradeId,
        input: GradeInput,
    ) -> Result<Grade, AppError> {
        Self::get(store, id).await?;
        input.validate().map_err(|e| AppError::from_validation(&e))?;
        store.update_grade(id, input.into_data()).await
    }

    #[instrument(skip(store))]
    pub async fn partial_update(
        store: &dyn SchoolStore,
        id: GradeId,
        patch: GradePatch,
    ) -> Result<Grade, AppError> {
        let grade = Self::get(store, id).await?;
        patch.validate().map_err(|e| AppError::from_validation(&e))?;

        let mut data = GradeData::from(&grade);
        patch.apply(&mut data);
        store.update_grade(id, data).await
    }

    /// Students and Classrooms of the Grade are kept, without a Grade.
    #[instrument(skip(store))]
    pub async fn delete(store: &dyn SchoolStore, id: GradeId) -> Result<(), AppError> {
        store.delete_grade(id).await
    }
}
