use anyhow::anyhow;
use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_db::checks::check_classroom_fields;
use classbook_models::ClassroomId;
use tracing::instrument;

use crate::modules::classrooms::model::{
    Classroom, ClassroomData, ClassroomDetailView, ClassroomInput, ClassroomPatch,
};

pub struct ClassroomService;

fn classroom_not_found() -> AppError {
    AppError::not_found(anyhow!("Classroom not found"))
}

impl ClassroomService {
    #[instrument(skip(store))]
    pub async fn list(store: &dyn SchoolStore) -> Result<Vec<Classroom>, AppError> {
        store.list_classrooms().await
    }

    async fn find(store: &dyn SchoolStore, id: ClassroomId) -> Result<Classroom, AppError> {
        store.get_classroom(id).await?.ok_or_else(classroom_not_found)
    }

    /// Detail shape, with the Grade expanded.
    #[instrument(skip(store))]
    pub async fn get(
        store: &dyn SchoolStore,
        id: ClassroomId,
    ) -> Result<ClassroomDetailView, AppError> {
        let classroom = Self::find(store, id).await?;
        let grade = match classroom.grade {
            Some(grade_id) => store.get_grade(grade_id).await?,
            None => None,
        };
        Ok(ClassroomDetailView::new(classroom, grade))
    }

    #[instrument(skip(store))]
    pub async fn create(
        store: &dyn SchoolStore,
        input: ClassroomInput,
    ) -> Result<Classroom, AppError> {
        let mut errors = input.check();
        check_classroom_fields(store, Some(&input.identifier), input.grade, None, &mut errors)
            .await?;
        errors.into_result()?;

        store.create_classroom(input.into_data()?).await
    }

    #[instrument(skip(store))]
    pub async fn update(
        store: &dyn SchoolStore,
        id: ClassroomId,
        input: ClassroomInput,
    ) -> Result<Classroom, AppError> {
        Self::find(store, id).await?;

        let mut errors = input.check();
        check_classroom_fields(
            store,
            Some(&input.identifier),
            input.grade,
            Some(id),
            &mut errors,
        )
        .await?;
        errors.into_result()?;

        store.update_classroom(id, input.into_data()?).await
    }

    #[instrument(skip(store))]
    pub async fn partial_update(
        store: &dyn SchoolStore,
        id: ClassroomId,
        patch: ClassroomPatch,
    ) -> Result<Classroom, AppError> {
        let classroom = Self::find(store, id).await?;

        let mut errors = patch.check();
        check_classroom_fields(
            store,
            patch.identifier.as_deref(),
            patch.grade.flatten(),
            Some(id),
            &mut errors,
        )
        .await?;
        errors.into_result()?;

        let mut data = ClassroomData::from(&classroom);
        patch.apply(&mut data)?;
        store.update_classroom(id, data).await
    }

    /// Students and Teachers lose the Classroom from their `classes`.
    #[instrument(skip(store))]
    pub async fn delete(store: &dyn SchoolStore, id: ClassroomId) -> Result<(), AppError> {
        store.delete_classroom(id).await
    }
}
