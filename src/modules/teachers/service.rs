use anyhow::anyhow;
use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_models::{Action, MemberId, Resource, ViewMode, resolve};
use tracing::instrument;

use crate::modules::teachers::model::{
    Teacher, TeacherDetailView, TeacherListParams, TeacherListView, TeacherQuery, TeacherView,
};

pub struct TeacherService;

impl TeacherService {
    pub async fn render(
        store: &dyn SchoolStore,
        mode: ViewMode,
        teacher: &Teacher,
    ) -> Result<TeacherView, AppError> {
        match mode {
            ViewMode::List => Ok(TeacherView::List(TeacherListView::from(teacher))),
            ViewMode::Detail => {
                let classes = store.classrooms_by_ids(&teacher.classes).await?;
                Ok(TeacherView::Detail(TeacherDetailView::new(teacher, classes)))
            }
            ViewMode::Write | ViewMode::Empty => Err(AppError::internal(anyhow!(
                "Teachers have no {:?} shape",
                mode
            ))),
        }
    }

    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn SchoolStore,
        params: &TeacherListParams,
    ) -> Result<Vec<TeacherView>, AppError> {
        let mode = resolve(Resource::Teacher, Action::List)?;
        let query = TeacherQuery::from_params(params);
        let teachers = store.list_teachers(&query).await?;

        let mut views = Vec::with_capacity(teachers.len());
        for teacher in &teachers {
            views.push(Self::render(store, mode, teacher).await?);
        }
        Ok(views)
    }

    #[instrument(skip(store))]
    pub async fn get(store: &dyn SchoolStore, id: MemberId) -> Result<TeacherView, AppError> {
        let mode = resolve(Resource::Teacher, Action::Retrieve)?;
        let teacher = store
            .get_teacher(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Teacher not found")))?;
        Self::render(store, mode, &teacher).await
    }
}
