use anyhow::anyhow;
use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_db::checks::{MemberRefs, check_member_refs};
use classbook_models::{Action, MemberId, Resource, ViewMode, resolve};
use tracing::instrument;

use crate::modules::students::model::{
    Student, StudentDetailView, StudentInput, StudentListParams, StudentListView, StudentPatch,
    StudentQuery, StudentView, StudentWriteView,
};

pub struct StudentService;

fn student_not_found() -> AppError {
    AppError::not_found(anyhow!("Student not found"))
}

impl StudentService {
    async fn find(store: &dyn SchoolStore, id: MemberId) -> Result<Student, AppError> {
        store.get_student(id).await?.ok_or_else(student_not_found)
    }

    /// Shapes a Student for the given mode. Detail mode loads the Grade and
    /// Classrooms it references.
    pub async fn render(
        store: &dyn SchoolStore,
        mode: ViewMode,
        student: &Student,
    ) -> Result<StudentView, AppError> {
        let view = match mode {
            ViewMode::List => StudentView::List(StudentListView::from(student)),
            ViewMode::Detail => {
                let grade = match student.grade {
                    Some(grade_id) => store.get_grade(grade_id).await?,
                    None => None,
                };
                let classes = store.classrooms_by_ids(&student.classes).await?;
                StudentView::Detail(StudentDetailView::new(student, grade, classes))
            }
            ViewMode::Write | ViewMode::Empty => {
                StudentView::Write(StudentWriteView::from(student))
            }
        };
        Ok(view)
    }

    #[instrument(skip(store))]
    pub async fn list(
        store: &dyn SchoolStore,
        params: &StudentListParams,
    ) -> Result<Vec<StudentView>, AppError> {
        let mode = resolve(Resource::Student, Action::List)?;
        let query = StudentQuery::from_params(params);
        let students = store.list_students(&query).await?;

        let mut views = Vec::with_capacity(students.len());
        for student in &students {
            views.push(Self::render(store, mode, student).await?);
        }
        Ok(views)
    }

    #[instrument(skip(store))]
    pub async fn get(store: &dyn SchoolStore, id: MemberId) -> Result<StudentView, AppError> {
        let mode = resolve(Resource::Student, Action::Retrieve)?;
        let student = Self::find(store, id).await?;
        Self::render(store, mode, &student).await
    }

    #[instrument(skip(store, input))]
    pub async fn create(
        store: &dyn SchoolStore,
        input: StudentInput,
    ) -> Result<StudentView, AppError> {
        let mode = resolve(Resource::Student, Action::Create)?;

        let mut errors = input.check();
        let refs = MemberRefs {
            id_doc: Some(&input.member.id_doc),
            grade: input.grade,
            classes: &input.classes,
        };
        check_member_refs(store, refs, None, &mut errors).await?;
        errors.into_result()?;

        let student = store.create_student(input.into_data()?).await?;
        tracing::info!(student_id = %student.id(), "Student created");
        Self::render(store, mode, &student).await
    }

    /// Full replacement: absent optional fields fall back to their defaults
    /// and `classes` is replaced as a whole.
    #[instrument(skip(store, input))]
    pub async fn update(
        store: &dyn SchoolStore,
        id: MemberId,
        input: StudentInput,
    ) -> Result<StudentView, AppError> {
        let mode = resolve(Resource::Student, Action::Update)?;
        Self::find(store, id).await?;

        let mut errors = input.check();
        let refs = MemberRefs {
            id_doc: Some(&input.member.id_doc),
            grade: input.grade,
            classes: &input.classes,
        };
        check_member_refs(store, refs, Some(id), &mut errors).await?;
        errors.into_result()?;

        let student = store.update_student(id, input.into_data()?).await?;
        Self::render(store, mode, &student).await
    }

    #[instrument(skip(store, patch))]
    pub async fn partial_update(
        store: &dyn SchoolStore,
        id: MemberId,
        patch: StudentPatch,
    ) -> Result<StudentView, AppError> {
        let mode = resolve(Resource::Student, Action::PartialUpdate)?;
        let student = Self::find(store, id).await?;

        let mut errors = patch.check();
        let refs = MemberRefs {
            id_doc: patch.member.id_doc.as_deref(),
            grade: patch.grade.flatten(),
            classes: patch.classes.as_deref().unwrap_or_default(),
        };
        check_member_refs(store, refs, Some(id), &mut errors).await?;
        errors.into_result()?;

        let mut data = student.data();
        patch.apply(&mut data)?;
        let student = store.update_student(id, data).await?;
        Self::render(store, mode, &student).await
    }
}
