//! The entity store contract shared by the HTTP layer and the CLI.

use std::fmt;

use async_trait::async_trait;
use classbook_core::AppError;
use classbook_models::{
    Classroom, ClassroomData, ClassroomId, Grade, GradeData, GradeId, MemberId, Student,
    StudentData, StudentQuery, Teacher, TeacherData, TeacherQuery, User,
};

/// Persistence for every school entity.
///
/// Each write is atomic: it either fully applies or leaves the store
/// untouched. Lookups by id return `Ok(None)` for unknown ids, while updates
/// and deletes of unknown ids fail with a 404 [`AppError`].
///
/// Implementations also enforce uniqueness (`id_doc`, classroom
/// `identifier`) and referential integrity, reporting violations as
/// field-level validation errors.
#[async_trait]
pub trait SchoolStore: Send + Sync + fmt::Debug {
    // ------------------------------------------------------------------
    // Grades
    // ------------------------------------------------------------------

    /// All Grades ordered by `rank`, then id.
    async fn list_grades(&self) -> Result<Vec<Grade>, AppError>;

    async fn get_grade(&self, id: GradeId) -> Result<Option<Grade>, AppError>;

    async fn create_grade(&self, data: GradeData) -> Result<Grade, AppError>;

    async fn update_grade(&self, id: GradeId, data: GradeData) -> Result<Grade, AppError>;

    /// Students and Classrooms referencing the Grade lose their reference.
    async fn delete_grade(&self, id: GradeId) -> Result<(), AppError>;

    async fn grade_exists(&self, id: GradeId) -> Result<bool, AppError> {
        Ok(self.get_grade(id).await?.is_some())
    }

    // ------------------------------------------------------------------
    // Classrooms
    // ------------------------------------------------------------------

    /// All Classrooms ordered by `identifier`.
    async fn list_classrooms(&self) -> Result<Vec<Classroom>, AppError>;

    async fn get_classroom(&self, id: ClassroomId) -> Result<Option<Classroom>, AppError>;

    /// The Classrooms among `ids` that exist, ordered by `identifier`.
    async fn classrooms_by_ids(&self, ids: &[ClassroomId]) -> Result<Vec<Classroom>, AppError>;

    async fn create_classroom(&self, data: ClassroomData) -> Result<Classroom, AppError>;

    async fn update_classroom(
        &self,
        id: ClassroomId,
        data: ClassroomData,
    ) -> Result<Classroom, AppError>;

    /// Removes the Classroom and every Student/Teacher association to it.
    async fn delete_classroom(&self, id: ClassroomId) -> Result<(), AppError>;

    async fn classroom_identifier_taken(
        &self,
        identifier: &str,
        except: Option<ClassroomId>,
    ) -> Result<bool, AppError>;

    /// Ids from `ids` with no matching Classroom, in the given order.
    async fn missing_classrooms(
        &self,
        ids: &[ClassroomId],
    ) -> Result<Vec<ClassroomId>, AppError> {
        let found = self.classrooms_by_ids(ids).await?;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| !found.iter().any(|classroom| classroom.id == *id))
            .collect())
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    /// Whether any Student or Teacher other than `except` holds `id_doc`.
    async fn id_doc_taken(&self, id_doc: &str, except: Option<MemberId>)
    -> Result<bool, AppError>;

    /// Students matching every constraint of `query`, ordered by
    /// `fullname`, then id.
    async fn list_students(&self, query: &StudentQuery) -> Result<Vec<Student>, AppError>;

    async fn get_student(&self, id: MemberId) -> Result<Option<Student>, AppError>;

    async fn create_student(&self, data: StudentData) -> Result<Student, AppError>;

    /// Replaces every stored field, the `classes` set included.
    async fn update_student(&self, id: MemberId, data: StudentData)
    -> Result<Student, AppError>;

    async fn list_teachers(&self, query: &TeacherQuery) -> Result<Vec<Teacher>, AppError>;

    async fn get_teacher(&self, id: MemberId) -> Result<Option<Teacher>, AppError>;

    async fn create_teacher(&self, data: TeacherData) -> Result<Teacher, AppError>;

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Deletes all school data. API users are kept.
    async fn clear_school_data(&self) -> Result<(), AppError>;
}
