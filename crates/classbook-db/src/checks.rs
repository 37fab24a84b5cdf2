//! Store-dependent validation run before every write.
//!
//! The derive-based validators on the write payloads cover single fields.
//! Uniqueness and references need the store, so they live here, shared by the
//! HTTP services and the seeder. Stores enforce the same rules again at write
//! time so that concurrent writers cannot slip past these checks.

use classbook_core::{AppError, FieldErrors};
use classbook_models::{ClassroomId, GradeId, MemberId};

use crate::store::SchoolStore;

pub const ID_DOC_TAKEN: &str = "member with this id doc already exists.";
pub const IDENTIFIER_TAKEN: &str = "classroom with this identifier already exists.";
pub const EMAIL_TAKEN: &str = "user with this email already exists.";

pub fn invalid_pk(id: impl std::fmt::Display) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", id)
}

pub async fn check_id_doc(
    store: &dyn SchoolStore,
    id_doc: &str,
    except: Option<MemberId>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if store.id_doc_taken(id_doc, except).await? {
        errors.add("id_doc", ID_DOC_TAKEN);
    }
    Ok(())
}

pub async fn check_grade_ref(
    store: &dyn SchoolStore,
    grade: Option<GradeId>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if let Some(grade) = grade
        && !store.grade_exists(grade).await?
    {
        errors.add("grade", invalid_pk(grade));
    }
    Ok(())
}

pub async fn check_classroom_refs(
    store: &dyn SchoolStore,
    classes: &[ClassroomId],
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if classes.is_empty() {
        return Ok(());
    }
    for missing in store.missing_classrooms(classes).await? {
        errors.add("classes", invalid_pk(missing));
    }
    Ok(())
}

/// The store-checked fields of a Student or Teacher write. For partial
/// updates only the fields present in the payload are filled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemberRefs<'a> {
    pub id_doc: Option<&'a str>,
    pub grade: Option<GradeId>,
    pub classes: &'a [ClassroomId],
}

/// Records uniqueness and reference failures in `errors`.
pub async fn check_member_refs(
    store: &dyn SchoolStore,
    refs: MemberRefs<'_>,
    except: Option<MemberId>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if let Some(id_doc) = refs.id_doc {
        check_id_doc(store, id_doc, except, errors).await?;
    }
    check_grade_ref(store, refs.grade, errors).await?;
    check_classroom_refs(store, refs.classes, errors).await
}

pub async fn check_classroom_fields(
    store: &dyn SchoolStore,
    identifier: Option<&str>,
    grade: Option<GradeId>,
    except: Option<ClassroomId>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if let Some(identifier) = identifier
        && store.classroom_identifier_taken(identifier, except).await?
    {
        errors.add("identifier", IDENTIFIER_TAKEN);
    }
    check_grade_ref(store, grade, errors).await
}
