//! Student domain models, write payloads and response shapes.

use chrono::NaiveDate;
use classbook_core::{AppError, FieldErrors, serde::double_option};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::classrooms::Classroom;
use crate::grades::Grade;
use crate::ids::{ClassroomId, GradeId, MemberId};
use crate::members::{Member, MemberData, MemberInput, MemberPatch, MemberView, default_active};
use crate::validation::validate_not_blank;
use crate::value_types::{DecimalInput, Sex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub member: Member,
    pub grade: Option<GradeId>,
    pub guardian1: String,
    pub guardian2: String,
    pub classes: Vec<ClassroomId>,
}

impl Student {
    pub fn from_data(id: MemberId, register_date: NaiveDate, data: StudentData) -> Self {
        Self {
            member: Member::from_data(id, register_date, data.member),
            grade: data.grade,
            guardian1: data.guardian1,
            guardian2: data.guardian2,
            classes: data.classes,
        }
    }

    pub fn id(&self) -> MemberId {
        self.member.id
    }

    pub fn data(&self) -> StudentData {
        StudentData {
            member: MemberData::from(&self.member),
            grade: self.grade,
            guardian1: self.guardian1.clone(),
            guardian2: self.guardian2.clone(),
            classes: self.classes.clone(),
        }
    }
}

/// Everything a write replaces. The `classes` set is replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentData {
    pub member: MemberData,
    pub grade: Option<GradeId>,
    pub guardian1: String,
    pub guardian2: String,
    pub classes: Vec<ClassroomId>,
}

/// Body of `POST /members/students` and `PUT /members/students/{id}`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(from = "StudentBody")]
pub struct StudentInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub member: MemberInput,
    #[serde(default)]
    pub grade: Option<GradeId>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    pub guardian1: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub guardian2: String,
    #[serde(default)]
    pub classes: Vec<ClassroomId>,
}

impl StudentInput {
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from_validator(&e);
        }
        errors
    }

    pub fn into_data(self) -> Result<StudentData, AppError> {
        Ok(StudentData {
            member: self.member.into_data()?,
            grade: self.grade,
            guardian1: self.guardian1,
            guardian2: self.guardian2,
            classes: dedup_ids(self.classes),
        })
    }
}

/// Body of `PATCH /members/students/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(from = "StudentPatchBody")]
pub struct StudentPatch {
    #[serde(flatten)]
    #[validate(nested)]
    pub member: MemberPatch,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub grade: Option<Option<GradeId>>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    pub guardian1: Option<String>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub guardian2: Option<String>,
    pub classes: Option<Vec<ClassroomId>>,
}

impl StudentPatch {
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from_validator(&e);
        }
        errors
    }

    pub fn apply(self, data: &mut StudentData) -> Result<(), AppError> {
        self.member.apply(&mut data.member)?;
        if let Some(grade) = self.grade {
            data.grade = grade;
        }
        if let Some(guardian1) = self.guardian1 {
            data.guardian1 = guardian1;
        }
        if let Some(guardian2) = self.guardian2 {
            data.guardian2 = guardian2;
        }
        if let Some(classes) = self.classes {
            data.classes = dedup_ids(classes);
        }
        Ok(())
    }
}

/// Wire form of [`StudentInput`]. Every key is a direct field, so a value of
/// the wrong type is reported under its own name.
#[derive(Deserialize)]
struct StudentBody {
    fullname: String,
    id_doc: String,
    #[serde(default)]
    birthdate: Option<NaiveDate>,
    sex: String,
    monthly_payment: DecimalInput,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    departure_date: Option<NaiveDate>,
    email: String,
    phone_number: String,
    address: String,
    #[serde(default)]
    grade: Option<GradeId>,
    guardian1: String,
    #[serde(default)]
    guardian2: String,
    #[serde(default)]
    classes: Vec<ClassroomId>,
}

impl From<StudentBody> for StudentInput {
    fn from(body: StudentBody) -> Self {
        Self {
            member: MemberInput {
                fullname: body.fullname,
                id_doc: body.id_doc,
                birthdate: body.birthdate,
                sex: body.sex,
                monthly_payment: body.monthly_payment,
                active: body.active,
                departure_date: body.departure_date,
                email: body.email,
                phone_number: body.phone_number,
                address: body.address,
            },
            grade: body.grade,
            guardian1: body.guardian1,
            guardian2: body.guardian2,
            classes: body.classes,
        }
    }
}

/// Wire form of [`StudentPatch`].
#[derive(Deserialize)]
struct StudentPatchBody {
    fullname: Option<String>,
    id_doc: Option<String>,
    birthdate: Option<NaiveDate>,
    sex: Option<String>,
    monthly_payment: Option<DecimalInput>,
    active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    departure_date: Option<Option<NaiveDate>>,
    email: Option<String>,
    phone_number: Option<String>,
    address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    grade: Option<Option<GradeId>>,
    guardian1: Option<String>,
    guardian2: Option<String>,
    classes: Option<Vec<ClassroomId>>,
}

impl From<StudentPatchBody> for StudentPatch {
    fn from(body: StudentPatchBody) -> Self {
        Self {
            member: MemberPatch {
                fullname: body.fullname,
                id_doc: body.id_doc,
                birthdate: body.birthdate,
                sex: body.sex,
                monthly_payment: body.monthly_payment,
                active: body.active,
                departure_date: body.departure_date,
                email: body.email,
                phone_number: body.phone_number,
                address: body.address,
            },
            grade: body.grade,
            guardian1: body.guardian1,
            guardian2: body.guardian2,
            classes: body.classes,
        }
    }
}

/// Association sets are kept sorted and free of repeats.
pub(crate) fn dedup_ids<T: Ord>(mut ids: Vec<T>) -> Vec<T> {
    ids.sort();
    ids.dedup();
    ids
}

/// List shape: no money, dates of enrolment, guardians or classes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentListView {
    pub id: MemberId,
    pub firstname: String,
    pub fullname: String,
    pub id_doc: String,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub grade: Option<GradeId>,
}

impl From<&Student> for StudentListView {
    fn from(student: &Student) -> Self {
        let member = &student.member;
        Self {
            id: member.id,
            firstname: member.firstname().to_string(),
            fullname: member.fullname.clone(),
            id_doc: member.id_doc.clone(),
            birthdate: member.birthdate,
            sex: member.sex,
            email: member.email.clone(),
            phone_number: member.phone_number.clone(),
            address: member.address.clone(),
            grade: student.grade,
        }
    }
}

/// Detail shape: every field, with the Grade and Classrooms expanded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentDetailView {
    #[serde(flatten)]
    pub member: MemberView,
    pub grade: Option<Grade>,
    pub guardian1: String,
    pub guardian2: String,
    pub classes: Vec<Classroom>,
}

impl StudentDetailView {
    pub fn new(student: &Student, grade: Option<Grade>, classes: Vec<Classroom>) -> Self {
        Self {
            member: MemberView::from(&student.member),
            grade,
            guardian1: student.guardian1.clone(),
            guardian2: student.guardian2.clone(),
            classes,
        }
    }
}

/// Write shape returned by create and update: references stay bare ids.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentWriteView {
    #[serde(flatten)]
    pub member: MemberView,
    pub grade: Option<GradeId>,
    pub guardian1: String,
    pub guardian2: String,
    pub classes: Vec<ClassroomId>,
}

impl From<&Student> for StudentWriteView {
    fn from(student: &Student) -> Self {
        Self {
            member: MemberView::from(&student.member),
            grade: student.grade,
            guardian1: student.guardian1.clone(),
            guardian2: student.guardian2.clone(),
            classes: student.classes.clone(),
        }
    }
}

/// Any of the three Student shapes, chosen by the action being served.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum StudentView {
    List(StudentListView),
    Detail(StudentDetailView),
    Write(StudentWriteView),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::Money;
    use serde_json::json;

    fn student() -> Student {
        let data = StudentData {
            member: MemberData {
                fullname: "Bruno Lima Costa".to_string(),
                id_doc: "A-1".to_string(),
                birthdate: NaiveDate::from_ymd_opt(2012, 3, 14).unwrap(),
                sex: Sex::Male,
                monthly_payment: Money::from_cents(25_050),
                active: true,
                departure_date: None,
                email: "bruno@example.com".to_string(),
                phone_number: "555-0101".to_string(),
                address: "2 School Lane".to_string(),
            },
            grade: Some(GradeId::new(1)),
            guardian1: "Carla Costa".to_string(),
            guardian2: String::new(),
            classes: vec![ClassroomId::new(2), ClassroomId::new(4)],
        };
        Student::from_data(
            MemberId::new(10),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            data,
        )
    }

    fn input_body() -> serde_json::Value {
        json!({
            "id": 999,
            "firstname": "Forged",
            "register_date": "1999-01-01",
            "fullname": "Bruno Lima Costa",
            "id_doc": "A-1",
            "birthdate": "2012-03-14",
            "sex": "M",
            "monthly_payment": 250.5,
            "email": "bruno@example.com",
            "phone_number": "555-0101",
            "address": "2 School Lane",
            "guardian1": "Carla Costa",
            "classes": [2, 2, 3],
        })
    }

    #[test]
    fn test_list_view_fields() {
        let value = serde_json::to_value(StudentListView::from(&student())).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["firstname"], json!("Bruno"));
        assert_eq!(object["grade"], json!(1));
        for hidden in [
            "active",
            "monthly_payment",
            "register_date",
            "departure_date",
            "classes",
            "guardian1",
            "guardian2",
        ] {
            assert!(!object.contains_key(hidden), "{hidden} must not be listed");
        }
    }

    #[test]
    fn test_write_view_has_bare_ids() {
        let value = serde_json::to_value(StudentWriteView::from(&student())).unwrap();
        assert_eq!(value["classes"], json!([2, 4]));
        assert_eq!(value["grade"], json!(1));
        assert_eq!(value["monthly_payment"], json!("250.50"));
        assert_eq!(value["register_date"], json!("2024-02-01"));
        assert_eq!(value["firstname"], json!("Bruno"));
    }

    #[test]
    fn test_detail_view_nests_references() {
        let grade = Grade {
            id: GradeId::new(1),
            name: "1st".to_string(),
            rank: 1,
        };
        let view = StudentDetailView::new(&student(), Some(grade), vec![]);
        let value = serde_json::to_value(view).unwrap();
        assert_eq!(value["grade"], json!({"id": 1, "name": "1st", "rank": 1}));
        assert_eq!(value["id"], json!(10));
        assert_eq!(value["guardian2"], json!(""));
    }

    #[test]
    fn test_input_drops_server_owned_fields() {
        let input: StudentInput = serde_json::from_value(input_body()).unwrap();
        assert!(input.check().is_empty());
        let data = input.into_data().unwrap();
        assert_eq!(data.member.fullname, "Bruno Lima Costa");
        assert_eq!(data.member.monthly_payment, Money::from_cents(25_050));
        assert_eq!(data.guardian2, "");
        assert_eq!(data.grade, None);
        assert_eq!(data.classes, vec![ClassroomId::new(2), ClassroomId::new(3)]);
    }

    #[test]
    fn test_input_reports_nested_member_fields_flat() {
        let mut body = input_body();
        body["email"] = json!("not-an-email");
        body["guardian1"] = json!("");
        let input: StudentInput = serde_json::from_value(body).unwrap();
        let errors = input.check();
        assert!(errors.contains("email"));
        assert!(errors.contains("guardian1"));
    }

    #[test]
    fn test_input_member_defaults_survive_flat_body() {
        let mut body = input_body();
        body.as_object_mut().unwrap().remove("birthdate");
        let input: StudentInput = serde_json::from_value(body).unwrap();
        assert!(input.member.active);
        assert_eq!(input.member.birthdate, None);
        assert_eq!(input.member.departure_date, None);
        assert!(input.check().contains("birthdate"));

        let patch: StudentPatch = serde_json::from_value(json!({"active": false})).unwrap();
        assert_eq!(patch.member.active, Some(false));
        assert_eq!(patch.member.fullname, None);
    }

    #[test]
    fn test_patch_grade_tri_state() {
        let mut data = student().data();

        let absent: StudentPatch = serde_json::from_value(json!({"guardian2": "Dan"})).unwrap();
        absent.apply(&mut data).unwrap();
        assert_eq!(data.grade, Some(GradeId::new(1)));
        assert_eq!(data.guardian2, "Dan");

        let cleared: StudentPatch = serde_json::from_value(json!({"grade": null})).unwrap();
        cleared.apply(&mut data).unwrap();
        assert_eq!(data.grade, None);

        let set: StudentPatch = serde_json::from_value(json!({"grade": 3})).unwrap();
        set.apply(&mut data).unwrap();
        assert_eq!(data.grade, Some(GradeId::new(3)));
    }

    #[test]
    fn test_patch_replaces_classes_only_when_present() {
        let mut data = student().data();
        let patch: StudentPatch = serde_json::from_value(json!({"fullname": "Bia"})).unwrap();
        patch.apply(&mut data).unwrap();
        assert_eq!(data.classes.len(), 2);
        assert_eq!(data.member.fullname, "Bia");

        let patch: StudentPatch = serde_json::from_value(json!({"classes": []})).unwrap();
        patch.apply(&mut data).unwrap();
        assert!(data.classes.is_empty());
    }

    #[test]
    fn test_dedup_ids_sorts() {
        assert_eq!(dedup_ids(vec![3, 1, 3, 2, 1]), vec![1, 2, 3]);
    }
}
