//! Teacher domain models and response shapes.
//!
//! Teachers are read-only over HTTP. [`TeacherInput`] exists for seeding and
//! administrative tooling, which still go through the same validators.

use chrono::NaiveDate;
use classbook_core::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::classrooms::Classroom;
use crate::ids::{ClassroomId, MemberId};
use crate::members::{Member, MemberData, MemberInput, MemberView, parse_field};
use crate::students::dedup_ids;
use crate::validation::validate_academic_level;
use crate::value_types::{AcademicLevel, Sex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub member: Member,
    pub academic_level: AcademicLevel,
    pub bank_agency: i64,
    pub bank_account: i64,
    pub classes: Vec<ClassroomId>,
}

impl Teacher {
    pub fn from_data(id: MemberId, register_date: NaiveDate, data: TeacherData) -> Self {
        Self {
            member: Member::from_data(id, register_date, data.member),
            academic_level: data.academic_level,
            bank_agency: data.bank_agency,
            bank_account: data.bank_account,
            classes: data.classes,
        }
    }

    pub fn id(&self) -> MemberId {
        self.member.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherData {
    pub member: MemberData,
    pub academic_level: AcademicLevel,
    pub bank_agency: i64,
    pub bank_account: i64,
    pub classes: Vec<ClassroomId>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TeacherInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub member: MemberInput,
    #[validate(custom(function = "validate_academic_level"))]
    #[schema(example = "Ms")]
    pub academic_level: String,
    #[validate(range(
        min = 0,
        max = 2147483647,
        message = "Ensure this value is between 0 and 2147483647."
    ))]
    pub bank_agency: i64,
    #[validate(range(
        min = 0,
        max = 2147483647,
        message = "Ensure this value is between 0 and 2147483647."
    ))]
    pub bank_account: i64,
    #[serde(default)]
    pub classes: Vec<ClassroomId>,
}

impl TeacherInput {
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from_validator(&e);
        }
        errors
    }

    pub fn into_data(self) -> Result<TeacherData, AppError> {
        Ok(TeacherData {
            member: self.member.into_data()?,
            academic_level: parse_field("academic_level", &self.academic_level)?,
            bank_agency: self.bank_agency,
            bank_account: self.bank_account,
            classes: dedup_ids(self.classes),
        })
    }
}

/// List shape: no money, enrolment dates, bank details or classes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeacherListView {
    pub id: MemberId,
    pub firstname: String,
    pub fullname: String,
    pub id_doc: String,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub active: bool,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub academic_level: AcademicLevel,
}

impl From<&Teacher> for TeacherListView {
    fn from(teacher: &Teacher) -> Self {
        let member = &teacher.member;
        Self {
            id: member.id,
            firstname: member.firstname().to_string(),
            fullname: member.fullname.clone(),
            id_doc: member.id_doc.clone(),
            birthdate: member.birthdate,
            sex: member.sex,
            active: member.active,
            email: member.email.clone(),
            phone_number: member.phone_number.clone(),
            address: member.address.clone(),
            academic_level: teacher.academic_level,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeacherDetailView {
    #[serde(flatten)]
    pub member: MemberView,
    pub academic_level: AcademicLevel,
    pub bank_agency: i64,
    pub bank_account: i64,
    pub classes: Vec<Classroom>,
}

impl TeacherDetailView {
    pub fn new(teacher: &Teacher, classes: Vec<Classroom>) -> Self {
        Self {
            member: MemberView::from(&teacher.member),
            academic_level: teacher.academic_level,
            bank_agency: teacher.bank_agency,
            bank_account: teacher.bank_account,
            classes,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum TeacherView {
    List(TeacherListView),
    Detail(TeacherDetailView),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_types::Money;
    use serde_json::json;

    fn teacher() -> Teacher {
        Teacher::from_data(
            MemberId::new(3),
            NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
            TeacherData {
                member: MemberData {
                    fullname: "Helena Prado".to_string(),
                    id_doc: "T-9".to_string(),
                    birthdate: NaiveDate::from_ymd_opt(1980, 1, 20).unwrap(),
                    sex: Sex::Female,
                    monthly_payment: Money::from_cents(0),
                    active: false,
                    departure_date: None,
                    email: "helena@example.com".to_string(),
                    phone_number: "555-0199".to_string(),
                    address: "9 Faculty Road".to_string(),
                },
                academic_level: AcademicLevel::Doctor,
                bank_agency: 1234,
                bank_account: 998877,
                classes: vec![ClassroomId::new(1)],
            },
        )
    }

    #[test]
    fn test_list_view_hides_bank_details() {
        let value = serde_json::to_value(TeacherListView::from(&teacher())).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object["firstname"], json!("Helena"));
        assert_eq!(object["academic_level"], json!("Dr"));
        assert_eq!(object["active"], json!(false));
        for hidden in [
            "monthly_payment",
            "register_date",
            "departure_date",
            "classes",
            "bank_agency",
            "bank_account",
        ] {
            assert!(!object.contains_key(hidden), "{hidden} must not be listed");
        }
    }

    #[test]
    fn test_detail_view_includes_everything() {
        let value = serde_json::to_value(TeacherDetailView::new(&teacher(), vec![])).unwrap();
        assert_eq!(value["bank_account"], json!(998877));
        assert_eq!(value["monthly_payment"], json!("0.00"));
        assert_eq!(value["classes"], json!([]));
    }

    #[test]
    fn test_input_validation() {
        let input: TeacherInput = serde_json::from_value(json!({
            "fullname": "Igor Ramos",
            "id_doc": "T-10",
            "birthdate": "1975-05-05",
            "sex": "M",
            "monthly_payment": "0",
            "email": "igor@example.com",
            "phone_number": "555-0110",
            "address": "10 Faculty Road",
            "academic_level": "Phd",
            "bank_agency": -1,
            "bank_account": 42,
        }))
        .unwrap();
        let errors = input.check();
        assert!(errors.contains("academic_level"));
        assert!(errors.contains("bank_agency"));
        assert!(!errors.contains("bank_account"));
    }
}
