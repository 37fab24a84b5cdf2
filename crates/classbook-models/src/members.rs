//! Member: the identity and contact record shared by Students and Teachers.
//!
//! Students and Teachers embed a [`Member`] by value. Code that needs to treat
//! both uniformly (the roster, `id_doc` uniqueness) goes through
//! [`SchoolMember`].

use chrono::NaiveDate;
use classbook_core::{AppError, serde::double_option};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::MemberId;
use crate::students::Student;
use crate::teachers::Teacher;
use crate::validation::{
    REQUIRED_MESSAGE, validate_money, validate_not_blank, validate_past_date, validate_sex,
};
use crate::value_types::{DecimalInput, Money, Sex};

/// First whitespace-delimited token of a full name.
pub fn firstname_of(fullname: &str) -> &str {
    fullname.split_whitespace().next().unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Member {
    pub id: MemberId,
    pub fullname: String,
    pub id_doc: String,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub monthly_payment: Money,
    pub active: bool,
    pub register_date: NaiveDate,
    pub departure_date: Option<NaiveDate>,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl Member {
    /// Always derived from `fullname`, never stored.
    pub fn firstname(&self) -> &str {
        firstname_of(&self.fullname)
    }

    pub fn from_data(id: MemberId, register_date: NaiveDate, data: MemberData) -> Self {
        Self {
            id,
            fullname: data.fullname,
            id_doc: data.id_doc,
            birthdate: data.birthdate,
            sex: data.sex,
            monthly_payment: data.monthly_payment,
            active: data.active,
            register_date,
            departure_date: data.departure_date,
            email: data.email,
            phone_number: data.phone_number,
            address: data.address,
        }
    }
}

/// Client-writable Member fields. `id` and `register_date` are owned by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberData {
    pub fullname: String,
    pub id_doc: String,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub monthly_payment: Money,
    pub active: bool,
    pub departure_date: Option<NaiveDate>,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl From<&Member> for MemberData {
    fn from(member: &Member) -> Self {
        Self {
            fullname: member.fullname.clone(),
            id_doc: member.id_doc.clone(),
            birthdate: member.birthdate,
            sex: member.sex,
            monthly_payment: member.monthly_payment,
            active: member.active,
            departure_date: member.departure_date,
            email: member.email.clone(),
            phone_number: member.phone_number.clone(),
            address: member.address.clone(),
        }
    }
}

pub(crate) fn default_active() -> bool {
    true
}

/// Member part of a create or full-update body.
///
/// `firstname`, `id` and `register_date` are not fields here, so any value a
/// client sends for them is dropped during deserialization.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MemberInput {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    #[schema(example = "Ana Maria Souza")]
    pub fullname: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    #[schema(example = "123.456.789-00")]
    pub id_doc: String,
    #[serde(default)]
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_past_date")
    )]
    pub birthdate: Option<NaiveDate>,
    #[validate(custom(function = "validate_sex"))]
    #[schema(example = "F")]
    pub sex: String,
    #[validate(custom(function = "validate_money"))]
    pub monthly_payment: DecimalInput,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub departure_date: Option<NaiveDate>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub phone_number: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub address: String,
}

impl MemberInput {
    /// Converts an input that already passed `validate()`.
    pub fn into_data(self) -> Result<MemberData, AppError> {
        Ok(MemberData {
            fullname: self.fullname,
            id_doc: self.id_doc,
            birthdate: self
                .birthdate
                .ok_or_else(|| AppError::invalid_field("birthdate", REQUIRED_MESSAGE))?,
            sex: parse_field("sex", &self.sex)?,
            monthly_payment: self
                .monthly_payment
                .to_money()
                .map_err(|e| AppError::invalid_field("monthly_payment", e.to_string()))?,
            active: self.active,
            departure_date: self.departure_date,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
        })
    }
}

/// Member part of a partial-update body. Absent fields are left untouched;
/// `"departure_date": null` clears the date.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct MemberPatch {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    pub fullname: Option<String>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub id_doc: Option<String>,
    #[validate(custom(function = "validate_past_date"))]
    pub birthdate: Option<NaiveDate>,
    #[validate(custom(function = "validate_sex"))]
    pub sex: Option<String>,
    #[validate(custom(function = "validate_money"))]
    pub monthly_payment: Option<DecimalInput>,
    pub active: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub departure_date: Option<Option<NaiveDate>>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub phone_number: Option<String>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub address: Option<String>,
}

impl MemberPatch {
    pub fn apply(self, data: &mut MemberData) -> Result<(), AppError> {
        if let Some(fullname) = self.fullname {
            data.fullname = fullname;
        }
        if let Some(id_doc) = self.id_doc {
            data.id_doc = id_doc;
        }
        if let Some(birthdate) = self.birthdate {
            data.birthdate = birthdate;
        }
        if let Some(sex) = self.sex {
            data.sex = parse_field("sex", &sex)?;
        }
        if let Some(amount) = self.monthly_payment {
            data.monthly_payment = amount
                .to_money()
                .map_err(|e| AppError::invalid_field("monthly_payment", e.to_string()))?;
        }
        if let Some(active) = self.active {
            data.active = active;
        }
        if let Some(departure_date) = self.departure_date {
            data.departure_date = departure_date;
        }
        if let Some(email) = self.email {
            data.email = email;
        }
        if let Some(phone_number) = self.phone_number {
            data.phone_number = phone_number;
        }
        if let Some(address) = self.address {
            data.address = address;
        }
        Ok(())
    }
}

pub(crate) fn parse_field<T>(field: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| AppError::invalid_field(field, e.to_string()))
}

/// Every Member field plus the derived `firstname`. Flattened into the
/// detail and write shapes of Students and Teachers.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberView {
    pub id: MemberId,
    pub firstname: String,
    pub fullname: String,
    pub id_doc: String,
    pub birthdate: NaiveDate,
    pub sex: Sex,
    pub monthly_payment: Money,
    pub active: bool,
    pub register_date: NaiveDate,
    pub departure_date: Option<NaiveDate>,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl From<&Member> for MemberView {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            firstname: member.firstname().to_string(),
            fullname: member.fullname.clone(),
            id_doc: member.id_doc.clone(),
            birthdate: member.birthdate,
            sex: member.sex,
            monthly_payment: member.monthly_payment,
            active: member.active,
            register_date: member.register_date,
            departure_date: member.departure_date,
            email: member.email.clone(),
            phone_number: member.phone_number.clone(),
            address: member.address.clone(),
        }
    }
}

/// A Student or a Teacher, for code that handles every Member alike.
#[derive(Debug, Clone, PartialEq)]
pub enum SchoolMember {
    Student(Student),
    Teacher(Teacher),
}

impl SchoolMember {
    pub fn member(&self) -> &Member {
        match self {
            SchoolMember::Student(student) => &student.member,
            SchoolMember::Teacher(teacher) => &teacher.member,
        }
    }

    pub fn id(&self) -> MemberId {
        self.member().id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::today;
    use chrono::Duration;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "fullname": "Ana Maria Souza",
            "id_doc": "123",
            "birthdate": "2010-04-02",
            "sex": "F",
            "monthly_payment": "150.00",
            "email": "ana@example.com",
            "phone_number": "555-0100",
            "address": "1 School Lane",
        })
    }

    #[test]
    fn test_firstname_is_first_token() {
        assert_eq!(firstname_of("Ana Maria Souza"), "Ana");
        assert_eq!(firstname_of("  Leading Spaces"), "Leading");
        assert_eq!(firstname_of("Single"), "Single");
        assert_eq!(firstname_of(""), "");
    }

    #[test]
    fn test_input_defaults() {
        let input: MemberInput = serde_json::from_value(payload()).unwrap();
        assert!(input.validate().is_ok());
        let data = input.into_data().unwrap();
        assert!(data.active);
        assert_eq!(data.departure_date, None);
        assert_eq!(data.monthly_payment, Money::from_cents(15_000));
        assert_eq!(data.sex, Sex::Female);
    }

    #[test]
    fn test_missing_birthdate_is_required() {
        let mut body = payload();
        body.as_object_mut().unwrap().remove("birthdate");
        let input: MemberInput = serde_json::from_value(body).unwrap();
        let errors = input.validate().unwrap_err();
        let birthdate = &errors.field_errors()["birthdate"];
        assert_eq!(birthdate[0].message.as_deref(), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn test_birthdate_today_rejected() {
        let mut body = payload();
        body["birthdate"] = json!(today().to_string());
        let input: MemberInput = serde_json::from_value(body).unwrap();
        assert!(input.validate().unwrap_err().field_errors().contains_key("birthdate"));
    }

    #[test]
    fn test_birthdate_future_rejected() {
        let mut body = payload();
        body["birthdate"] = json!((today() + Duration::days(1)).to_string());
        let input: MemberInput = serde_json::from_value(body).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_invalid_choice_and_money() {
        let mut body = payload();
        body["sex"] = json!("X");
        body["monthly_payment"] = json!(1234567.5);
        let input: MemberInput = serde_json::from_value(body).unwrap();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sex"));
        assert!(fields.contains_key("monthly_payment"));
    }

    #[test]
    fn test_money_error_carries_rejected_amount() {
        let mut body = payload();
        body["monthly_payment"] = json!("1.234");
        let input: MemberInput = serde_json::from_value(body).unwrap();
        let errors = input.validate().unwrap_err();
        let money = &errors.field_errors()["monthly_payment"][0];
        assert_eq!(money.params["value"], json!("1.234"));
        assert_eq!(
            money.message.as_deref(),
            Some("Ensure that there are no more than 2 decimal places.")
        );
    }

    #[test]
    fn test_patch_money_is_validated() {
        let patch: MemberPatch =
            serde_json::from_value(json!({"monthly_payment": "12345678"})).unwrap();
        let errors = patch.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("monthly_payment"));
    }

    #[test]
    fn test_patch_null_departure_date_clears() {
        let input: MemberInput = serde_json::from_value(payload()).unwrap();
        let mut data = input.into_data().unwrap();
        data.departure_date = NaiveDate::from_ymd_opt(2024, 6, 30);

        let patch: MemberPatch =
            serde_json::from_value(json!({"departure_date": null})).unwrap();
        patch.apply(&mut data).unwrap();
        assert_eq!(data.departure_date, None);
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let input: MemberInput = serde_json::from_value(payload()).unwrap();
        let mut data = input.into_data().unwrap();
        let before = data.clone();

        let patch: MemberPatch = serde_json::from_value(json!({"active": false})).unwrap();
        patch.apply(&mut data).unwrap();
        assert!(!data.active);
        assert_eq!(data.fullname, before.fullname);
        assert_eq!(data.birthdate, before.birthdate);
    }
}
