//! Classroom models, DTOs and response shapes.

use chrono::NaiveTime;
use classbook_core::{AppError, FieldErrors, serde::double_option};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::grades::Grade;
use crate::ids::{ClassroomId, GradeId};
use crate::validation::{parse_time, validate_not_blank, validate_time};
use crate::value_types::DaysOfWeek;

/// A class held in a room on given weekdays.
///
/// Serializes as the list shape: `grade` is a bare id. Student and Teacher
/// detail views nest this shape for their `classes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub identifier: String,
    pub room: String,
    pub days_of_week: DaysOfWeek,
    #[schema(value_type = String, example = "10:30:00")]
    pub time: NaiveTime,
    #[sqlx(rename = "grade_id")]
    pub grade: Option<GradeId>,
}

/// Detail shape: same fields with the Grade expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClassroomDetailView {
    pub id: ClassroomId,
    pub name: String,
    pub identifier: String,
    pub room: String,
    pub days_of_week: DaysOfWeek,
    #[schema(value_type = String, example = "10:30:00")]
    pub time: NaiveTime,
    pub grade: Option<Grade>,
}

impl ClassroomDetailView {
    pub fn new(classroom: Classroom, grade: Option<Grade>) -> Self {
        Self {
            id: classroom.id,
            name: classroom.name,
            identifier: classroom.identifier,
            room: classroom.room,
            days_of_week: classroom.days_of_week,
            time: classroom.time,
            grade,
        }
    }
}

/// Stored fields of a Classroom, without its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassroomData {
    pub name: String,
    pub identifier: String,
    pub room: String,
    pub days_of_week: DaysOfWeek,
    pub time: NaiveTime,
    pub grade: Option<GradeId>,
}

impl From<&Classroom> for ClassroomData {
    fn from(classroom: &Classroom) -> Self {
        Self {
            name: classroom.name.clone(),
            identifier: classroom.identifier.clone(),
            room: classroom.room.clone(),
            days_of_week: classroom.days_of_week.clone(),
            time: classroom.time,
            grade: classroom.grade,
        }
    }
}

/// Body of `POST /classrooms` and `PUT /classrooms/{id}`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ClassroomInput {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    #[schema(example = "Mathematics")]
    pub name: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    #[schema(example = "MATH-5A")]
    pub identifier: String,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    #[schema(example = "B12")]
    pub room: String,
    #[schema(example = "1,3,5")]
    pub days_of_week: String,
    #[validate(custom(function = "validate_time"))]
    #[schema(example = "10:30")]
    pub time: String,
    #[serde(default)]
    pub grade: Option<GradeId>,
}

impl ClassroomInput {
    /// Runs the derived validators plus every weekday validator.
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from_validator(&e);
        }
        check_days_of_week(&self.days_of_week, &mut errors);
        errors
    }

    pub fn into_data(self) -> Result<ClassroomData, AppError> {
        Ok(ClassroomData {
            name: self.name,
            identifier: self.identifier,
            room: self.room,
            days_of_week: parse_days_of_week(self.days_of_week)?,
            time: parse_time_field(&self.time)?,
            grade: self.grade,
        })
    }
}

/// Body of `PATCH /classrooms/{id}`. `"grade": null` detaches the Grade.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ClassroomPatch {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Ensure this field has no more than 255 characters.")
    )]
    pub name: Option<String>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub identifier: Option<String>,
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 50, message = "Ensure this field has no more than 50 characters.")
    )]
    pub room: Option<String>,
    pub days_of_week: Option<String>,
    #[validate(custom(function = "validate_time"))]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub grade: Option<Option<GradeId>>,
}

impl ClassroomPatch {
    pub fn check(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            errors.extend_from_validator(&e);
        }
        if let Some(days) = &self.days_of_week {
            check_days_of_week(days, &mut errors);
        }
        errors
    }

    pub fn apply(self, data: &mut ClassroomData) -> Result<(), AppError> {
        if let Some(name) = self.name {
            data.name = name;
        }
        if let Some(identifier) = self.identifier {
            data.identifier = identifier;
        }
        if let Some(room) = self.room {
            data.room = room;
        }
        if let Some(days) = self.days_of_week {
            data.days_of_week = parse_days_of_week(days)?;
        }
        if let Some(time) = self.time {
            data.time = parse_time_field(&time)?;
        }
        if let Some(grade) = self.grade {
            data.grade = grade;
        }
        Ok(())
    }
}

fn check_days_of_week(raw: &str, errors: &mut FieldErrors) {
    if raw.trim().is_empty() {
        errors.add("days_of_week", crate::validation::BLANK_MESSAGE);
        return;
    }
    for e in DaysOfWeek::check(raw) {
        errors.add("days_of_week", e.to_string());
    }
}

fn parse_days_of_week(raw: String) -> Result<DaysOfWeek, AppError> {
    DaysOfWeek::new(raw).map_err(|errors| {
        let mut fields = FieldErrors::new();
        for e in errors {
            fields.add("days_of_week", e.to_string());
        }
        AppError::validation(fields)
    })
}

fn parse_time_field(raw: &str) -> Result<NaiveTime, AppError> {
    parse_time(raw).ok_or_else(|| AppError::invalid_field("time", "Time has wrong format."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(days: &str) -> ClassroomInput {
        serde_json::from_value(json!({
            "name": "Mathematics",
            "identifier": "MATH-5A",
            "room": "B12",
            "days_of_week": days,
            "time": "10:30",
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_days_of_week() {
        let input = input("1,2,7");
        assert!(input.check().is_empty());
        let data = input.into_data().unwrap();
        assert_eq!(data.days_of_week.days(), vec![1, 2, 7]);
        assert_eq!(data.time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(data.grade, None);
    }

    #[test]
    fn test_invalid_days_of_week() {
        for days in ["1,2,9", "24", "2.4"] {
            let errors = input(days).check();
            assert!(errors.contains("days_of_week"), "{days} should be rejected");
        }
    }

    #[test]
    fn test_decimal_day_reports_both_messages() {
        let errors = input("2.4").check();
        assert_eq!(errors.get("days_of_week").map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_blank_days_of_week() {
        let errors = input("").check();
        assert_eq!(
            errors.get("days_of_week"),
            Some(&[crate::validation::BLANK_MESSAGE.to_string()][..])
        );
    }

    #[test]
    fn test_list_shape_renders_grade_id() {
        let classroom = Classroom {
            id: ClassroomId::new(1),
            name: "Mathematics".to_string(),
            identifier: "MATH-5A".to_string(),
            room: "B12".to_string(),
            days_of_week: DaysOfWeek::new_unchecked("1,3"),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            grade: Some(GradeId::new(2)),
        };
        let value = serde_json::to_value(&classroom).unwrap();
        assert_eq!(value["grade"], json!(2));
        assert_eq!(value["time"], json!("08:00:00"));
        assert_eq!(value["days_of_week"], json!("1,3"));
    }

    #[test]
    fn test_detail_shape_nests_grade() {
        let classroom = Classroom {
            id: ClassroomId::new(1),
            name: "Mathematics".to_string(),
            identifier: "MATH-5A".to_string(),
            room: "B12".to_string(),
            days_of_week: DaysOfWeek::new_unchecked("1,3"),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            grade: Some(GradeId::new(2)),
        };
        let grade = Grade {
            id: GradeId::new(2),
            name: "2nd".to_string(),
            rank: 2,
        };
        let view = ClassroomDetailView::new(classroom, Some(grade));
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["grade"], json!({"id": 2, "name": "2nd", "rank": 2}));
    }

    #[test]
    fn test_patch_null_grade_detaches() {
        let mut data = input("1").into_data().unwrap();
        data.grade = Some(GradeId::new(4));
        let patch: ClassroomPatch = serde_json::from_value(json!({"grade": null})).unwrap();
        patch.apply(&mut data).unwrap();
        assert_eq!(data.grade, None);
    }

    #[test]
    fn test_patch_absent_grade_keeps_it() {
        let mut data = input("1").into_data().unwrap();
        data.grade = Some(GradeId::new(4));
        let patch: ClassroomPatch = serde_json::from_value(json!({"room": "C1"})).unwrap();
        patch.apply(&mut data).unwrap();
        assert_eq!(data.grade, Some(GradeId::new(4)));
        assert_eq!(data.room, "C1");
    }
}
