//! Grade (school year level) models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::GradeId;
use crate::validation::validate_not_blank;

/// A school year level. Grades are ordered by `rank`.
///
/// The same shape is used for list, detail and write responses, and it is
/// what Student and Classroom detail views nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: GradeId,
    pub name: String,
    pub rank: i32,
}

/// Stored fields of a Grade, without its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeData {
    pub name: String,
    pub rank: i32,
}

impl From<&Grade> for GradeData {
    fn from(grade: &Grade) -> Self {
        Self {
            name: grade.name.clone(),
            rank: grade.rank,
        }
    }
}

/// Body of `POST /grades` and `PUT /grades/{id}`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GradeInput {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    #[schema(example = "5th grade")]
    pub name: String,
    #[validate(range(min = 1, max = 32767, message = "Ensure this value is between 1 and 32767."))]
    #[schema(example = 5)]
    pub rank: i32,
}

impl GradeInput {
    pub fn into_data(self) -> GradeData {
        GradeData {
            name: self.name,
            rank: self.rank,
        }
    }
}

/// Body of `PATCH /grades/{id}`. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct GradePatch {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Ensure this field has no more than 100 characters.")
    )]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 32767, message = "Ensure this value is between 1 and 32767."))]
    pub rank: Option<i32>,
}

impl GradePatch {
    pub fn apply(self, data: &mut GradeData) {
        if let Some(name) = self.name {
            data.name = name;
        }
        if let Some(rank) = self.rank {
            data.rank = rank;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grade_serialization() {
        let grade = Grade {
            id: GradeId::new(3),
            name: "3rd grade".to_string(),
            rank: 3,
        };
        assert_eq!(
            serde_json::to_value(&grade).unwrap(),
            json!({"id": 3, "name": "3rd grade", "rank": 3})
        );
    }

    #[test]
    fn test_input_ignores_id() {
        let input: GradeInput =
            serde_json::from_value(json!({"id": 99, "name": "1st", "rank": 1})).unwrap();
        assert_eq!(input.into_data(), GradeData { name: "1st".into(), rank: 1 });
    }

    #[test]
    fn test_rank_must_be_positive() {
        let input = GradeInput {
            name: "Zero".to_string(),
            rank: 0,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("rank"));
    }

    #[test]
    fn test_blank_name_rejected() {
        let input = GradeInput {
            name: " ".to_string(),
            rank: 1,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_patch_touches_only_present_fields() {
        let mut data = GradeData {
            name: "1st".to_string(),
            rank: 1,
        };
        let patch: GradePatch = serde_json::from_value(json!({"rank": 7})).unwrap();
        patch.apply(&mut data);
        assert_eq!(data.name, "1st");
        assert_eq!(data.rank, 7);
    }
}
