//! Query-string filters for the Student and Teacher lists.
//!
//! Each parameter parses to an optional constraint. A malformed value is not
//! an error; it simply yields no constraint. All constraints present are
//! combined with AND.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::ids::{ClassroomId, GradeId};
use crate::students::Student;
use crate::teachers::Teacher;

/// `Some(n)` when the value is a single integer; `None` when absent, empty
/// or anything else.
pub fn parse_int_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse().ok())
}

/// Comma-separated integers. One bad token discards the whole list.
pub fn parse_int_list_param(raw: Option<&str>) -> Option<Vec<i64>> {
    let raw = raw.filter(|value| !value.is_empty())?;
    raw.split(',')
        .map(|token| token.trim().parse::<i64>().ok())
        .collect()
}

/// Comma-separated codes, taken verbatim.
pub fn parse_code_list_param(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw.filter(|value| !value.is_empty())?;
    Some(raw.split(',').map(str::to_string).collect())
}

/// Inactive members are hidden unless `show_inactive` is a non-zero integer.
fn active_only(show_inactive: Option<&str>) -> bool {
    parse_int_param(show_inactive).unwrap_or(0) == 0
}

fn intersects(ids: &[ClassroomId], wanted: &[ClassroomId]) -> bool {
    ids.iter().any(|id| wanted.contains(id))
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentListParams {
    /// Non-zero integer to include inactive students.
    pub show_inactive: Option<String>,
    /// Comma-separated Grade ids.
    pub grades: Option<String>,
    /// Comma-separated Classroom ids.
    pub classes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherListParams {
    /// Non-zero integer to include inactive teachers.
    pub show_inactive: Option<String>,
    /// Comma-separated academic level codes (`Gr`, `Ms`, `Dr`).
    pub academic_level: Option<String>,
    /// Comma-separated Classroom ids.
    pub classes: Option<String>,
}

/// Parsed Student list constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentQuery {
    pub active_only: bool,
    pub grades: Option<Vec<GradeId>>,
    pub classes: Option<Vec<ClassroomId>>,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self {
            active_only: true,
            grades: None,
            classes: None,
        }
    }
}

impl StudentQuery {
    pub fn from_params(params: &StudentListParams) -> Self {
        Self {
            active_only: active_only(params.show_inactive.as_deref()),
            grades: parse_int_list_param(params.grades.as_deref())
                .map(|ids| ids.into_iter().map(GradeId::new).collect()),
            classes: parse_int_list_param(params.classes.as_deref())
                .map(|ids| ids.into_iter().map(ClassroomId::new).collect()),
        }
    }

    pub fn matches(&self, student: &Student) -> bool {
        if self.active_only && !student.member.active {
            return false;
        }
        if let Some(grades) = &self.grades {
            match student.grade {
                Some(grade) if grades.contains(&grade) => {}
                _ => return false,
            }
        }
        if let Some(classes) = &self.classes {
            if !intersects(&student.classes, classes) {
                return false;
            }
        }
        true
    }
}

/// Parsed Teacher list constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeacherQuery {
    pub active_only: bool,
    /// Codes are compared verbatim; unknown codes match nothing.
    pub academic_levels: Option<Vec<String>>,
    pub classes: Option<Vec<ClassroomId>>,
}

impl Default for TeacherQuery {
    fn default() -> Self {
        Self {
            active_only: true,
            academic_levels: None,
            classes: None,
        }
    }
}

impl TeacherQuery {
    pub fn from_params(params: &TeacherListParams) -> Self {
        Self {
            active_only: active_only(params.show_inactive.as_deref()),
            academic_levels: parse_code_list_param(params.academic_level.as_deref()),
            classes: parse_int_list_param(params.classes.as_deref())
                .map(|ids| ids.into_iter().map(ClassroomId::new).collect()),
        }
    }

    pub fn matches(&self, teacher: &Teacher) -> bool {
        if self.active_only && !teacher.member.active {
            return false;
        }
        if let Some(levels) = &self.academic_levels {
            let code = teacher.academic_level.as_str();
            if !levels.iter().any(|level| level == code) {
                return false;
            }
        }
        if let Some(classes) = &self.classes {
            if !intersects(&teacher.classes, classes) {
                return false;
            }
        }
        true
    }
}
