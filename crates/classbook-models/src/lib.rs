//! # Classbook Models
//!
//! Domain models, write payloads and response shapes for the Classbook API.
//!
//! # Modules
//!
//! - [`ids`]: integer id newtypes
//! - [`value_types`]: `Money`, `DaysOfWeek` and the coded choices
//! - [`grades`], [`classrooms`]: school structure
//! - [`members`], [`students`], [`teachers`]: people and their view shapes
//! - [`filters`]: list query parameters and the constraints they parse to
//! - [`actions`]: action → view mode table
//! - [`users`]: API users and login

pub mod actions;
pub mod classrooms;
pub mod filters;
pub mod grades;
pub mod ids;
pub mod members;
pub mod students;
pub mod teachers;
pub mod users;
pub mod validation;
pub mod value_types;

pub use actions::{Action, Resource, ViewMode, resolve, view_mode};
pub use classrooms::{Classroom, ClassroomData, ClassroomDetailView, ClassroomInput, ClassroomPatch};
pub use filters::{StudentListParams, StudentQuery, TeacherListParams, TeacherQuery};
pub use grades::{Grade, GradeData, GradeInput, GradePatch};
pub use ids::{ClassroomId, GradeId, MemberId, UserId};
pub use members::{Member, MemberData, MemberInput, MemberPatch, MemberView, SchoolMember};
pub use students::{
    Student, StudentData, StudentDetailView, StudentInput, StudentListView, StudentPatch,
    StudentView, StudentWriteView,
};
pub use teachers::{
    Teacher, TeacherData, TeacherDetailView, TeacherInput, TeacherListView, TeacherView,
};
pub use users::{LoginRequest, LoginResponse, User};
pub use value_types::{AcademicLevel, DaysOfWeek, DecimalInput, Money, Sex};
