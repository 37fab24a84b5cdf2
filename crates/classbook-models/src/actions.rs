//! Which actions each resource supports, and the response shape each uses.
//!
//! [`view_mode`] is the single table for both questions. Student and Teacher
//! services resolve every action through it, since their response shape
//! depends on the action. Grades and Classrooms support every action with
//! one shape, so their services do not consult it. An action that maps to
//! `None` is still routed, so callers are authenticated first and then told
//! the method is not allowed.

use classbook_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Grade,
    Classroom,
    Student,
    Teacher,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::PartialUpdate,
        Action::Destroy,
    ];

    /// HTTP method that triggers the action.
    pub fn method(self) -> &'static str {
        match self {
            Action::List | Action::Retrieve => "GET",
            Action::Create => "POST",
            Action::Update => "PUT",
            Action::PartialUpdate => "PATCH",
            Action::Destroy => "DELETE",
        }
    }
}

/// Response shape for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Compact projection, references as ids.
    List,
    /// Full projection, references expanded.
    Detail,
    /// Shape accepted and echoed by writes, references as ids.
    Write,
    /// Nothing rendered (successful delete).
    Empty,
}

pub fn view_mode(resource: Resource, action: Action) -> Option<ViewMode> {
    use Action::*;

    match (resource, action) {
        (_, List) => Some(ViewMode::List),
        (_, Retrieve) => Some(ViewMode::Detail),
        (Resource::Teacher, Create | Update | PartialUpdate | Destroy) => None,
        (Resource::Student, Destroy) => None,
        (_, Create | Update | PartialUpdate) => Some(ViewMode::Write),
        (Resource::Grade | Resource::Classroom, Destroy) => Some(ViewMode::Empty),
    }
}

/// Like [`view_mode`], with unsupported actions turned into a 405.
pub fn resolve(resource: Resource, action: Action) -> Result<ViewMode, AppError> {
    view_mode(resource, action).ok_or_else(|| AppError::method_not_allowed(action.method()))
}
