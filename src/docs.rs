use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use classbook_core::ErrorResponse;
use classbook_models::{
    AcademicLevel, Classroom, ClassroomDetailView, ClassroomInput, ClassroomPatch, DaysOfWeek,
    Grade, GradeInput, GradePatch, LoginRequest, LoginResponse, MemberInput, MemberPatch,
    MemberView, Money, Sex, StudentDetailView, StudentInput, StudentListView, StudentPatch,
    StudentWriteView, TeacherDetailView, TeacherListView,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::grades::controller::get_grades,
        crate::modules::grades::controller::create_grade,
        crate::modules::grades::controller::get_grade,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::patch_grade,
        crate::modules::grades::controller::delete_grade,
        crate::modules::classrooms::controller::get_classrooms,
        crate::modules::classrooms::controller::create_classroom,
        crate::modules::classrooms::controller::get_classroom,
        crate::modules::classrooms::controller::update_classroom,
        crate::modules::classrooms::controller::patch_classroom,
        crate::modules::classrooms::controller::delete_classroom,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::patch_student,
        crate::modules::students::controller::delete_student,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::get_teacher,
    ),
    components(
        schemas(
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            Grade,
            GradeInput,
            GradePatch,
            Classroom,
            ClassroomDetailView,
            ClassroomInput,
            ClassroomPatch,
            DaysOfWeek,
            Money,
            Sex,
            AcademicLevel,
            MemberInput,
            MemberPatch,
            MemberView,
            StudentInput,
            StudentPatch,
            StudentListView,
            StudentDetailView,
            StudentWriteView,
            TeacherListView,
            TeacherDetailView,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Token issuance for API users"),
        (name = "Grades", description = "School year levels"),
        (name = "Classrooms", description = "Classes, their rooms and schedules"),
        (name = "Students", description = "Student records"),
        (name = "Teachers", description = "Teacher records (read-only)")
    ),
    info(
        title = "Classbook API",
        version = "0.1.0",
        description = "School administration REST API: grades, classrooms, students and teachers.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/grades",
            "/api/grades/{id}",
            "/api/classrooms/{id}",
            "/api/members/students",
            "/api/members/teachers/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
