use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::entities::sea_orm_active_enums::{CbcsCategory, CourseCategory, CourseType, Faculty, RoleEnum};
use crate::error::ErrorBody;
use crate::routes::{auth, choices, courses, departments, health, syllabi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "access_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "access_token",
                "HttpOnly cookie set by login, register and token refresh.",
            ))),
        );
        // Only honoured when ALLOW_HEADER_AUTH is on.
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "University Service API",
        description = "Accounts, departments, courses and syllabi of a university administration backend."
    ),
    paths(
        health::route::health,
        auth::route::register,
        auth::route::login,
        auth::route::logout,
        auth::route::get_profile,
        auth::route::update_profile,
        auth::route::upload_profile_picture,
        auth::route::change_password,
        auth::route::refresh_token,
        departments::route::list_departments,
        departments::route::create_department,
        departments::route::get_department,
        departments::route::update_department,
        departments::route::delete_department,
        departments::route::hard_delete_department,
        courses::route::list_courses,
        courses::route::create_course,
        courses::route::get_course,
        courses::route::update_course,
        courses::route::delete_course,
        courses::route::hard_delete_course,
        syllabi::route::list_syllabi,
        syllabi::route::create_syllabus,
        syllabi::route::get_syllabus,
        syllabi::route::update_syllabus,
        syllabi::route::delete_syllabus,
        syllabi::route::hard_delete_syllabus,
        choices::route::faculty_choices,
        choices::route::course_category_choices,
        choices::route::course_type_choices,
        choices::route::cbcs_category_choices,
    ),
    components(schemas(
        ErrorBody,
        RoleEnum,
        Faculty,
        CourseCategory,
        CourseType,
        CbcsCategory,
        health::route::HealthResponse,
        auth::dto::RegisterRequest,
        auth::dto::LoginRequest,
        auth::dto::LogoutRequest,
        auth::dto::ChangePasswordRequest,
        auth::dto::ProfileUpdateRequest,
        auth::dto::ProfilePictureUpload,
        auth::dto::UserResponse,
        auth::dto::AuthResponse,
        auth::dto::MessageResponse,
        departments::dto::CreateDepartmentRequest,
        departments::dto::UpdateDepartmentRequest,
        departments::dto::DepartmentResponse,
        courses::dto::CreateCourseRequest,
        courses::dto::UpdateCourseRequest,
        courses::dto::CourseResponse,
        syllabi::dto::SyllabusUpload,
        syllabi::dto::SyllabusUpdateUpload,
        syllabi::dto::SyllabusResponse,
        choices::dto::ChoiceResponse,
    )),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Authentication", description = "Registration, login, logout and tokens"),
        (name = "Profile", description = "The signed-in user's own profile"),
        (name = "Departments", description = "Departments with four-digit ids"),
        (name = "Courses", description = "Courses offered by departments"),
        (name = "Syllabi", description = "Versioned syllabus PDFs per course"),
        (name = "Choices", description = "Selectable values for enumerated fields"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/auth/login",
            "/api/v1/departments/{department_id}",
            "/api/v1/courses/{course_code}/hard",
            "/api/v1/syllabi",
            "/api/v1/faculty-choices",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("access_cookie"));
    }
}
