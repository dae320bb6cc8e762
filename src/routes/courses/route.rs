use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use super::dto::{CourseQuery, CourseResponse, CreateCourseRequest, UpdateCourseRequest};
use crate::error::AppResult;
use crate::extractor::{AppJson, AppQuery, AuthUser, MaybeAuthUser};
use crate::middleware::permission::{is_privileged, require_editor, require_staff, require_superuser};
use crate::repositories::{CourseFilter, CourseRepository, CourseUpdate, NewCourse};
use crate::state::AppState;
use crate::utils::audit::AuditStamp;
use crate::utils::upload::remove_file;
use crate::utils::validation::{validate_course_code, validate_course_name, validate_maximum_credit};

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/courses", get(list_courses).post(create_course))
        .route(
            "/api/v1/courses/{course_code}",
            get(get_course)
                .put(update_course)
                .patch(update_course)
                .delete(delete_course),
        )
        .route("/api/v1/courses/{course_code}/hard", delete(hard_delete_course))
}

/// List courses with filters, search and ordering
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(CourseQuery),
    responses(
        (status = 200, description = "Courses", body = [CourseResponse]),
        (status = 400, description = "Invalid filter value", body = crate::error::ErrorBody),
    ),
    tag = "Courses"
)]
pub async fn list_courses(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppQuery(query): AppQuery<CourseQuery>,
) -> AppResult<AppJson<Vec<CourseResponse>>> {
    let filter = CourseFilter {
        discipline: query.discipline,
        course_category: query.course_category,
        course_type: query.course_type,
        cbcs_category: query.cbcs_category,
        is_deleted: query.is_deleted,
        search: query.search,
        ordering: query.ordering,
    };
    let courses = CourseRepository::new(&state.db)
        .list(filter, is_privileged(user.as_ref()))
        .await?;

    Ok(AppJson(courses.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Admin, teacher or staff only", body = crate::error::ErrorBody),
    ),
    tag = "Courses"
)]
pub async fn create_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> AppResult<(StatusCode, AppJson<CourseResponse>)> {
    require_editor(&user)?;

    let new_course = NewCourse {
        course_code: validate_course_code(&payload.course_code)?,
        course_name: validate_course_name(&payload.course_name)?,
        course_category: payload.course_category,
        course_type: payload.course_type,
        cbcs_category: payload.cbcs_category,
        maximum_credit: validate_maximum_credit(payload.maximum_credit)?,
        discipline: payload.discipline.trim().to_string(),
    };

    let course = CourseRepository::new(&state.db)
        .create(new_course, &AuditStamp::by(&user))
        .await?;

    Ok((StatusCode::CREATED, AppJson(course.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_code}",
    params(("course_code" = String, Path, description = "Course code, e.g. CSE-101-V1")),
    responses(
        (status = 200, description = "Course", body = CourseResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Courses"
)]
pub async fn get_course(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(course_code): Path<String>,
) -> AppResult<AppJson<CourseResponse>> {
    let course = CourseRepository::new(&state.db)
        .find(&course_code, is_privileged(user.as_ref()))
        .await?;
    Ok(AppJson(course.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/courses/{course_code}",
    params(("course_code" = String, Path, description = "Course code, e.g. CSE-101-V1")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Courses"
)]
pub async fn update_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(course_code): Path<String>,
    AppJson(payload): AppJson<UpdateCourseRequest>,
) -> AppResult<AppJson<CourseResponse>> {
    require_editor(&user)?;
    if payload.is_deleted.is_some() {
        require_staff(&user)?;
    }

    let updates = CourseUpdate {
        course_name: payload
            .course_name
            .as_deref()
            .map(validate_course_name)
            .transpose()?,
        course_category: payload.course_category,
        course_type: payload.course_type,
        cbcs_category: payload.cbcs_category,
        maximum_credit: payload
            .maximum_credit
            .map(validate_maximum_credit)
            .transpose()?,
        discipline: payload.discipline.map(|d| d.trim().to_string()),
        is_deleted: payload.is_deleted,
    };

    let course = CourseRepository::new(&state.db)
        .update(
            &course_code,
            updates,
            is_privileged(Some(&user)),
            &AuditStamp::by(&user),
        )
        .await?;
    Ok(AppJson(course.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_code}",
    params(("course_code" = String, Path, description = "Course code, e.g. CSE-101-V1")),
    responses(
        (status = 204, description = "Course soft-deleted"),
        (status = 403, description = "Staff only", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Courses"
)]
pub async fn delete_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(course_code): Path<String>,
) -> AppResult<StatusCode> {
    require_staff(&user)?;
    CourseRepository::new(&state.db)
        .soft_delete(&course_code, &AuditStamp::by(&user))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_code}/hard",
    params(("course_code" = String, Path, description = "Course code, e.g. CSE-101-V1")),
    responses(
        (status = 204, description = "Course removed together with its syllabi"),
        (status = 403, description = "Superuser only", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Courses"
)]
pub async fn hard_delete_course(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(course_code): Path<String>,
) -> AppResult<StatusCode> {
    require_superuser(&user)?;

    let files = CourseRepository::new(&state.db)
        .hard_delete(&course_code)
        .await?;
    for file in files {
        remove_file(&state.config.media_root, &file).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
