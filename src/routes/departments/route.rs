use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use super::dto::{
    CreateDepartmentRequest, DepartmentQuery, DepartmentResponse, UpdateDepartmentRequest,
};
use crate::error::{AppError, AppResult};
use crate::extractor::{AppJson, AppQuery, AuthUser, MaybeAuthUser};
use crate::middleware::permission::{is_privileged, require_editor, require_staff, require_superuser};
use crate::repositories::{DepartmentFilter, DepartmentRepository, DepartmentUpdate};
use crate::state::AppState;
use crate::utils::audit::AuditStamp;
use crate::utils::upload::remove_file;
use crate::utils::validation::validate_department_name;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/departments",
            get(list_departments).post(create_department),
        )
        .route(
            "/api/v1/departments/{department_id}",
            get(get_department)
                .put(update_department)
                .patch(update_department)
                .delete(delete_department),
        )
        .route(
            "/api/v1/departments/{department_id}/hard",
            delete(hard_delete_department),
        )
}

fn check_id(id: &str) -> AppResult<()> {
    if id.len() != 4 || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::field("id", "ID must be a four-digit number"));
    }
    Ok(())
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    params(DepartmentQuery),
    responses(
        (status = 200, description = "Departments ordered by id", body = [DepartmentResponse]),
    ),
    tag = "Departments"
)]
pub async fn list_departments(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppQuery(query): AppQuery<DepartmentQuery>,
) -> AppResult<AppJson<Vec<DepartmentResponse>>> {
    let departments = DepartmentRepository::new(&state.db)
        .list(
            DepartmentFilter {
                faculty: query.faculty,
                is_deleted: query.is_deleted,
            },
            is_privileged(user.as_ref()),
        )
        .await?;

    Ok(AppJson(departments.into_iter().map(Into::into).collect()))
}

/// Create a department; the id is allocated by the server
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 400, description = "Invalid input or id space exhausted", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Admin, teacher or staff only", body = crate::error::ErrorBody),
    ),
    tag = "Departments"
)]
pub async fn create_department(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, AppJson<DepartmentResponse>)> {
    require_editor(&user)?;
    let name = validate_department_name(&payload.name)?;

    let department = DepartmentRepository::new(&state.db)
        .create(name, payload.faculty, &AuditStamp::by(&user))
        .await?;

    Ok((StatusCode::CREATED, AppJson(department.into())))
}

/// Get a department by id
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = String, Path, description = "Four-digit department id")),
    responses(
        (status = 200, description = "Department", body = DepartmentResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Departments"
)]
pub async fn get_department(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(department_id): Path<String>,
) -> AppResult<AppJson<DepartmentResponse>> {
    check_id(&department_id)?;
    let department = DepartmentRepository::new(&state.db)
        .find(&department_id, is_privileged(user.as_ref()))
        .await?;
    Ok(AppJson(department.into()))
}

/// Update name, faculty or (staff only) the deleted flag
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = String, Path, description = "Four-digit department id")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Departments"
)]
pub async fn update_department(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(department_id): Path<String>,
    AppJson(payload): AppJson<UpdateDepartmentRequest>,
) -> AppResult<AppJson<DepartmentResponse>> {
    check_id(&department_id)?;
    require_editor(&user)?;
    if payload.is_deleted.is_some() {
        require_staff(&user)?;
    }

    let updates = DepartmentUpdate {
        name: payload
            .name
            .as_deref()
            .map(validate_department_name)
            .transpose()?,
        faculty: payload.faculty,
        is_deleted: payload.is_deleted,
    };

    let department = DepartmentRepository::new(&state.db)
        .update(
            &department_id,
            updates,
            is_privileged(Some(&user)),
            &AuditStamp::by(&user),
        )
        .await?;
    Ok(AppJson(department.into()))
}

/// Soft delete: the row is flagged, not removed
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = String, Path, description = "Four-digit department id")),
    responses(
        (status = 204, description = "Department soft-deleted"),
        (status = 403, description = "Staff only", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Departments"
)]
pub async fn delete_department(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(department_id): Path<String>,
) -> AppResult<StatusCode> {
    check_id(&department_id)?;
    require_staff(&user)?;
    DepartmentRepository::new(&state.db)
        .soft_delete(&department_id, &AuditStamp::by(&user))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permanently remove a department and its courses
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}/hard",
    params(("department_id" = String, Path, description = "Four-digit department id")),
    responses(
        (status = 204, description = "Department removed together with its courses and syllabi"),
        (status = 403, description = "Superuser only", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Departments"
)]
pub async fn hard_delete_department(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(department_id): Path<String>,
) -> AppResult<StatusCode> {
    check_id(&department_id)?;
    require_superuser(&user)?;
    let files = DepartmentRepository::new(&state.db)
        .hard_delete(&department_id)
        .await?;
    for file in files {
        remove_file(&state.config.media_root, &file).await;
    }
    Ok(StatusCode::NO_CONTENT)
}
