use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use super::dto::{
    DEFAULT_VERSION, SyllabusQuery, SyllabusResponse, SyllabusUpdateUpload, SyllabusUpload,
};
use crate::error::{AppError, AppResult};
use crate::extractor::{AppJson, AppMultipart, AppQuery, AuthUser, MaybeAuthUser};
use crate::middleware::permission::{is_privileged, require_editor, require_staff, require_superuser};
use crate::repositories::{NewSyllabus, SyllabusFilter, SyllabusRepository, SyllabusUpdate};
use crate::state::AppState;
use crate::utils::audit::AuditStamp;
use crate::utils::upload::{
    UploadedFile, dated_dir, read_file_field, read_text_field, remove_file, store_file,
    validate_pdf,
};
use crate::utils::validation::validate_version;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/syllabi", get(list_syllabi).post(create_syllabus))
        .route(
            "/api/v1/syllabi/{syllabus_id}",
            get(get_syllabus)
                .put(update_syllabus)
                .patch(update_syllabus)
                .delete(delete_syllabus),
        )
        .route("/api/v1/syllabi/{syllabus_id}/hard", delete(hard_delete_syllabus))
}

/// Parts of a syllabus form as submitted.
#[derive(Default)]
struct SyllabusForm {
    course: Option<String>,
    version: Option<String>,
    description: Option<String>,
    syllabus_file: Option<UploadedFile>,
    is_deleted: Option<String>,
}

async fn read_form(mut multipart: axum::extract::Multipart) -> AppResult<SyllabusForm> {
    let mut form = SyllabusForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::invalid(e.body_text()))?
    {
        match field.name() {
            Some("course") => form.course = Some(read_text_field(field).await?),
            Some("version") => form.version = Some(read_text_field(field).await?),
            Some("description") => form.description = Some(read_text_field(field).await?),
            Some("is_deleted") => form.is_deleted = Some(read_text_field(field).await?),
            Some("syllabus_file") => form.syllabus_file = Some(read_file_field(field).await?),
            _ => {}
        }
    }
    Ok(form)
}

fn parse_id(raw: &str) -> AppResult<i32> {
    raw.parse().map_err(|_| AppError::not_found("Syllabus"))
}

fn parse_bool(field: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" => Ok(true),
        "false" | "0" | "off" => Ok(false),
        _ => Err(AppError::field(field, "Must be a valid boolean.")),
    }
}

async fn save_pdf(state: &AppState, file: &UploadedFile) -> AppResult<String> {
    validate_pdf(file)?;
    store_file(
        &state.config.media_root,
        &dated_dir("syllabi"),
        &file.file_name,
        &file.data,
    )
    .await
}

#[utoipa::path(
    get,
    path = "/api/v1/syllabi",
    params(SyllabusQuery),
    responses(
        (status = 200, description = "Syllabi", body = [SyllabusResponse]),
    ),
    tag = "Syllabi"
)]
pub async fn list_syllabi(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    AppQuery(query): AppQuery<SyllabusQuery>,
) -> AppResult<AppJson<Vec<SyllabusResponse>>> {
    let filter = SyllabusFilter {
        course: query.course,
        version: query.version,
        is_deleted: query.is_deleted,
        search: query.search,
        ordering: query.ordering,
    };
    let syllabi = SyllabusRepository::new(&state.db)
        .list(filter, is_privileged(user.as_ref()))
        .await?;

    Ok(AppJson(
        syllabi
            .into_iter()
            .map(|s| SyllabusResponse::from_model(s, &state.config))
            .collect(),
    ))
}

/// Upload a syllabus PDF for a course
#[utoipa::path(
    post,
    path = "/api/v1/syllabi",
    request_body(content = SyllabusUpload, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Syllabus uploaded", body = SyllabusResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
        (status = 403, description = "Admin, teacher or staff only", body = crate::error::ErrorBody),
    ),
    tag = "Syllabi"
)]
pub async fn create_syllabus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<(StatusCode, AppJson<SyllabusResponse>)> {
    require_editor(&user)?;
    let form = read_form(multipart).await?;

    let course = form
        .course
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::field("course", "This field is required."))?;
    let version = match form.version.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => validate_version(v)?,
        _ => DEFAULT_VERSION.to_string(),
    };
    let description = form.description.filter(|d| !d.trim().is_empty());
    let file = form
        .syllabus_file
        .ok_or_else(|| AppError::field("syllabus_file", "No file was submitted."))?;

    let stored = save_pdf(&state, &file).await?;
    let created = SyllabusRepository::new(&state.db)
        .create(
            NewSyllabus {
                course,
                version,
                description,
                syllabus_file: stored.clone(),
            },
            &AuditStamp::by(&user),
        )
        .await;

    match created {
        Ok(syllabus) => Ok((
            StatusCode::CREATED,
            AppJson(SyllabusResponse::from_model(syllabus, &state.config)),
        )),
        Err(e) => {
            remove_file(&state.config.media_root, &stored).await;
            Err(e)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/syllabi/{syllabus_id}",
    params(("syllabus_id" = i32, Path, description = "Syllabus id")),
    responses(
        (status = 200, description = "Syllabus", body = SyllabusResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Syllabi"
)]
pub async fn get_syllabus(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(syllabus_id): Path<String>,
) -> AppResult<AppJson<SyllabusResponse>> {
    let syllabus = SyllabusRepository::new(&state.db)
        .find(parse_id(&syllabus_id)?, is_privileged(user.as_ref()))
        .await?;
    Ok(AppJson(SyllabusResponse::from_model(syllabus, &state.config)))
}

/// Partial update; a new file replaces the stored one
#[utoipa::path(
    put,
    path = "/api/v1/syllabi/{syllabus_id}",
    params(("syllabus_id" = i32, Path, description = "Syllabus id")),
    request_body(content = SyllabusUpdateUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Syllabus updated", body = SyllabusResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 403, description = "Forbidden", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Syllabi"
)]
pub async fn update_syllabus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(syllabus_id): Path<String>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<AppJson<SyllabusResponse>> {
    require_editor(&user)?;
    let id = parse_id(&syllabus_id)?;
    let form = read_form(multipart).await?;

    let is_deleted = form
        .is_deleted
        .as_deref()
        .map(|raw| parse_bool("is_deleted", raw))
        .transpose()?;
    if is_deleted.is_some() {
        require_staff(&user)?;
    }

    let include_deleted = is_privileged(Some(&user));
    let repository = SyllabusRepository::new(&state.db);
    let previous = repository.find(id, include_deleted).await?;

    let mut updates = SyllabusUpdate {
        course: form
            .course
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        version: form
            .version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(validate_version)
            .transpose()?,
        description: form
            .description
            .map(|d| Some(d).filter(|d| !d.trim().is_empty())),
        syllabus_file: None,
        is_deleted,
    };

    if let Some(file) = form.syllabus_file.as_ref() {
        updates.syllabus_file = Some(save_pdf(&state, file).await?);
    }
    let stored = updates.syllabus_file.clone();

    match repository
        .update(id, updates, include_deleted, &AuditStamp::by(&user))
        .await
    {
        Ok(syllabus) => {
            if stored.is_some() {
                remove_file(&state.config.media_root, &previous.syllabus_file).await;
            }
            Ok(AppJson(SyllabusResponse::from_model(syllabus, &state.config)))
        }
        Err(e) => {
            if let Some(stored) = stored {
                remove_file(&state.config.media_root, &stored).await;
            }
            Err(e)
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/syllabi/{syllabus_id}",
    params(("syllabus_id" = i32, Path, description = "Syllabus id")),
    responses(
        (status = 204, description = "Syllabus soft-deleted"),
        (status = 403, description = "Staff only", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Syllabi"
)]
pub async fn delete_syllabus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(syllabus_id): Path<String>,
) -> AppResult<StatusCode> {
    require_staff(&user)?;
    SyllabusRepository::new(&state.db)
        .soft_delete(parse_id(&syllabus_id)?, &AuditStamp::by(&user))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/syllabi/{syllabus_id}/hard",
    params(("syllabus_id" = i32, Path, description = "Syllabus id")),
    responses(
        (status = 204, description = "Syllabus and its file removed"),
        (status = 403, description = "Superuser only", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "Syllabi"
)]
pub async fn hard_delete_syllabus(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(syllabus_id): Path<String>,
) -> AppResult<StatusCode> {
    require_superuser(&user)?;
    let removed = SyllabusRepository::new(&state.db)
        .hard_delete(parse_id(&syllabus_id)?)
        .await?;
    remove_file(&state.config.media_root, &removed.syllabus_file).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_form_values() {
        assert!(parse_bool("is_deleted", "True").unwrap());
        assert!(!parse_bool("is_deleted", "0").unwrap());
        assert!(parse_bool("is_deleted", "maybe").is_err());
    }

    #[test]
    fn non_numeric_id_is_not_found() {
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound(_))));
        assert_eq!(parse_id("42").unwrap(), 42);
    }
}
