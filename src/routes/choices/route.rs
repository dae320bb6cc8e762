use axum::{Router, routing::get};
use sea_orm::{ActiveEnum, Iterable};

use super::dto::ChoiceResponse;
use crate::entities::sea_orm_active_enums::{CbcsCategory, CourseCategory, CourseType, Faculty};
use crate::extractor::AppJson;
use crate::state::AppState;

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/faculty-choices", get(faculty_choices))
        .route("/api/v1/course-category-choices", get(course_category_choices))
        .route("/api/v1/course-type-choices", get(course_type_choices))
        .route("/api/v1/cbcs-category-choices", get(cbcs_category_choices))
}

fn choices<E>(label: impl Fn(&E) -> &'static str) -> Vec<ChoiceResponse>
where
    E: ActiveEnum<Value = String> + Iterable,
{
    E::iter()
        .map(|variant| ChoiceResponse {
            label: label(&variant).to_string(),
            value: variant.to_value(),
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/v1/faculty-choices",
    responses((status = 200, description = "Faculty codes and labels", body = [ChoiceResponse])),
    tag = "Choices"
)]
pub async fn faculty_choices() -> AppJson<Vec<ChoiceResponse>> {
    AppJson(choices(Faculty::label))
}

#[utoipa::path(
    get,
    path = "/api/v1/course-category-choices",
    responses((status = 200, description = "Course categories", body = [ChoiceResponse])),
    tag = "Choices"
)]
pub async fn course_category_choices() -> AppJson<Vec<ChoiceResponse>> {
    AppJson(choices(CourseCategory::label))
}

#[utoipa::path(
    get,
    path = "/api/v1/course-type-choices",
    responses((status = 200, description = "Course types", body = [ChoiceResponse])),
    tag = "Choices"
)]
pub async fn course_type_choices() -> AppJson<Vec<ChoiceResponse>> {
    AppJson(choices(CourseType::label))
}

#[utoipa::path(
    get,
    path = "/api/v1/cbcs-category-choices",
    responses((status = 200, description = "CBCS categories", body = [ChoiceResponse])),
    tag = "Choices"
)]
pub async fn cbcs_category_choices() -> AppJson<Vec<ChoiceResponse>> {
    AppJson(choices(CbcsCategory::label))
}
