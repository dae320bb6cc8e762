use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::course;
use crate::entities::sea_orm_active_enums::{CbcsCategory, CourseCategory, CourseType};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    #[schema(example = "CSE-101-V1")]
    pub course_code: String,

    #[schema(example = "Introduction to Programming")]
    pub course_name: String,

    #[serde(default)]
    pub course_category: CourseCategory,

    #[serde(rename = "type", default)]
    pub course_type: CourseType,

    #[serde(default)]
    pub cbcs_category: CbcsCategory,

    #[serde(default)]
    #[schema(minimum = 0, maximum = 20)]
    pub maximum_credit: i16,

    /// Department id
    #[schema(example = "1000")]
    pub discipline: String,
}

/// The course code is the key and cannot be changed.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub course_name: Option<String>,
    pub course_category: Option<CourseCategory>,
    #[serde(rename = "type")]
    pub course_type: Option<CourseType>,
    pub cbcs_category: Option<CbcsCategory>,
    pub maximum_credit: Option<i16>,
    pub discipline: Option<String>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    /// Department id
    pub discipline: Option<String>,
    pub course_category: Option<CourseCategory>,
    #[serde(rename = "type")]
    pub course_type: Option<CourseType>,
    pub cbcs_category: Option<CbcsCategory>,
    pub is_deleted: Option<bool>,
    /// Matches course code or name
    pub search: Option<String>,
    /// `course_code`, `course_name`, `created_at` or `updated_at`; prefix `-` for descending
    pub ordering: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub course_code: String,
    pub course_name: String,
    pub course_category: CourseCategory,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    pub cbcs_category: CbcsCategory,
    pub maximum_credit: i16,
    pub discipline: String,
    pub created_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_by: Option<Uuid>,
    pub updated_at: NaiveDateTime,
    pub is_deleted: bool,
}

impl From<course::Model> for CourseResponse {
    fn from(c: course::Model) -> Self {
        Self {
            course_code: c.course_code,
            course_name: c.course_name,
            course_category: c.course_category,
            course_type: c.course_type,
            cbcs_category: c.cbcs_category,
            maximum_credit: c.maximum_credit,
            discipline: c.discipline,
            created_by: c.created_by,
            created_at: c.created_at,
            updated_by: c.updated_by,
            updated_at: c.updated_at,
            is_deleted: c.is_deleted,
        }
    }
}
