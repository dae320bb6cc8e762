use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::syllabus;

pub const DEFAULT_VERSION: &str = "1.0";

/// Multipart body of `POST /syllabi`.
#[derive(Debug, ToSchema)]
pub struct SyllabusUpload {
    #[schema(example = "CSE-101-V1")]
    pub course: String,
    /// Defaults to `1.0`
    #[schema(example = "1.0")]
    pub version: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub syllabus_file: Vec<u8>,
}

/// Multipart body of `PUT /syllabi/{id}`. Every part is optional.
#[derive(Debug, ToSchema)]
pub struct SyllabusUpdateUpload {
    pub course: Option<String>,
    pub version: Option<String>,
    /// An empty part clears the description
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub syllabus_file: Option<Vec<u8>>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SyllabusQuery {
    /// Course code
    pub course: Option<String>,
    pub version: Option<String>,
    pub is_deleted: Option<bool>,
    /// Matches course code, course name or version
    pub search: Option<String>,
    /// `course`, `version`, `uploaded_at` or `updated_at`; prefix `-` for descending
    pub ordering: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SyllabusResponse {
    pub id: i32,
    pub course: String,
    pub course_name: String,
    /// Public URL of the PDF
    pub syllabus_file: String,
    pub version: String,
    pub description: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: NaiveDateTime,
    pub updated_by: Option<Uuid>,
    pub updated_at: NaiveDateTime,
    pub is_deleted: bool,
}

impl SyllabusResponse {
    pub fn from_model(s: syllabus::Model, config: &Config) -> Self {
        Self {
            id: s.id,
            syllabus_file: config.media_url_for(&s.syllabus_file),
            course: s.course,
            course_name: s.course_name,
            version: s.version,
            description: s.description,
            uploaded_by: s.uploaded_by,
            uploaded_at: s.uploaded_at,
            updated_by: s.updated_by,
            updated_at: s.updated_at,
            is_deleted: s.is_deleted,
        }
    }
}
