use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::{department, sea_orm_active_enums::Faculty};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    #[schema(example = "Computer Science")]
    pub name: String,

    #[schema(example = "I&C")]
    pub faculty: Faculty,
}

/// All fields optional. `is_deleted` is staff-only.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub faculty: Option<Faculty>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DepartmentQuery {
    /// Faculty code, e.g. `I&C`
    pub faculty: Option<Faculty>,
    /// Only honoured for staff; others never see deleted rows
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentResponse {
    #[schema(example = "1000")]
    pub id: String,
    pub name: String,
    pub faculty: Faculty,
    pub faculty_label: String,
    pub created_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_by: Option<Uuid>,
    pub updated_at: NaiveDateTime,
    pub is_deleted: bool,
}

impl From<department::Model> for DepartmentResponse {
    fn from(d: department::Model) -> Self {
        Self {
            faculty_label: d.faculty.label().to_string(),
            id: d.id,
            name: d.name,
            faculty: d.faculty,
            created_by: d.created_by,
            created_at: d.created_at,
            updated_by: d.updated_by,
            updated_at: d.updated_at,
            is_deleted: d.is_deleted,
        }
    }
}
