//! `SeaORM` Entity for syllabus table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Default, Debug, DeriveEntity)]
pub struct Entity;

impl EntityName for Entity {
    fn table_name(&self) -> &str {
        "syllabus"
    }
}

#[derive(Clone, Debug, PartialEq, DeriveModel, DeriveActiveModel, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(skip_deserializing)]
    pub id: i32,
    pub course: String,
    pub course_name: String,
    pub syllabus_file: String,
    pub version: String,
    pub description: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveColumn)]
pub enum Column {
    Id,
    Course,
    CourseName,
    SyllabusFile,
    Version,
    Description,
    UploadedBy,
    UploadedAt,
    UpdatedBy,
    UpdatedAt,
    IsDeleted,
}

#[derive(Copy, Clone, Debug, EnumIter, DerivePrimaryKey)]
pub enum PrimaryKey {
    Id,
}

impl PrimaryKeyTrait for PrimaryKey {
    type ValueType = i32;
    fn auto_increment() -> bool {
        true
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Course,
}

impl ColumnTrait for Column {
    type EntityName = Entity;
    fn def(&self) -> ColumnDef {
        match self {
            Self::Id => ColumnType::Integer.def(),
            Self::Course => ColumnType::String(StringLen::N(10)).def(),
            Self::CourseName => ColumnType::String(StringLen::N(255)).def(),
            Self::SyllabusFile => ColumnType::String(StringLen::N(255)).def(),
            Self::Version => ColumnType::String(StringLen::N(10)).def(),
            Self::Description => ColumnType::Text.def().null(),
            Self::UploadedBy => ColumnType::Uuid.def().null(),
            Self::UploadedAt => ColumnType::DateTime.def(),
            Self::UpdatedBy => ColumnType::Uuid.def().null(),
            Self::UpdatedAt => ColumnType::DateTime.def(),
            Self::IsDeleted => ColumnType::Boolean.def(),
        }
    }
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Course => Entity::belongs_to(super::course::Entity)
                .from(Column::Course)
                .to(super::course::Column::CourseCode)
                .into(),
        }
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
