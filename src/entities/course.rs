//! `SeaORM` Entity for course table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CbcsCategory, CourseCategory, CourseType};

#[derive(Copy, Clone, Default, Debug, DeriveEntity)]
pub struct Entity;

impl EntityName for Entity {
    fn table_name(&self) -> &str {
        "course"
    }
}

#[derive(Clone, Debug, PartialEq, DeriveModel, DeriveActiveModel, Eq, Serialize, Deserialize)]
pub struct Model {
    pub course_code: String,
    pub course_name: String,
    pub course_category: CourseCategory,
    pub course_type: CourseType,
    pub cbcs_category: CbcsCategory,
    pub maximum_credit: i16,
    pub discipline: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime,
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveColumn)]
pub enum Column {
    CourseCode,
    CourseName,
    CourseCategory,
    CourseType,
    CbcsCategory,
    MaximumCredit,
    Discipline,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
    IsDeleted,
}

#[derive(Copy, Clone, Debug, EnumIter, DerivePrimaryKey)]
pub enum PrimaryKey {
    CourseCode,
}

impl PrimaryKeyTrait for PrimaryKey {
    type ValueType = String;
    fn auto_increment() -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Department,
    Syllabus,
}

impl ColumnTrait for Column {
    type EntityName = Entity;
    fn def(&self) -> ColumnDef {
        match self {
            Self::CourseCode => ColumnType::String(StringLen::N(10)).def(),
            Self::CourseName => ColumnType::String(StringLen::N(255)).def(),
            Self::CourseCategory => CourseCategory::db_type(),
            Self::CourseType => CourseType::db_type(),
            Self::CbcsCategory => CbcsCategory::db_type(),
            Self::MaximumCredit => ColumnType::SmallInteger.def(),
            Self::Discipline => ColumnType::String(StringLen::N(4)).def(),
            Self::CreatedBy => ColumnType::Uuid.def().null(),
            Self::CreatedAt => ColumnType::DateTime.def(),
            Self::UpdatedBy => ColumnType::Uuid.def().null(),
            Self::UpdatedAt => ColumnType::DateTime.def(),
            Self::IsDeleted => ColumnType::Boolean.def(),
        }
    }
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Department => Entity::belongs_to(super::department::Entity)
                .from(Column::Discipline)
                .to(super::department::Column::Id)
                .into(),
            Self::Syllabus => Entity::has_many(super::syllabus::Entity).into(),
        }
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::syllabus::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Syllabus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
