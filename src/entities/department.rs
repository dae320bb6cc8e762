//! `SeaORM` Entity for department table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Faculty;

#[derive(Copy, Clone, Default, Debug, DeriveEntity)]
pub struct Entity;

impl EntityName for Entity {
    fn table_name(&self) -> &str {
        "department"
    }
}

#[derive(Clone, Debug, PartialEq, DeriveModel, DeriveActiveModel, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(skip_deserializing)]
    pub id: String,
    pub name: String,
    pub faculty: Faculty,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime,
    pub is_deleted: bool,
}

impl Model {
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveColumn)]
pub enum Column {
    Id,
    Name,
    Faculty,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
    IsDeleted,
}

#[derive(Copy, Clone, Debug, EnumIter, DerivePrimaryKey)]
pub enum PrimaryKey {
    Id,
}

impl PrimaryKeyTrait for PrimaryKey {
    type ValueType = String;
    fn auto_increment() -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Course,
    CreatedBy,
    UpdatedBy,
}

impl ColumnTrait for Column {
    type EntityName = Entity;
    fn def(&self) -> ColumnDef {
        match self {
            Self::Id => ColumnType::String(StringLen::N(4)).def(),
            Self::Name => ColumnType::String(StringLen::N(50)).def(),
            Self::Faculty => Faculty::db_type(),
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
            Self::Course => Entity::has_many(super::course::Entity).into(),
            Self::CreatedBy => Entity::belongs_to(super::user::Entity)
                .from(Column::CreatedBy)
                .to(super::user::Column::UserId)
                .into(),
            Self::UpdatedBy => Entity::belongs_to(super::user::Entity)
                .from(Column::UpdatedBy)
                .to(super::user::Column::UserId)
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
