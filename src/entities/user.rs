//! `SeaORM` Entity for user table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::RoleEnum;

pub const DEFAULT_PROFILE_PICTURE: &str = "profile_pics/default.jpg";

#[derive(Copy, Clone, Default, Debug, DeriveEntity)]
pub struct Entity;

impl EntityName for Entity {
    fn table_name(&self) -> &str {
        "user"
    }
}

#[derive(Clone, Debug, PartialEq, DeriveModel, DeriveActiveModel, Eq, Serialize, Deserialize)]
pub struct Model {
    #[serde(skip_deserializing)]
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub mobile_number: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub role: RoleEnum,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime,
    pub last_updated: DateTime,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveColumn)]
pub enum Column {
    UserId,
    Email,
    FirstName,
    LastName,
    Password,
    MobileNumber,
    ProfilePicture,
    Bio,
    Role,
    IsEmailVerified,
    IsActive,
    IsStaff,
    IsSuperuser,
    DateJoined,
    LastUpdated,
}

#[derive(Copy, Clone, Debug, EnumIter, DerivePrimaryKey)]
pub enum PrimaryKey {
    UserId,
}

impl PrimaryKeyTrait for PrimaryKey {
    type ValueType = Uuid;
    fn auto_increment() -> bool {
        false
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl ColumnTrait for Column {
    type EntityName = Entity;
    fn def(&self) -> ColumnDef {
        match self {
            Self::UserId => ColumnType::Uuid.def(),
            Self::Email => ColumnType::String(StringLen::N(255)).def().unique(),
            Self::FirstName => ColumnType::String(StringLen::N(50)).def(),
            Self::LastName => ColumnType::String(StringLen::N(50)).def(),
            Self::Password => ColumnType::String(StringLen::None).def(),
            Self::MobileNumber => ColumnType::String(StringLen::N(13)).def().null().unique(),
            Self::ProfilePicture => ColumnType::String(StringLen::N(255)).def().null(),
            Self::Bio => ColumnType::Text.def().null(),
            Self::Role => RoleEnum::db_type(),
            Self::IsEmailVerified => ColumnType::Boolean.def(),
            Self::IsActive => ColumnType::Boolean.def(),
            Self::IsStaff => ColumnType::Boolean.def(),
            Self::IsSuperuser => ColumnType::Boolean.def(),
            Self::DateJoined => ColumnType::DateTime.def(),
            Self::LastUpdated => ColumnType::DateTime.def(),
        }
    }
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}
