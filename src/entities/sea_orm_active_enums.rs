//! `SeaORM` active enums shared by the entity modules

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum RoleEnum {
    #[sea_orm(string_value = "student")]
    #[default]
    Student,
    #[sea_orm(string_value = "teacher")]
    Teacher,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Faculties a department can belong to. Stored and serialized by code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(4))")]
pub enum Faculty {
    #[sea_orm(string_value = "I&C")]
    #[serde(rename = "I&C")]
    InformationComputing,
    #[sea_orm(string_value = "E&T")]
    #[serde(rename = "E&T")]
    EngineeringTechnology,
    #[sea_orm(string_value = "I&R")]
    #[serde(rename = "I&R")]
    InterdisciplinaryResearch,
    #[sea_orm(string_value = "LS")]
    #[serde(rename = "LS")]
    LifeSciences,
    #[sea_orm(string_value = "LAMS")]
    #[serde(rename = "LAMS")]
    LiberalArtsMedia,
    #[sea_orm(string_value = "MS")]
    #[serde(rename = "MS")]
    ManagementStudies,
    #[sea_orm(string_value = "SC")]
    #[serde(rename = "SC")]
    Sciences,
    #[sea_orm(string_value = "CCSD")]
    #[serde(rename = "CCSD")]
    Ccsd,
}

impl Faculty {
    pub fn label(&self) -> &'static str {
        match self {
            Self::InformationComputing => "Information Computing",
            Self::EngineeringTechnology => "Engineering Technology",
            Self::InterdisciplinaryResearch => "Interdisciplinary Research",
            Self::LifeSciences => "Life Sciences",
            Self::LiberalArtsMedia => "Liberal Arts Media",
            Self::ManagementStudies => "Management Studies",
            Self::Sciences => "Sciences",
            Self::Ccsd => "Ccsd",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(10))",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseCategory {
    #[default]
    Compulsory,
    Elective,
}

impl CourseCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Compulsory => "Compulsory",
            Self::Elective => "Elective",
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(20))",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseType {
    Dissertation,
    Laboratory,
    Practical,
    Project,
    #[default]
    Theory,
    TheoryAndPractical,
    Tutorial,
}

impl CourseType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dissertation => "Dissertation",
            Self::Laboratory => "Laboratory",
            Self::Practical => "Practical",
            Self::Project => "Project",
            Self::Theory => "Theory",
            Self::TheoryAndPractical => "Theory and Practical",
            Self::Tutorial => "Tutorial",
        }
    }
}

/// Choice Based Credit System classification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema)]
#[sea_orm(
    rs_type = "String",
    db_type = "String(StringLen::N(25))",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CbcsCategory {
    Major,
    Minor,
    #[default]
    Core,
    Dse,
    Ge,
    Oe,
    Vac,
    Aecc,
    Sec,
    Mdc,
    Idc,
}

impl CbcsCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Core => "Core",
            Self::Dse => "Discipline Specific Elective",
            Self::Ge => "Generic Elective",
            Self::Oe => "Open Elective",
            Self::Vac => "Value Added Course",
            Self::Aecc => "Ability Enhancement Compulsory Course",
            Self::Sec => "Skill Enhancement Course",
            Self::Mdc => "Multi-Disciplinary Course",
            Self::Idc => "Inter-Disciplinary Course",
        }
    }
}

