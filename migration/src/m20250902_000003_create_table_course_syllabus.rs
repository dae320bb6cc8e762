use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_table_user::User;
use crate::m20250901_000002_create_table_department::Department;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Course::CourseCode)
                            .string_len(10)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Course::CourseName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Course::CourseCategory)
                            .string_len(10)
                            .not_null()
                            .default("COMPULSORY"),
                    )
                    .col(
                        ColumnDef::new(Course::CourseType)
                            .string_len(20)
                            .not_null()
                            .default("THEORY"),
                    )
                    .col(
                        ColumnDef::new(Course::CbcsCategory)
                            .string_len(25)
                            .not_null()
                            .default("CORE"),
                    )
                    .col(
                        ColumnDef::new(Course::MaximumCredit)
                            .small_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Course::MaximumCredit).between(0, 20)),
                    )
                    .col(ColumnDef::new(Course::Discipline).string_len(4).not_null())
                    .col(ColumnDef::new(Course::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(Course::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(ColumnDef::new(Course::UpdatedBy).uuid().null())
                    .col(
                        ColumnDef::new(Course::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Course::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_discipline")
                            .from_tbl(Course::Table)
                            .from_col(Course::Discipline)
                            .to_tbl(Department::Table)
                            .to_col(Department::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_created_by")
                            .from_tbl(Course::Table)
                            .from_col(Course::CreatedBy)
                            .to_tbl(User::Table)
                            .to_col(User::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_updated_by")
                            .from_tbl(Course::Table)
                            .from_col(Course::UpdatedBy)
                            .to_tbl(User::Table)
                            .to_col(User::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_course_discipline")
                    .table(Course::Table)
                    .col(Course::Discipline)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Syllabus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Syllabus::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Syllabus::Course).string_len(10).not_null())
                    .col(ColumnDef::new(Syllabus::CourseName).string_len(255).not_null())
                    .col(ColumnDef::new(Syllabus::SyllabusFile).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Syllabus::Version)
                            .string_len(10)
                            .not_null()
                            .default("1.0"),
                    )
                    .col(ColumnDef::new(Syllabus::Description).text().null())
                    .col(ColumnDef::new(Syllabus::UploadedBy).uuid().null())
                    .col(
                        ColumnDef::new(Syllabus::UploadedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(ColumnDef::new(Syllabus::UpdatedBy).uuid().null())
                    .col(
                        ColumnDef::new(Syllabus::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Syllabus::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_syllabus_course")
                            .from_tbl(Syllabus::Table)
                            .from_col(Syllabus::Course)
                            .to_tbl(Course::Table)
                            .to_col(Course::CourseCode)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_syllabus_uploaded_by")
                            .from_tbl(Syllabus::Table)
                            .from_col(Syllabus::UploadedBy)
                            .to_tbl(User::Table)
                            .to_col(User::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_syllabus_updated_by")
                            .from_tbl(Syllabus::Table)
                            .from_col(Syllabus::UpdatedBy)
                            .to_tbl(User::Table)
                            .to_col(User::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_syllabus_course_version")
                    .table(Syllabus::Table)
                    .col(Syllabus::Course)
                    .col(Syllabus::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_syllabus_uploaded_at")
                    .table(Syllabus::Table)
                    .col(Syllabus::UploadedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Syllabus::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Course::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Course {
    Table,
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

#[derive(DeriveIden)]
enum Syllabus {
    Table,
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
