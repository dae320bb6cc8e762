use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_table_user::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Department::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Department::Id)
                            .string_len(4)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Department::Name).string_len(50).not_null())
                    .col(ColumnDef::new(Department::Faculty).string_len(4).not_null())
                    .col(ColumnDef::new(Department::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(Department::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(ColumnDef::new(Department::UpdatedBy).uuid().null())
                    .col(
                        ColumnDef::new(Department::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Department::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_created_by")
                            .from_tbl(Department::Table)
                            .from_col(Department::CreatedBy)
                            .to_tbl(User::Table)
                            .to_col(User::UserId)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_updated_by")
                            .from_tbl(Department::Table)
                            .from_col(Department::UpdatedBy)
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
                    .name("idx_department_faculty")
                    .table(Department::Table)
                    .col(Department::Faculty)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_created_at")
                    .table(Department::Table)
                    .col(Department::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Partial unique index: (name, faculty) only has to be unique among active rows.
        // Both PostgreSQL and SQLite accept this form.
        let db = manager.get_connection();
        sea_orm::ConnectionTrait::execute(
            db,
            sea_orm::Statement::from_string(
                manager.get_database_backend(),
                "CREATE UNIQUE INDEX IF NOT EXISTS uq_department_active_name_faculty \
                 ON department (name, faculty) WHERE is_deleted = false;"
                    .to_string(),
            ),
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        sea_orm::ConnectionTrait::execute(
            db,
            sea_orm::Statement::from_string(
                manager.get_database_backend(),
                "DROP INDEX IF EXISTS uq_department_active_name_faculty;".to_string(),
            ),
        )
        .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_department_created_at")
                    .table(Department::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_department_faculty")
                    .table(Department::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Department::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Department {
    Table,
    Id,
    Name,
    Faculty,
    CreatedBy,
    CreatedAt,
    UpdatedBy,
    UpdatedAt,
    IsDeleted,
}
