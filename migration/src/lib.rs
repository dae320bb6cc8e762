pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_table_user;
mod m20250901_000002_create_table_department;
mod m20250902_000003_create_table_course_syllabus;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_table_user::Migration),
            Box::new(m20250901_000002_create_table_department::Migration),
            Box::new(m20250902_000003_create_table_course_syllabus::Migration),
        ]
    }
}
