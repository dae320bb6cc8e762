use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::syllabus_repository::syllabus_files_for_courses;
use crate::entities::{course, department, sea_orm_active_enums::Faculty};
use crate::error::{AppError, AppResult};
use crate::utils::audit::{AuditStamp, Audited};

pub const INITIAL_DEPARTMENT_ID: u32 = 1000;
pub const MAX_DEPARTMENT_ID: u32 = 9999;

const DUPLICATE_NAME_FACULTY: &str = "The fields name, faculty must make a unique set.";

#[derive(Debug, Clone, Default)]
pub struct DepartmentFilter {
    pub faculty: Option<Faculty>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    pub faculty: Option<Faculty>,
    pub is_deleted: Option<bool>,
}

pub struct DepartmentRepository<'a> {
    db: &'a DatabaseConnection,
}

/// Parses a stored four-digit id.
fn parse_id(id: &str) -> AppResult<u32> {
    id.parse::<u32>()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Stored department id {id:?} is not numeric")))
}

pub fn format_id(id: u32) -> String {
    format!("{id:04}")
}

async fn ensure_unique_active<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    faculty: Faculty,
    exclude_id: Option<&str>,
) -> AppResult<()> {
    let mut query = department::Entity::find()
        .filter(department::Column::Name.eq(name))
        .filter(department::Column::Faculty.eq(faculty))
        .filter(department::Column::IsDeleted.eq(false));
    if let Some(id) = exclude_id {
        query = query.filter(department::Column::Id.ne(id));
    }

    if query.count(conn).await? > 0 {
        return Err(AppError::invalid(DUPLICATE_NAME_FACULTY));
    }
    Ok(())
}

/// Next id: one past the highest active id (or 1000), stepping over ids still held by
/// soft-deleted rows so they are never handed out twice.
async fn next_department_id<C: ConnectionTrait>(conn: &C) -> AppResult<String> {
    // Ids are fixed-width, so string order is numeric order.
    let last_active = department::Entity::find()
        .filter(department::Column::IsDeleted.eq(false))
        .order_by_desc(department::Column::Id)
        .one(conn)
        .await?;

    let mut next_id = match last_active {
        Some(dept) => parse_id(&dept.id)? + 1,
        None => INITIAL_DEPARTMENT_ID,
    };

    if next_id <= MAX_DEPARTMENT_ID {
        // Everything at or above the candidate is soft-deleted.
        let held = department::Entity::find()
            .filter(department::Column::Id.gte(format_id(next_id)))
            .order_by_asc(department::Column::Id)
            .all(conn)
            .await?;
        for dept in held {
            let id = parse_id(&dept.id)?;
            if id == next_id {
                next_id += 1;
            } else if id > next_id {
                break;
            }
        }
    }

    if next_id > MAX_DEPARTMENT_ID {
        return Err(AppError::Capacity(format!(
            "Department ID cannot exceed {MAX_DEPARTMENT_ID}"
        )));
    }
    Ok(format_id(next_id))
}

impl<'a> DepartmentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Allocates the id and inserts in one transaction. The transaction takes the
    /// write lock before reading, so concurrent creators serialize: a table lock on
    /// PostgreSQL, a no-op write on SQLite (the equivalent of `BEGIN IMMEDIATE`).
    pub async fn create(
        &self,
        name: String,
        faculty: Faculty,
        stamp: &AuditStamp,
    ) -> AppResult<department::Model> {
        let txn = self.db.begin().await?;

        match txn.get_database_backend() {
            DatabaseBackend::Postgres => {
                txn.execute_unprepared("LOCK TABLE department IN SHARE ROW EXCLUSIVE MODE")
                    .await?;
            }
            DatabaseBackend::Sqlite => {
                // A write as the first statement waits on the busy timeout instead of
                // failing with SQLITE_BUSY when upgrading a read lock.
                txn.execute_unprepared("UPDATE department SET is_deleted = is_deleted WHERE 1 = 0")
                    .await?;
            }
            _ => {}
        }

        ensure_unique_active(&txn, &name, faculty, None).await?;
        let id = next_department_id(&txn).await?;

        let mut model = department::ActiveModel {
            id: Set(id),
            name: Set(name),
            faculty: Set(faculty),
            is_deleted: Set(false),
            ..Default::default()
        };
        model.stamp_created(stamp);

        let department = model.insert(&txn).await?;
        txn.commit().await?;

        tracing::info!(
            "Department {} created: {} ({:?})",
            department.id,
            department.name,
            department.faculty
        );
        Ok(department)
    }

    /// `include_deleted` is only set for staff callers.
    pub async fn find(&self, id: &str, include_deleted: bool) -> AppResult<department::Model> {
        let mut query = department::Entity::find_by_id(id.to_string());
        if !include_deleted {
            query = query.filter(department::Column::IsDeleted.eq(false));
        }
        query
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Department"))
    }

    pub async fn list(
        &self,
        filter: DepartmentFilter,
        include_deleted: bool,
    ) -> AppResult<Vec<department::Model>> {
        let mut query = department::Entity::find();
        if !include_deleted {
            query = query.filter(department::Column::IsDeleted.eq(false));
        }
        if let Some(faculty) = filter.faculty {
            query = query.filter(department::Column::Faculty.eq(faculty));
        }
        if let Some(is_deleted) = filter.is_deleted {
            query = query.filter(department::Column::IsDeleted.eq(is_deleted));
        }

        let departments = query
            .order_by_asc(department::Column::Id)
            .all(self.db)
            .await?;
        Ok(departments)
    }

    pub async fn update(
        &self,
        id: &str,
        updates: DepartmentUpdate,
        include_deleted: bool,
        stamp: &AuditStamp,
    ) -> AppResult<department::Model> {
        let current = self.find(id, include_deleted).await?;

        let name = updates.name.clone().unwrap_or_else(|| current.name.clone());
        let faculty = updates.faculty.unwrap_or(current.faculty);
        let is_deleted = updates.is_deleted.unwrap_or(current.is_deleted);
        if !is_deleted {
            ensure_unique_active(self.db, &name, faculty, Some(&current.id)).await?;
        }

        let mut active_model: department::ActiveModel = current.into();
        if let Some(name) = updates.name {
            active_model.name = Set(name);
        }
        if let Some(faculty) = updates.faculty {
            active_model.faculty = Set(faculty);
        }
        if let Some(is_deleted) = updates.is_deleted {
            active_model.set_deleted(is_deleted);
        }
        active_model.stamp_updated(stamp);

        let result = active_model.update(self.db).await?;
        Ok(result)
    }

    /// Flags the row as deleted; it stays in storage.
    pub async fn soft_delete(&self, id: &str, stamp: &AuditStamp) -> AppResult<department::Model> {
        let department = self.find(id, true).await?;

        let mut active_model: department::ActiveModel = department.into();
        active_model.set_deleted(true);
        active_model.stamp_updated(stamp);

        let result = active_model.update(self.db).await?;
        tracing::info!("Department {} soft-deleted", result.id);
        Ok(result)
    }

    /// Removes the department; its courses and their syllabi go by cascade.
    /// Returns the syllabus file paths so the caller can delete them from storage.
    pub async fn hard_delete(&self, id: &str) -> AppResult<Vec<String>> {
        let department = self.find(id, true).await?;

        let txn = self.db.begin().await?;
        let course_codes: Vec<String> = course::Entity::find()
            .select_only()
            .column(course::Column::CourseCode)
            .filter(course::Column::Discipline.eq(department.id.as_str()))
            .into_tuple()
            .all(&txn)
            .await?;
        let files = syllabus_files_for_courses(&txn, course_codes).await?;
        department::Entity::delete_by_id(department.id.clone())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::warn!(
            "Department {} permanently deleted with {} syllabus file(s)",
            department.id,
            files.len()
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{setup_db, setup_file_db, staff_stamp};

    #[tokio::test]
    async fn ids_start_at_1000_and_increase() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        let names = ["Computer Science", "Physics", "Chemistry", "Arts & Media"];
        let mut ids = Vec::new();
        for name in names {
            let dept = repo
                .create(name.to_string(), Faculty::Sciences, &stamp)
                .await
                .unwrap();
            ids.push(dept.id);
        }

        assert_eq!(ids, vec!["1000", "1001", "1002", "1003"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_get_distinct_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let db = setup_file_db(&dir.path().join("departments.db"), 8).await;
        let stamp = staff_stamp(&db).await;

        let mut tasks = tokio::task::JoinSet::new();
        for letter in 'A'..='H' {
            let db = db.clone();
            tasks.spawn(async move {
                DepartmentRepository::new(&db)
                    .create(format!("Department {letter}"), Faculty::Sciences, &stamp)
                    .await
            });
        }

        let mut ids = Vec::new();
        while let Some(result) = tasks.join_next().await {
            ids.push(result.unwrap().unwrap().id);
        }
        ids.sort();
        let expected: Vec<String> = (1000..1008).map(format_id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reassigned() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        let cs = repo
            .create("Computer Science".into(), Faculty::InformationComputing, &stamp)
            .await
            .unwrap();
        assert_eq!(cs.id, "1000");

        let dup = repo
            .create("Computer Science".into(), Faculty::InformationComputing, &stamp)
            .await
            .unwrap_err();
        assert!(matches!(dup, AppError::Validation { .. }));

        repo.soft_delete(&cs.id, &stamp).await.unwrap();

        let physics = repo
            .create("Physics".into(), Faculty::Sciences, &stamp)
            .await
            .unwrap();
        assert_eq!(physics.id, "1001");

        let deleted = repo.find("1000", true).await.unwrap();
        assert!(deleted.is_deleted);
        assert!(repo.find("1000", false).await.is_err());
    }

    #[tokio::test]
    async fn no_gap_filling_below_active_maximum() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        for name in ["Alpha", "Beta", "Gamma", "Delta", "Epsilon", "Zeta"] {
            repo.create(name.into(), Faculty::Sciences, &stamp)
                .await
                .unwrap();
        }
        repo.soft_delete("1000", &stamp).await.unwrap();

        let next = repo
            .create("Eta".into(), Faculty::Sciences, &stamp)
            .await
            .unwrap();
        assert_eq!(next.id, "1006");
    }

    #[tokio::test]
    async fn capacity_is_exhausted_above_9999() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        let mut top = department::ActiveModel {
            id: Set("9999".into()),
            name: Set("Last".into()),
            faculty: Set(Faculty::Sciences),
            is_deleted: Set(false),
            ..Default::default()
        };
        top.stamp_created(&stamp);
        top.insert(&db).await.unwrap();

        let err = repo
            .create("Overflow".into(), Faculty::Sciences, &stamp)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));

        let all = repo.list(DepartmentFilter::default(), true).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn same_pair_allowed_again_after_soft_delete() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        let first = repo
            .create("Biology".into(), Faculty::LifeSciences, &stamp)
            .await
            .unwrap();
        repo.soft_delete(&first.id, &stamp).await.unwrap();

        let second = repo
            .create("Biology".into(), Faculty::LifeSciences, &stamp)
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        // Restoring the first would now clash with the active one.
        let err = repo
            .update(
                &first.id,
                DepartmentUpdate {
                    is_deleted: Some(false),
                    ..Default::default()
                },
                true,
                &stamp,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn listing_hides_deleted_rows_from_the_public() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        repo.create("Music".into(), Faculty::LiberalArtsMedia, &stamp)
            .await
            .unwrap();
        let gone = repo
            .create("Drama".into(), Faculty::LiberalArtsMedia, &stamp)
            .await
            .unwrap();
        repo.soft_delete(&gone.id, &stamp).await.unwrap();

        let public = repo.list(DepartmentFilter::default(), false).await.unwrap();
        assert_eq!(public.len(), 1);

        let deleted_only = repo
            .list(
                DepartmentFilter {
                    is_deleted: Some(true),
                    ..Default::default()
                },
                true,
            )
            .await
            .unwrap();
        assert_eq!(deleted_only.len(), 1);
        assert_eq!(deleted_only[0].id, gone.id);
    }

    #[tokio::test]
    async fn update_and_soft_delete_refresh_audit_fields() {
        let db = setup_db().await;
        let creator = staff_stamp(&db).await;
        let repo = DepartmentRepository::new(&db);

        let dept = repo
            .create("Economics".into(), Faculty::ManagementStudies, &creator)
            .await
            .unwrap();
        assert_eq!(dept.created_by, Some(creator.user_id));
        let stored = repo.find(&dept.id, false).await.unwrap();

        let editor = staff_stamp(&db).await;
        let updated = repo
            .update(
                &dept.id,
                DepartmentUpdate {
                    name: Some("Applied Economics".into()),
                    ..Default::default()
                },
                false,
                &editor,
            )
            .await
            .unwrap();

        assert_eq!(updated.id, dept.id);
        assert_eq!(updated.created_by, Some(creator.user_id));
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.updated_by, Some(editor.user_id));
    }
}
