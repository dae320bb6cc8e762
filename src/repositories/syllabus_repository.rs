use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::{OrderBy, contains_pattern, parse_ordering};
use crate::entities::{course, syllabus};
use crate::error::{AppError, AppResult};
use crate::utils::audit::{AuditStamp, Audited};

pub const SYLLABUS_ORDERING_FIELDS: &[&str] = &["course", "version", "uploaded_at", "updated_at"];

const DUPLICATE_COURSE_VERSION: &str = "The fields course, version must make a unique set.";

#[derive(Debug, Clone)]
pub struct NewSyllabus {
    pub course: String,
    pub version: String,
    pub description: Option<String>,
    /// Path relative to the media root.
    pub syllabus_file: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyllabusUpdate {
    pub course: Option<String>,
    pub version: Option<String>,
    pub description: Option<Option<String>>,
    pub syllabus_file: Option<String>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct SyllabusFilter {
    pub course: Option<String>,
    pub version: Option<String>,
    pub is_deleted: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// Stored file paths of every syllabus, deleted or not, under the given courses.
pub(crate) async fn syllabus_files_for_courses<C: ConnectionTrait>(
    conn: &C,
    course_codes: Vec<String>,
) -> AppResult<Vec<String>> {
    if course_codes.is_empty() {
        return Ok(Vec::new());
    }
    let files = syllabus::Entity::find()
        .select_only()
        .column(syllabus::Column::SyllabusFile)
        .filter(syllabus::Column::Course.is_in(course_codes))
        .into_tuple::<String>()
        .all(conn)
        .await?;
    Ok(files)
}

pub struct SyllabusRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SyllabusRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Syllabi may only point at active courses.
    async fn active_course(&self, course_code: &str) -> AppResult<course::Model> {
        course::Entity::find_by_id(course_code.to_string())
            .filter(course::Column::IsDeleted.eq(false))
            .one(self.db)
            .await?
            .ok_or_else(|| {
                AppError::field(
                    "course",
                    format!("Invalid pk \"{course_code}\" - object does not exist."),
                )
            })
    }

    async fn ensure_unique_version(
        &self,
        course_code: &str,
        version: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<()> {
        let mut query = syllabus::Entity::find()
            .filter(syllabus::Column::Course.eq(course_code))
            .filter(syllabus::Column::Version.eq(version));
        if let Some(id) = exclude_id {
            query = query.filter(syllabus::Column::Id.ne(id));
        }
        if query.count(self.db).await? > 0 {
            return Err(AppError::invalid(DUPLICATE_COURSE_VERSION));
        }
        Ok(())
    }

    pub async fn create(&self, new_syllabus: NewSyllabus, stamp: &AuditStamp) -> AppResult<syllabus::Model> {
        let course = self.active_course(&new_syllabus.course).await?;
        self.ensure_unique_version(&course.course_code, &new_syllabus.version, None)
            .await?;

        let mut model = syllabus::ActiveModel {
            course: Set(course.course_code),
            course_name: Set(course.course_name),
            syllabus_file: Set(new_syllabus.syllabus_file),
            version: Set(new_syllabus.version),
            description: Set(new_syllabus.description),
            is_deleted: Set(false),
            ..Default::default()
        };
        model.stamp_created(stamp);

        let syllabus = model.insert(self.db).await?;
        tracing::info!(
            "Syllabus {} uploaded for {} v{}",
            syllabus.id,
            syllabus.course,
            syllabus.version
        );
        Ok(syllabus)
    }

    pub async fn find(&self, id: i32, include_deleted: bool) -> AppResult<syllabus::Model> {
        let mut query = syllabus::Entity::find_by_id(id);
        if !include_deleted {
            query = query.filter(syllabus::Column::IsDeleted.eq(false));
        }
        query
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Syllabus"))
    }

    pub async fn list(&self, filter: SyllabusFilter, include_deleted: bool) -> AppResult<Vec<syllabus::Model>> {
        let mut query = syllabus::Entity::find();
        if !include_deleted {
            query = query.filter(syllabus::Column::IsDeleted.eq(false));
        }
        if let Some(course) = filter.course {
            query = query.filter(syllabus::Column::Course.eq(course));
        }
        if let Some(version) = filter.version {
            query = query.filter(syllabus::Column::Version.eq(version));
        }
        if let Some(is_deleted) = filter.is_deleted {
            query = query.filter(syllabus::Column::IsDeleted.eq(is_deleted));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = contains_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(syllabus::Column::Course))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(syllabus::Column::CourseName))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(syllabus::Column::Version))).like(pattern)),
            );
        }

        query = match parse_ordering(filter.ordering.as_deref(), SYLLABUS_ORDERING_FIELDS) {
            Some(OrderBy { field, order }) => {
                let column = match field {
                    "version" => syllabus::Column::Version,
                    "uploaded_at" => syllabus::Column::UploadedAt,
                    "updated_at" => syllabus::Column::UpdatedAt,
                    _ => syllabus::Column::Course,
                };
                query.order_by(column, order).order_by_asc(syllabus::Column::Id)
            }
            None => query
                .order_by_asc(syllabus::Column::Course)
                .order_by_desc(syllabus::Column::Version),
        };

        let syllabi = query.all(self.db).await?;
        Ok(syllabi)
    }

    /// Every save copies the course name again from the (possibly new) course.
    pub async fn update(
        &self,
        id: i32,
        updates: SyllabusUpdate,
        include_deleted: bool,
        stamp: &AuditStamp,
    ) -> AppResult<syllabus::Model> {
        let current = self.find(id, include_deleted).await?;

        // Only a newly chosen course must be active; the current one may be
        // soft-deleted and still supplies the name snapshot.
        let course = match updates.course.as_deref() {
            Some(course_code) => self.active_course(course_code).await?,
            None => course::Entity::find_by_id(current.course.clone())
                .one(self.db)
                .await?
                .ok_or_else(|| AppError::not_found("Course"))?,
        };
        let version = updates.version.clone().unwrap_or_else(|| current.version.clone());
        if course.course_code != current.course || version != current.version {
            self.ensure_unique_version(&course.course_code, &version, Some(current.id))
                .await?;
        }

        let mut active_model: syllabus::ActiveModel = current.into();
        active_model.course = Set(course.course_code);
        active_model.course_name = Set(course.course_name);
        active_model.version = Set(version);
        if let Some(description) = updates.description {
            active_model.description = Set(description);
        }
        if let Some(file) = updates.syllabus_file {
            active_model.syllabus_file = Set(file);
        }
        if let Some(is_deleted) = updates.is_deleted {
            active_model.set_deleted(is_deleted);
        }
        active_model.stamp_updated(stamp);

        let result = active_model.update(self.db).await?;
        Ok(result)
    }

    pub async fn soft_delete(&self, id: i32, stamp: &AuditStamp) -> AppResult<syllabus::Model> {
        let syllabus = self.find(id, true).await?;

        let mut active_model: syllabus::ActiveModel = syllabus.into();
        active_model.set_deleted(true);
        active_model.stamp_updated(stamp);

        let result = active_model.update(self.db).await?;
        tracing::info!("Syllabus {} soft-deleted", result.id);
        Ok(result)
    }

    /// Returns the removed row so the caller can drop its file.
    pub async fn hard_delete(&self, id: i32) -> AppResult<syllabus::Model> {
        let syllabus = self.find(id, true).await?;
        syllabus::Entity::delete_by_id(syllabus.id).exec(self.db).await?;
        tracing::warn!("Syllabus {} permanently deleted", syllabus.id);
        Ok(syllabus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::sea_orm_active_enums::{CbcsCategory, CourseCategory, CourseType, Faculty};
    use crate::repositories::test_support::{setup_db, staff_stamp};
    use crate::repositories::{CourseRepository, CourseUpdate, DepartmentRepository, NewCourse};

    async fn seed_course(db: &DatabaseConnection, stamp: &AuditStamp) -> course::Model {
        let dept = DepartmentRepository::new(db)
            .create("Computer Science".into(), Faculty::InformationComputing, stamp)
            .await
            .unwrap();
        CourseRepository::new(db)
            .create(
                NewCourse {
                    course_code: "CSE-101-V1".into(),
                    course_name: "Programming".into(),
                    course_category: CourseCategory::Compulsory,
                    course_type: CourseType::Theory,
                    cbcs_category: CbcsCategory::Core,
                    maximum_credit: 4,
                    discipline: dept.id,
                },
                stamp,
            )
            .await
            .unwrap()
    }

    fn new_syllabus(course: &str, version: &str) -> NewSyllabus {
        NewSyllabus {
            course: course.into(),
            version: version.into(),
            description: None,
            syllabus_file: format!("syllabi/2025/01/01/{version}.pdf"),
        }
    }

    #[tokio::test]
    async fn course_name_is_a_snapshot() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let course = seed_course(&db, &stamp).await;
        let repo = SyllabusRepository::new(&db);

        let created = repo
            .create(new_syllabus(&course.course_code, "1.0"), &stamp)
            .await
            .unwrap();
        assert_eq!(created.course_name, "Programming");
        assert_eq!(created.uploaded_by, Some(stamp.user_id));

        CourseRepository::new(&db)
            .update(
                &course.course_code,
                CourseUpdate {
                    course_name: Some("Programming in Rust".into()),
                    ..Default::default()
                },
                false,
                &stamp,
            )
            .await
            .unwrap();

        let fetched = repo.find(created.id, false).await.unwrap();
        assert_eq!(fetched.course_name, "Programming");

        let resaved = repo
            .update(
                created.id,
                SyllabusUpdate {
                    description: Some(Some("Updated outline".into())),
                    ..Default::default()
                },
                false,
                &stamp,
            )
            .await
            .unwrap();
        assert_eq!(resaved.course_name, "Programming in Rust");
    }

    #[tokio::test]
    async fn course_version_pair_is_unique_even_after_delete() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let course = seed_course(&db, &stamp).await;
        let repo = SyllabusRepository::new(&db);

        let first = repo
            .create(new_syllabus(&course.course_code, "1.0"), &stamp)
            .await
            .unwrap();
        repo.soft_delete(first.id, &stamp).await.unwrap();

        let err = repo
            .create(new_syllabus(&course.course_code, "1.0"), &stamp)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        repo.create(new_syllabus(&course.course_code, "1.1"), &stamp)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn default_order_is_course_then_newest_version() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let course = seed_course(&db, &stamp).await;
        let repo = SyllabusRepository::new(&db);

        for version in ["1.0", "2.0", "1.5"] {
            repo.create(new_syllabus(&course.course_code, version), &stamp)
                .await
                .unwrap();
        }

        let versions: Vec<_> = repo
            .list(SyllabusFilter::default(), false)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.version)
            .collect();
        assert_eq!(versions, vec!["2.0", "1.5", "1.0"]);
    }

    #[tokio::test]
    async fn syllabus_of_deleted_course_stays_editable() {
        let db = setup_db().await;
        let stamp = staff_stamp(&db).await;
        let course = seed_course(&db, &stamp).await;
        let repo = SyllabusRepository::new(&db);

        let created = repo
            .create(new_syllabus(&course.course_code, "1.0"), &stamp)
            .await
            .unwrap();
        repo.soft_delete(created.id, &stamp).await.unwrap();
        CourseRepository::new(&db)
            .soft_delete(&course.course_code, &stamp)
            .await
            .unwrap();

        let described = repo
            .update(
                created.id,
                SyllabusUpdate {
                    description: Some(Some("Archived outline".into())),
                    ..Default::default()
                },
                true,
                &stamp,
            )
            .await
            .unwrap();
        assert_eq!(described.description.as_deref(), Some("Archived outline"));
        assert_eq!(described.course_name, "Programming");

        let restored = repo
            .update(
                created.id,
                SyllabusUpdate {
                    is_deleted: Some(false),
                    ..Default::default()
                },
                true,
                &stamp,
            )
            .await
            .unwrap();
        assert!(!restored.is_deleted);

        let moved = repo
            .update(
                created.id,
                SyllabusUpdate {
                    course: Some(course.course_code.clone()),
                    ..Default::default()
                },
                true,
                &stamp,
            )
            .await
            .unwrap_err();
        assert!(matches!(moved, AppError::Validation { .. }));
    }
}
