use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::syllabus_repository::syllabus_files_for_courses;
use super::{OrderBy, contains_pattern, parse_ordering};
use crate::entities::sea_orm_active_enums::{CbcsCategory, CourseCategory, CourseType};
use crate::entities::{course, department};
use crate::error::{AppError, AppResult};
use crate::utils::audit::{AuditStamp, Audited};

pub const COURSE_ORDERING_FIELDS: &[&str] = &["course_code", "course_name", "created_at", "updated_at"];

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub course_code: String,
    pub course_name: String,
    pub course_category: CourseCategory,
    pub course_type: CourseType,
    pub cbcs_category: CbcsCategory,
    pub maximum_credit: i16,
    pub discipline: String,
}

#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub course_name: Option<String>,
    pub course_category: Option<CourseCategory>,
    pub course_type: Option<CourseType>,
    pub cbcs_category: Option<CbcsCategory>,
    pub maximum_credit: Option<i16>,
    pub discipline: Option<String>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub discipline: Option<String>,
    pub course_category: Option<CourseCategory>,
    pub course_type: Option<CourseType>,
    pub cbcs_category: Option<CbcsCategory>,
    pub is_deleted: Option<bool>,
    /// Case-insensitive match on code or name.
    pub search: Option<String>,
    /// One of [`COURSE_ORDERING_FIELDS`], optionally prefixed with `-`.
    pub ordering: Option<String>,
}

pub struct CourseRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CourseRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    async fn ensure_discipline(&self, discipline: &str) -> AppResult<()> {
        let active = department::Entity::find_by_id(discipline.to_string())
            .filter(department::Column::IsDeleted.eq(false))
            .count(self.db)
            .await?;
        if active == 0 {
            return Err(AppError::field(
                "discipline",
                format!("Invalid pk \"{discipline}\" - object does not exist."),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, new_course: NewCourse, stamp: &AuditStamp) -> AppResult<course::Model> {
        if course::Entity::find_by_id(new_course.course_code.clone())
            .one(self.db)
            .await?
            .is_some()
        {
            return Err(AppError::field(
                "course_code",
                "course with this course code already exists.",
            ));
        }
        self.ensure_discipline(&new_course.discipline).await?;

        let mut model = course::ActiveModel {
            course_code: Set(new_course.course_code),
            course_name: Set(new_course.course_name),
            course_category: Set(new_course.course_category),
            course_type: Set(new_course.course_type),
            cbcs_category: Set(new_course.cbcs_category),
            maximum_credit: Set(new_course.maximum_credit),
            discipline: Set(new_course.discipline),
            is_deleted: Set(false),
            ..Default::default()
        };
        model.stamp_created(stamp);

        let course = model.insert(self.db).await?;
        tracing::info!("Course {} created", course.course_code);
        Ok(course)
    }

    pub async fn find(&self, course_code: &str, include_deleted: bool) -> AppResult<course::Model> {
        let mut query = course::Entity::find_by_id(course_code.to_string());
        if !include_deleted {
            query = query.filter(course::Column::IsDeleted.eq(false));
        }
        query
            .one(self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Course"))
    }

    pub async fn list(&self, filter: CourseFilter, include_deleted: bool) -> AppResult<Vec<course::Model>> {
        let mut query = course::Entity::find();
        if !include_deleted {
            query = query.filter(course::Column::IsDeleted.eq(false));
        }
        if let Some(discipline) = filter.discipline {
            query = query.filter(course::Column::Discipline.eq(discipline));
        }
        if let Some(category) = filter.course_category {
            query = query.filter(course::Column::CourseCategory.eq(category));
        }
        if let Some(course_type) = filter.course_type {
            query = query.filter(course::Column::CourseType.eq(course_type));
        }
        if let Some(cbcs) = filter.cbcs_category {
            query = query.filter(course::Column::CbcsCategory.eq(cbcs));
        }
        if let Some(is_deleted) = filter.is_deleted {
            query = query.filter(course::Column::IsDeleted.eq(is_deleted));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = contains_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col(course::Column::CourseCode))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col(course::Column::CourseName))).like(pattern)),
            );
        }

        let order = parse_ordering(filter.ordering.as_deref(), COURSE_ORDERING_FIELDS)
            .unwrap_or(OrderBy::asc("course_code"));
        let column = match order.field {
            "course_name" => course::Column::CourseName,
            "created_at" => course::Column::CreatedAt,
            "updated_at" => course::Column::UpdatedAt,
            _ => course::Column::CourseCode,
        };
        query = query.order_by(column, order.order);
        if order.field != "course_code" {
            query = query.order_by_asc(course::Column::CourseCode);
        }

        let courses = query.all(self.db).await?;
        Ok(courses)
    }

    pub async fn update(
        &self,
        course_code: &str,
        updates: CourseUpdate,
        include_deleted: bool,
        stamp: &AuditStamp,
    ) -> AppResult<course::Model> {
        let current = self.find(course_code, include_deleted).await?;
        if let Some(discipline) = &updates.discipline {
            if discipline != &current.discipline {
                self.ensure_discipline(discipline).await?;
            }
        }

        let mut active_model: course::ActiveModel = current.into();
        if let Some(course_name) = updates.course_name {
            active_model.course_name = Set(course_name);
        }
        if let Some(category) = updates.course_category {
            active_model.course_category = Set(category);
        }
        if let Some(course_type) = updates.course_type {
            active_model.course_type = Set(course_type);
        }
        if let Some(cbcs) = updates.cbcs_category {
            active_model.cbcs_category = Set(cbcs);
        }
        if let Some(credit) = updates.maximum_credit {
            active_model.maximum_credit = Set(credit);
        }
        if let Some(discipline) = updates.discipline {
            active_model.discipline = Set(discipline);
        }
        if let Some(is_deleted) = updates.is_deleted {
            active_model.set_deleted(is_deleted);
        }
        active_model.stamp_updated(stamp);

        let result = active_model.update(self.db).await?;
        Ok(result)
    }

    pub async fn soft_delete(&self, course_code: &str, stamp: &AuditStamp) -> AppResult<course::Model> {
        let course = self.find(course_code, true).await?;

        let mut active_model: course::ActiveModel = course.into();
        active_model.set_deleted(true);
        active_model.stamp_updated(stamp);

        let result = active_model.update(self.db).await?;
        tracing::info!("Course {} soft-deleted", result.course_code);
        Ok(result)
    }

    /// Removes the course and, by cascade, its syllabi. Returns the syllabus file
    /// paths so the caller can delete them from storage.
    pub async fn hard_delete(&self, course_code: &str) -> AppResult<Vec<String>> {
        let course = self.find(course_code, true).await?;

        let txn = self.db.begin().await?;
        let files = syllabus_files_for_courses(&txn, vec![course.course_code.clone()]).await?;
        course::Entity::delete_by_id(course.course_code.clone())
            .exec(&txn)
            .await?;
        txn.commit().await?;

        tracing::warn!(
            "Course {} permanently deleted with {} syllabus file(s)",
            course.course_code,
            files.len()
        );
        Ok(files)
    }
}
