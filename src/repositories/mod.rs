pub mod course_repository;
pub mod department_repository;
pub mod syllabus_repository;
pub mod user_repository;

use sea_orm::Order;
use sea_orm::sea_query::LikeExpr;

pub use course_repository::{CourseFilter, CourseRepository, CourseUpdate, NewCourse};
pub use department_repository::{DepartmentFilter, DepartmentRepository, DepartmentUpdate};
pub use syllabus_repository::{NewSyllabus, SyllabusFilter, SyllabusRepository, SyllabusUpdate};
pub use user_repository::{NewUser, ProfileUpdate, UserRepository};

/// A validated `ordering` query value.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: &'static str,
    pub order: Order,
}

impl OrderBy {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            order: Order::Asc,
        }
    }
}

/// `name` or `-name`; unknown fields are ignored and yield `None`.
pub fn parse_ordering(raw: Option<&str>, allowed: &[&'static str]) -> Option<OrderBy> {
    let raw = raw?.trim();
    let (name, order) = match raw.strip_prefix('-') {
        Some(name) => (name, Order::Desc),
        None => (raw, Order::Asc),
    };
    allowed
        .iter()
        .find(|field| **field == name)
        .map(|field| OrderBy {
            field: *field,
            order,
        })
}

/// Escapes LIKE wildcards so they match literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Case-insensitive substring match; compare against a lowercased column.
pub fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&term.to_lowercase()))).escape('\\')
}
