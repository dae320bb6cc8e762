pub mod course;
pub mod department;
pub mod sea_orm_active_enums;
pub mod syllabus;
pub mod user;
