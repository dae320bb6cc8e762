use chrono::{NaiveDateTime, Utc};
use sea_orm::Set;
use uuid::Uuid;

use crate::entities::{course, department, syllabus, user};

/// Who is acting and when. Taken from the authenticated user, never from the request body.
#[derive(Debug, Clone, Copy)]
pub struct AuditStamp {
    pub user_id: Uuid,
    pub at: NaiveDateTime,
}

impl AuditStamp {
    pub fn by(user: &user::Model) -> Self {
        Self {
            user_id: user.user_id,
            at: Utc::now().naive_utc(),
        }
    }
}

/// Active models that carry creator/updater columns and a soft-delete flag.
pub trait Audited {
    /// Sets the creation pair and the first update pair.
    fn stamp_created(&mut self, stamp: &AuditStamp);

    fn stamp_updated(&mut self, stamp: &AuditStamp);

    fn set_deleted(&mut self, deleted: bool);
}

impl Audited for department::ActiveModel {
    fn stamp_created(&mut self, stamp: &AuditStamp) {
        self.created_by = Set(Some(stamp.user_id));
        self.created_at = Set(stamp.at);
        self.stamp_updated(stamp);
    }

    fn stamp_updated(&mut self, stamp: &AuditStamp) {
        self.updated_by = Set(Some(stamp.user_id));
        self.updated_at = Set(stamp.at);
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = Set(deleted);
    }
}

impl Audited for course::ActiveModel {
    fn stamp_created(&mut self, stamp: &AuditStamp) {
        self.created_by = Set(Some(stamp.user_id));
        self.created_at = Set(stamp.at);
        self.stamp_updated(stamp);
    }

    fn stamp_updated(&mut self, stamp: &AuditStamp) {
        self.updated_by = Set(Some(stamp.user_id));
        self.updated_at = Set(stamp.at);
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = Set(deleted);
    }
}

impl Audited for syllabus::ActiveModel {
    fn stamp_created(&mut self, stamp: &AuditStamp) {
        self.uploaded_by = Set(Some(stamp.user_id));
        self.uploaded_at = Set(stamp.at);
        self.stamp_updated(stamp);
    }

    fn stamp_updated(&mut self, stamp: &AuditStamp) {
        self.updated_by = Set(Some(stamp.user_id));
        self.updated_at = Set(stamp.at);
    }

    fn set_deleted(&mut self, deleted: bool) {
        self.is_deleted = Set(deleted);
    }
}
