//! Role checks applied inside handlers once the caller is known.

use crate::entities::{sea_orm_active_enums::RoleEnum, user};
use crate::error::{AppError, AppResult};

/// Staff see soft-deleted rows and may filter on `is_deleted`.
pub fn is_privileged(user: Option<&user::Model>) -> bool {
    user.is_some_and(|u| u.is_staff || u.is_superuser)
}

/// Create and update: admins, teachers and staff.
pub fn require_editor(user: &user::Model) -> AppResult<()> {
    if user.is_staff || user.is_superuser || matches!(user.role, RoleEnum::Admin | RoleEnum::Teacher) {
        return Ok(());
    }
    Err(AppError::Authorization(format!(
        "User {} with role {:?} may not modify records",
        user.user_id, user.role
    )))
}

/// Soft delete and restore.
pub fn require_staff(user: &user::Model) -> AppResult<()> {
    if user.is_staff || user.is_superuser {
        return Ok(());
    }
    Err(AppError::Authorization(format!(
        "User {} is not staff",
        user.user_id
    )))
}

pub fn require_superuser(user: &user::Model) -> AppResult<()> {
    if user.is_superuser {
        return Ok(());
    }
    Err(AppError::Authorization(format!(
        "User {} is not a superuser",
        user.user_id
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_with(role: RoleEnum, is_staff: bool, is_superuser: bool) -> user::Model {
        let now = Utc::now().naive_utc();
        user::Model {
            user_id: Uuid::new_v4(),
            email: "someone@university.edu".into(),
            first_name: "Some".into(),
            last_name: "One".into(),
            password: String::new(),
            mobile_number: None,
            profile_picture: None,
            bio: None,
            role,
            is_email_verified: false,
            is_active: true,
            is_staff,
            is_superuser,
            date_joined: now,
            last_updated: now,
        }
    }

    #[test]
    fn students_cannot_edit() {
        assert!(require_editor(&user_with(RoleEnum::Student, false, false)).is_err());
        assert!(require_editor(&user_with(RoleEnum::Teacher, false, false)).is_ok());
        assert!(require_editor(&user_with(RoleEnum::Admin, false, false)).is_ok());
        assert!(require_editor(&user_with(RoleEnum::Student, true, false)).is_ok());
    }

    #[test]
    fn delete_levels() {
        let admin = user_with(RoleEnum::Admin, false, false);
        let staff = user_with(RoleEnum::Student, true, false);
        let root = user_with(RoleEnum::Admin, true, true);

        assert!(require_staff(&admin).is_err());
        assert!(require_staff(&staff).is_ok());
        assert!(require_superuser(&staff).is_err());
        assert!(require_superuser(&root).is_ok());
    }

    #[test]
    fn anonymous_is_not_privileged() {
        assert!(!is_privileged(None));
        assert!(is_privileged(Some(&user_with(RoleEnum::Student, true, false))));
        assert!(!is_privileged(Some(&user_with(RoleEnum::Admin, false, false))));
    }
}
