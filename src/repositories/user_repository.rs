use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::RoleEnum;
use crate::entities::user::{self, DEFAULT_PROFILE_PICTURE};
use crate::error::{AppError, AppResult};

/// Already-normalized fields for a new account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub mobile_number: Option<String>,
    pub bio: Option<String>,
    pub role: RoleEnum,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_email_verified: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the number.
    pub mobile_number: Option<Option<String>>,
    pub bio: Option<Option<String>>,
}

pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
    bcrypt_cost: u32,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self {
            db,
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<user::Model>> {
        let user = user::Entity::find_by_id(user_id).one(self.db).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        let user = user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(self.db)
            .await?;
        Ok(user)
    }

    async fn ensure_mobile_free(&self, mobile_number: &str, owner: Option<Uuid>) -> AppResult<()> {
        let mut query = user::Entity::find().filter(user::Column::MobileNumber.eq(mobile_number));
        if let Some(owner) = owner {
            query = query.filter(user::Column::UserId.ne(owner));
        }
        if query.count(self.db).await? > 0 {
            return Err(AppError::field(
                "mobile_number",
                "User with this Mobile Number already exists.",
            ));
        }
        Ok(())
    }

    pub async fn create_user(&self, new_user: NewUser) -> AppResult<user::Model> {
        if self.find_by_email(&new_user.email).await?.is_some() {
            return Err(AppError::field("email", "This email is already registered."));
        }
        if let Some(mobile) = &new_user.mobile_number {
            self.ensure_mobile_free(mobile, None).await?;
        }

        let hashed_password = bcrypt::hash(&new_user.password, self.bcrypt_cost)?;
        let now = Utc::now().naive_utc();

        let user_model = user::ActiveModel {
            user_id: Set(Uuid::new_v4()),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            password: Set(hashed_password),
            mobile_number: Set(new_user.mobile_number),
            profile_picture: Set(Some(DEFAULT_PROFILE_PICTURE.to_string())),
            bio: Set(new_user.bio),
            role: Set(new_user.role),
            is_email_verified: Set(new_user.is_email_verified),
            is_active: Set(true),
            is_staff: Set(new_user.is_staff),
            is_superuser: Set(new_user.is_superuser),
            date_joined: Set(now),
            last_updated: Set(now),
        };

        let user = user_model.insert(self.db).await?;
        tracing::info!("User created: {}", user.email);
        Ok(user)
    }

    /// Superusers are staff, active and pre-verified.
    pub async fn create_superuser(
        &self,
        email: String,
        first_name: String,
        last_name: String,
        password: String,
    ) -> AppResult<user::Model> {
        self.create_user(NewUser {
            email,
            first_name,
            last_name,
            password,
            role: RoleEnum::Admin,
            is_staff: true,
            is_superuser: true,
            is_email_verified: true,
            ..Default::default()
        })
        .await
    }

    /// Returns the user when the password matches and the account is active.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<Option<user::Model>> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        if !user.is_active || !bcrypt::verify(password, &user.password)? {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub fn check_password(&self, user: &user::Model, password: &str) -> AppResult<bool> {
        Ok(bcrypt::verify(password, &user.password)?)
    }

    pub async fn update_profile(
        &self,
        user: user::Model,
        updates: ProfileUpdate,
    ) -> AppResult<user::Model> {
        if let Some(Some(mobile)) = &updates.mobile_number {
            self.ensure_mobile_free(mobile, Some(user.user_id)).await?;
        }

        let mut active_user: user::ActiveModel = user.into();

        if let Some(first_name) = updates.first_name {
            active_user.first_name = Set(first_name);
        }
        if let Some(last_name) = updates.last_name {
            active_user.last_name = Set(last_name);
        }
        if let Some(mobile_number) = updates.mobile_number {
            active_user.mobile_number = Set(mobile_number);
        }
        if let Some(bio) = updates.bio {
            active_user.bio = Set(bio);
        }

        active_user.last_updated = Set(Utc::now().naive_utc());

        let result = active_user.update(self.db).await?;
        Ok(result)
    }

    pub async fn set_profile_picture(
        &self,
        user: user::Model,
        relative_path: String,
    ) -> AppResult<user::Model> {
        let mut active_user: user::ActiveModel = user.into();
        active_user.profile_picture = Set(Some(relative_path));
        active_user.last_updated = Set(Utc::now().naive_utc());

        let result = active_user.update(self.db).await?;
        Ok(result)
    }

    pub async fn set_password(&self, user: user::Model, new_password: &str) -> AppResult<user::Model> {
        let hashed_password = bcrypt::hash(new_password, self.bcrypt_cost)?;

        let mut active_user: user::ActiveModel = user.into();
        active_user.password = Set(hashed_password);
        active_user.last_updated = Set(Utc::now().naive_utc());

        let result = active_user.update(self.db).await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::{new_user, setup_db};

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = setup_db().await;
        let repo = UserRepository::new(&db).with_bcrypt_cost(4);

        repo.create_user(new_user("dup@university.edu")).await.unwrap();
        let err = repo
            .create_user(new_user("dup@university.edu"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert_eq!(err.to_string(), "This email is already registered.");
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_activity() {
        let db = setup_db().await;
        let repo = UserRepository::new(&db).with_bcrypt_cost(4);
        let user = repo.create_user(new_user("login@university.edu")).await.unwrap();

        assert!(repo
            .authenticate("LOGIN@university.edu", "Secret123!")
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .authenticate("login@university.edu", "wrong")
            .await
            .unwrap()
            .is_none());

        let mut inactive: user::ActiveModel = user.into();
        inactive.is_active = Set(false);
        inactive.update(&db).await.unwrap();

        assert!(repo
            .authenticate("login@university.edu", "Secret123!")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn mobile_number_must_be_unique_across_users() {
        let db = setup_db().await;
        let repo = UserRepository::new(&db).with_bcrypt_cost(4);

        let mut first = new_user("one@university.edu");
        first.mobile_number = Some("+919876543210".into());
        repo.create_user(first).await.unwrap();

        let second = repo.create_user(new_user("two@university.edu")).await.unwrap();
        let err = repo
            .update_profile(
                second,
                ProfileUpdate {
                    mobile_number: Some(Some("+919876543210".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn superuser_flags_are_set() {
        let db = setup_db().await;
        let repo = UserRepository::new(&db).with_bcrypt_cost(4);
        let admin = repo
            .create_superuser(
                "root@university.edu".into(),
                "System".into(),
                "Administrator".into(),
                "Root1234!".into(),
            )
            .await
            .unwrap();

        assert!(admin.is_staff && admin.is_superuser && admin.is_email_verified);
        assert_eq!(admin.role, RoleEnum::Admin);
    }
}
