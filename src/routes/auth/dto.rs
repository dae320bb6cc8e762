use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::entities::{sea_orm_active_enums::RoleEnum, user};

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "jane.doe@university.edu")]
    pub email: String,

    #[schema(example = "Jane")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "Secret123!")]
    pub password: String,

    #[schema(example = "+919876543210")]
    pub mobile_number: Option<String>,

    pub bio: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane.doe@university.edu")]
    pub email: String,

    #[schema(example = "Secret123!")]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LogoutRequest {
    /// Refresh token to revoke when the cookie is not sent.
    pub refresh: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Fields the owner may change through `POST /me`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub mobile_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
}

/// Multipart body of `POST /me/picture`.
#[derive(Debug, ToSchema)]
pub struct ProfilePictureUpload {
    #[schema(value_type = String, format = Binary)]
    pub profile_picture: Vec<u8>,
}

/// Rejected when present in a profile update.
pub const PROFILE_READ_ONLY_FIELDS: &[&str] = &[
    "email",
    "full_name",
    "role",
    "is_email_verified",
    "date_joined",
    "last_updated",
];

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub mobile_number: Option<String>,
    /// Absolute media URL.
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub role: RoleEnum,
    pub is_email_verified: bool,
    pub date_joined: NaiveDateTime,
    pub last_updated: NaiveDateTime,
}

impl UserResponse {
    pub fn from_model(user: user::Model, config: &Config) -> Self {
        Self {
            full_name: user.full_name(),
            profile_picture: user
                .profile_picture
                .as_deref()
                .map(|path| config.media_url_for(path)),
            user_id: user.user_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            mobile_number: user.mobile_number,
            bio: user.bio,
            role: user.role,
            is_email_verified: user.is_email_verified,
            date_joined: user.date_joined,
            last_updated: user.last_updated,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
