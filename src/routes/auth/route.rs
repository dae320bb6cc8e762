use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde_json::{Value, json};

use super::cookies::{clear_token_cookies, set_access_cookie, set_refresh_cookie};
use super::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, LogoutRequest, MessageResponse,
    PROFILE_READ_ONLY_FIELDS, ProfilePictureUpload, ProfileUpdateRequest, RegisterRequest,
    UserResponse,
};
use crate::config::REFRESH_TOKEN_COOKIE;
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::extractor::{AppJson, AppMultipart, AuthUser};
use crate::jwt::{TokenClaims, TokenType};
use crate::repositories::{NewUser, ProfileUpdate, UserRepository};
use crate::state::AppState;
use crate::utils::upload::{
    profile_picture_name, read_file_field, remove_file, store_file, validate_image,
};
use crate::utils::validation::{
    normalize_email, normalize_person_name, sanitize_bio, validate_mobile_number,
    validate_password,
};

pub fn create_route() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(get_profile).post(update_profile))
        .route("/api/v1/auth/me/picture", post(upload_profile_picture))
        .route("/api/v1/auth/password/change", post(change_password))
        .route("/api/v1/auth/token/refresh", post(refresh_token))
}

fn user_repository(state: &AppState) -> UserRepository<'_> {
    UserRepository::new(&state.db).with_bcrypt_cost(state.config.bcrypt_cost)
}

/// Issues a fresh access/refresh pair as cookies.
fn issue_tokens(state: &AppState, jar: CookieJar, user: &user::Model) -> AppResult<CookieJar> {
    let pair = state.jwt.create_pair(&user.user_id)?;
    let jar = set_access_cookie(jar, pair.access, &state.config);
    Ok(set_refresh_cookie(jar, pair.refresh, &state.config))
}

/// Optional text field: blank means "not set".
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Register a new account and sign it in
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, CookieJar, AppJson<AuthResponse>)> {
    let email = normalize_email(&payload.email, &state.config.blocked_domains())?;
    let first_name = normalize_person_name("first_name", &payload.first_name)?;
    let last_name = normalize_person_name("last_name", &payload.last_name)?;
    validate_password("password", &payload.password)?;
    let mobile_number = non_blank(payload.mobile_number)
        .map(|m| validate_mobile_number(&m))
        .transpose()?;
    let bio = non_blank(payload.bio).map(|b| sanitize_bio(&b)).transpose()?;

    let user = user_repository(&state)
        .create_user(NewUser {
            email,
            first_name,
            last_name,
            password: payload.password,
            mobile_number,
            bio,
            ..Default::default()
        })
        .await?;

    let jar = issue_tokens(&state, jar, &user)?;
    tracing::info!("User registered: {}", user.email);

    Ok((
        StatusCode::CREATED,
        jar,
        AppJson(AuthResponse {
            message: "Registration successful".to_string(),
            user: UserResponse::from_model(user, &state.config),
        }),
    ))
}

/// Login with email and password; tokens are set as cookies
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, AppJson<AuthResponse>)> {
    let user = user_repository(&state)
        .authenticate(&payload.email, &payload.password)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

    let jar = issue_tokens(&state, jar, &user)?;
    tracing::info!("User logged in: {}", user.email);

    Ok((
        jar,
        AppJson(AuthResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from_model(user, &state.config),
        }),
    ))
}

async fn revoke_refresh_token(state: &AppState, token: &str) -> anyhow::Result<TokenClaims> {
    let claims = state.jwt.verify(token, TokenType::Refresh)?;
    state.blacklist.add_jwt_to_blacklist(&claims).await?;
    Ok(claims)
}

/// Logout; revokes the refresh token and clears cookies. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    request_body(content = LogoutRequest, description = "Optional; the refresh cookie is used when absent"),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
    ),
    tag = "Authentication"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> (CookieJar, AppJson<MessageResponse>) {
    let from_body = serde_json::from_slice::<LogoutRequest>(&body)
        .ok()
        .and_then(|req| req.refresh);
    let refresh = from_body.or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()));

    match refresh {
        Some(token) => match revoke_refresh_token(&state, &token).await {
            Ok(claims) => tracing::info!("Refresh token revoked for user {}", claims.sub),
            Err(e) => tracing::error!("Logout error: {:?}", e),
        },
        None => tracing::info!("Logout request without refresh token"),
    }

    (
        clear_token_cookies(jar),
        AppJson(MessageResponse::new("Logged out successfully")),
    )
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "Profile"
)]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppJson<UserResponse> {
    AppJson(UserResponse::from_model(user, &state.config))
}

/// Partial profile update. Read-only fields are rejected.
#[utoipa::path(
    post,
    path = "/api/v1/auth/me",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "Profile"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(raw): AppJson<Value>,
) -> AppResult<AppJson<UserResponse>> {
    let Value::Object(fields) = &raw else {
        return Err(AppError::invalid("Expected a JSON object."));
    };
    if PROFILE_READ_ONLY_FIELDS.iter().any(|f| fields.contains_key(*f)) {
        return Err(AppError::Validation {
            message: "Cannot modify read-only fields.".to_string(),
            details: json!({
                "error": ["Cannot modify read-only fields."],
                "read_only_fields": PROFILE_READ_ONLY_FIELDS,
            }),
        });
    }

    let payload: ProfileUpdateRequest =
        serde_json::from_value(raw).map_err(|e| AppError::invalid(e.to_string()))?;

    let updates = ProfileUpdate {
        first_name: payload
            .first_name
            .map(|n| normalize_person_name("first_name", &n))
            .transpose()?,
        last_name: payload
            .last_name
            .map(|n| normalize_person_name("last_name", &n))
            .transpose()?,
        mobile_number: payload
            .mobile_number
            .map(|m| non_blank(m).map(|m| validate_mobile_number(&m)).transpose())
            .transpose()?,
        bio: payload
            .bio
            .map(|b| non_blank(b).map(|b| sanitize_bio(&b)).transpose())
            .transpose()?,
    };

    let user = user_repository(&state).update_profile(user, updates).await?;
    tracing::info!("Profile updated for user: {}", user.email);
    Ok(AppJson(UserResponse::from_model(user, &state.config)))
}

/// Replace the profile picture (multipart field `profile_picture`, max 5MB)
#[utoipa::path(
    post,
    path = "/api/v1/auth/me/picture",
    request_body(content = ProfilePictureUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Profile picture updated", body = UserResponse),
        (status = 400, description = "Invalid image", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "Profile"
)]
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppMultipart(mut multipart): AppMultipart,
) -> AppResult<AppJson<UserResponse>> {
    let mut picture = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::invalid(e.body_text()))? {
        if field.name() == Some("profile_picture") {
            picture = Some(read_file_field(field).await?);
        }
    }
    let picture =
        picture.ok_or_else(|| AppError::field("profile_picture", "No file was submitted."))?;
    validate_image(&picture)?;

    let file_name = profile_picture_name(&user.email, &picture);
    let relative = store_file(&state.config.media_root, "profile_pics", &file_name, &picture.data).await?;

    let previous = user.profile_picture.clone();
    let user = user_repository(&state)
        .set_profile_picture(user, relative)
        .await?;

    if let Some(old) = previous.filter(|p| p != user::DEFAULT_PROFILE_PICTURE) {
        remove_file(&state.config.media_root, &old).await;
    }

    Ok(AppJson(UserResponse::from_model(user, &state.config)))
}

/// Change password; the session ends and cookies are cleared
#[utoipa::path(
    post,
    path = "/api/v1/auth/password/change",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorBody),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "Authentication"
)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<(CookieJar, AppJson<MessageResponse>)> {
    let repo = user_repository(&state);
    if !repo.check_password(&user, &payload.old_password)? {
        return Err(AppError::field("old_password", "Incorrect current password."));
    }
    validate_password("new_password", &payload.new_password)?;
    if payload.old_password == payload.new_password {
        return Err(AppError::invalid(
            "New password must be different from the old password.",
        ));
    }

    let user = repo.set_password(user, &payload.new_password).await?;

    if let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) {
        if let Err(e) = revoke_refresh_token(&state, cookie.value()).await {
            tracing::warn!("Failed to blacklist refresh token: {}", e);
        }
    }

    tracing::info!("Password changed for user: {}", user.email);
    Ok((
        clear_token_cookies(jar),
        AppJson(MessageResponse::new("Password changed successfully")),
    ))
}

/// Exchange the refresh cookie for a new access cookie (and a rotated refresh cookie)
#[utoipa::path(
    post,
    path = "/api/v1/auth/token/refresh",
    responses(
        (status = 200, description = "Token refreshed", body = MessageResponse),
        (status = 400, description = "Refresh cookie missing", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid or expired refresh token", body = crate::error::ErrorBody),
    ),
    tag = "Authentication"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, AppJson<MessageResponse>)> {
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::invalid("Refresh token is required"))?;

    let invalid = || AppError::Authentication("Invalid or expired refresh token".to_string());

    let claims = state
        .jwt
        .verify(&token, TokenType::Refresh)
        .map_err(|_| invalid())?;
    if state.blacklist.check_jwt_in_blacklist(&claims).await? {
        return Err(invalid());
    }

    let user_id = claims.user_id().map_err(|_| invalid())?;
    let user = user_repository(&state)
        .find_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(invalid)?;

    let access = state.jwt.create_jwt(&user.user_id, TokenType::Access)?;
    let mut jar = set_access_cookie(jar, access, &state.config);

    if state.config.rotate_refresh_tokens {
        state.blacklist.add_jwt_to_blacklist(&claims).await?;
        let refresh = state.jwt.create_jwt(&user.user_id, TokenType::Refresh)?;
        jar = set_refresh_cookie(jar, refresh, &state.config);
    }

    tracing::info!("Token refreshed for user: {}", user.email);
    Ok((jar, AppJson(MessageResponse::new("Token refreshed successfully"))))
}
