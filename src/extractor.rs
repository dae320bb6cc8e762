use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Multipart, Query, Request,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    extract::CookieJar,
    headers::{Authorization, authorization::Bearer},
};
use serde::Serialize;

use crate::config::ACCESS_TOKEN_COOKIE;
use crate::entities::user;
use crate::error::AppError;
use crate::jwt::TokenType;
use crate::repositories::UserRepository;
use crate::state::AppState;

/// JSON body whose rejections render as validation errors.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

pub struct AppMultipart(pub Multipart);

impl<S> FromRequest<S> for AppMultipart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Multipart::from_request(req, state).await?))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::invalid(rejection.body_text())
    }
}

/// Access token from the cookie, or from `Authorization: Bearer` when header auth is on.
async fn access_token(parts: &mut Parts, state: &AppState) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        return Some(cookie.value().to_string());
    }

    if state.config.allow_header_auth {
        if let Ok(TypedHeader(Authorization(bearer))) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
        {
            return Some(bearer.token().to_string());
        }
    }
    None
}

async fn authenticate(state: &AppState, token: &str) -> Result<user::Model, AppError> {
    let claims = state.jwt.verify(token, TokenType::Access).map_err(|e| {
        AppError::Authentication(format!("Given token not valid for any token type: {e}"))
    })?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::Authentication("Token contained no recognizable user identification".into()))?;

    let user = UserRepository::new(&state.db)
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Authentication("User not found".into()))?;

    if !user.is_active {
        return Err(AppError::Authentication("User is inactive".into()));
    }
    Ok(user)
}

/// The authenticated caller. Rejects with 401 when no valid access token is present.
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = access_token(parts, state).await.ok_or_else(|| {
            AppError::Authentication("Authentication credentials were not provided.".into())
        })?;
        Ok(AuthUser(authenticate(state, &token).await?))
    }
}

/// Like [`AuthUser`] but anonymous callers pass through. A stale or invalid
/// token is treated as anonymous so public reads keep working.
pub struct MaybeAuthUser(pub Option<user::Model>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = access_token(parts, state).await else {
            return Ok(MaybeAuthUser(None));
        };

        match authenticate(state, &token).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Authentication(reason)) => {
                tracing::debug!("Ignoring unusable access token on public route: {}", reason);
                Ok(MaybeAuthUser(None))
            }
            Err(e) => Err(e),
        }
    }
}
