use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{Method, StatusCode};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Authorization(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Capacity(String),
    #[error("Database error: {0}")]
    Database(DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Capacity,
    Internal,
}

impl AppError {
    /// Error attached to a single input field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        AppError::Validation {
            details: json!({ field: [message.clone()] }),
            message,
        }
    }

    /// Error that is not tied to one field.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::field("non_field_errors", message)
    }

    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{resource} not found."))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation { .. } => ErrorKind::Validation,
            AppError::Authentication(_) => ErrorKind::Authentication,
            AppError::Authorization(_) => ErrorKind::Authorization,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Capacity(_) => ErrorKind::Capacity,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::Capacity => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Unique constraint violation: {}", detail);
                AppError::invalid("A record with these values already exists.")
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::debug!("Foreign key violation: {}", detail);
                AppError::invalid("A referenced record does not exist.")
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(anyhow::Error::new(err).context("Password hashing failed"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(anyhow::Error::new(err))
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    pub view: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Carried in the response extensions until `error_context` knows the route and method.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
    /// Server-side only, never rendered.
    pub detail: String,
}

impl ErrorReport {
    pub fn message(&self) -> &'static str {
        match self.kind {
            ErrorKind::Validation => "Invalid input data provided.",
            ErrorKind::Authentication => "Authentication failed. Please check your credentials.",
            ErrorKind::Authorization => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "Requested resource not found.",
            ErrorKind::Capacity => "Resource capacity exhausted.",
            ErrorKind::Internal => "An unexpected error occurred.",
        }
    }

    pub fn log(&self, view: &str, method: &Method) {
        match self.kind {
            ErrorKind::Validation | ErrorKind::Capacity => tracing::warn!(
                "Validation error in {} (Method: {}): {}",
                view,
                method,
                self.detail
            ),
            ErrorKind::Authentication => {
                tracing::error!("Auth error in {}: {}", view, self.detail)
            }
            ErrorKind::Authorization => {
                tracing::error!("Permission denied in {}: {}", view, self.detail)
            }
            ErrorKind::NotFound => tracing::info!("404 in {}: {}", view, self.detail),
            ErrorKind::Internal => tracing::error!(
                "Unhandled exception in {} (Method: {}): {}",
                view,
                method,
                self.detail
            ),
        }
    }

    pub fn into_body(self, view: String, method: &Method) -> ErrorBody {
        ErrorBody {
            status_code: self.status.as_u16(),
            message: self.message().to_string(),
            error: self.error,
            view,
            method: method.to_string(),
            details: self.details,
        }
    }

    pub fn render(self, view: String, method: &Method) -> Response {
        self.log(&view, method);
        let status = self.status;
        (status, Json(self.into_body(view, method))).into_response()
    }
}

impl From<AppError> for ErrorReport {
    fn from(err: AppError) -> Self {
        let kind = err.kind();
        let status = err.status_code();
        match err {
            AppError::Validation { message, details } => ErrorReport {
                kind,
                status,
                detail: format!("{message} {details}"),
                error: message,
                details: Some(details),
            },
            AppError::NotFound(message) => ErrorReport {
                kind,
                status,
                detail: message.clone(),
                error: message,
                details: None,
            },
            AppError::Capacity(message) => ErrorReport {
                kind,
                status,
                detail: message.clone(),
                error: message,
                details: None,
            },
            AppError::Authentication(message) | AppError::Authorization(message) => ErrorReport {
                kind,
                status,
                detail: message.clone(),
                error: message,
                details: None,
            },
            AppError::Database(err) => ErrorReport {
                kind,
                status,
                detail: format!("{err:?}"),
                error: "Internal server error".to_string(),
                details: None,
            },
            AppError::Internal(err) => ErrorReport {
                kind,
                status,
                detail: format!("{err:?}"),
                error: "Internal server error".to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from(self);
        let mut response = report.status.into_response();
        response.extensions_mut().insert(report);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_keeps_message_and_details() {
        let err = AppError::field("version", "Version must be in format 'X.Y' (e.g., 1.0).");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let report = ErrorReport::from(err);
        assert_eq!(report.kind, ErrorKind::Validation);
        assert_eq!(
            report.details,
            Some(json!({ "version": ["Version must be in format 'X.Y' (e.g., 1.0)."] }))
        );
    }

    #[test]
    fn internal_error_does_not_leak_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3:5432"));
        let body = ErrorReport::from(err).into_body("/api/v1/courses".into(), &Method::GET);

        assert_eq!(body.status_code, 500);
        assert_eq!(body.error, "Internal server error");
        assert_eq!(body.message, "An unexpected error occurred.");
        assert!(body.details.is_none());
    }

    #[test]
    fn capacity_error_is_a_bad_request() {
        let err = AppError::Capacity("Department ID cannot exceed 9999".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), ErrorKind::Capacity);
    }
}
