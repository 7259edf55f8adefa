use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

use crate::db::StoreError;
use crate::services::{AttachmentError, AuthError, CourseError};

/// Stable, machine-readable error kind sent as `code` in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Conflict,
    DatabaseError,
    StorageError,
    MailError,
    InternalError,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: ErrorKind,
}

#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    Conflict(String),

    DatabaseError(String),

    StorageError(String),

    MailError(String),

    InternalError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::StorageError(msg) => write!(f, "Storage error: {msg}"),
            Self::MailError(msg) => write!(f, "Mail error: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) => ErrorKind::BadRequest,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::DatabaseError(_) => ErrorKind::DatabaseError,
            Self::StorageError(_) => ErrorKind::StorageError,
            Self::MailError(_) => ErrorKind::MailError,
            Self::InternalError(_) => ErrorKind::InternalError,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_)
            | Self::StorageError(_)
            | Self::MailError(_)
            | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::NotFound("record not found".to_string())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.kind();

        let message = match self {
            Self::ValidationError(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg,
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                "unknown database error".to_string()
            }
            Self::StorageError(msg) => {
                tracing::error!("Attachment storage error: {}", msg);
                "attachment storage failed".to_string()
            }
            Self::MailError(msg) => {
                tracing::error!("Mail error: {}", msg);
                "mail delivery failed".to_string()
            }
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        };

        (status, Json(ErrorBody { message, code })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Database(e) => Self::DatabaseError(e.to_string()),
            StoreError::Other(e) => Self::InternalError(e.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidPassword
            | AuthError::InvalidResetToken => Self::Unauthorized(err.to_string()),
            AuthError::NotFound => Self::not_found(),
            AuthError::Validation(msg) => Self::ValidationError(msg),
            AuthError::Forbidden(msg) => Self::Forbidden(msg),
            AuthError::Conflict(msg) => Self::Conflict(msg),
            AuthError::Mail(e) => Self::MailError(e.to_string()),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::InternalError(msg),
        }
    }
}

impl From<AttachmentError> for ApiError {
    fn from(err: AttachmentError) -> Self {
        match err {
            AttachmentError::Encoding(_) => Self::validation("invalid attachment encoding"),
            AttachmentError::NotFound => Self::NotFound("attachment not found".to_string()),
            AttachmentError::Io { .. } => Self::StorageError(err.to_string()),
        }
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::NotFound => Self::not_found(),
            CourseError::Attachment(e) => e.into(),
            CourseError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::MailError("relay down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Forbidden("no".into()).kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn store_conflicts_become_409() {
        let err: ApiError = StoreError::Conflict("email must be unique".into()).into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ApiError = StoreError::Database(DbErr::Custom("boom".into())).into();
        assert_eq!(err.kind(), ErrorKind::DatabaseError);
    }

    #[test]
    fn credential_failures_keep_their_message() {
        let err: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Unauthorized: invalid email or password");
    }

    #[test]
    fn error_kind_serializes_screaming_snake_case() {
        let body = serde_json::to_value(ErrorBody {
            message: "record not found".into(),
            code: ErrorKind::NotFound,
        })
        .unwrap();
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["message"], "record not found");
    }
}
