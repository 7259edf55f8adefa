//! Domain service for accounts and credentials.
//!
//! Handles login, bearer-token resolution, registration, password changes and
//! the mailed reset-token flow.

use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::{NewPerson, Person, Role};
use crate::services::mailer::MailError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid or expired reset token")]
    InvalidResetToken,

    #[error("record not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("mail delivery failed: {0}")]
    Mail(#[from] MailError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Database(e) => Self::Database(e.to_string()),
            StoreError::Other(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Identity resolved from a bearer token, attached to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Whether this caller may act on the account `person_id`.
    #[must_use]
    pub fn can_manage(&self, person_id: i32) -> bool {
        self.id == person_id || self.role.is_admin()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub id: i32,
    pub user_role: Role,
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and issues a fresh bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a wrong password.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Resolves a bearer token to its owner, if any.
    async fn authenticate(&self, token: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Public registration. ADMIN accounts cannot be self-registered.
    async fn register(&self, new_person: NewPerson) -> Result<Person, AuthError>;

    /// Provisions an ADMIN account. Only reachable from the CLI.
    async fn create_admin(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Person, AuthError>;

    /// Changes the password of `person_id` after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Forbidden`] when `actor` is neither the owner nor an admin,
    /// and [`AuthError::InvalidPassword`] when `current_password` does not match.
    async fn change_password(
        &self,
        actor: &AuthUser,
        person_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<Person, AuthError>;

    /// Stores a single-use reset token for `email` and mails it.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Consumes a reset token and sets a new password.
    async fn confirm_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
