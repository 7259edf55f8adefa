//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SecurityConfig;
use crate::db::{Store, verify_password};
use crate::models::{NewPerson, Person, Role};
use crate::services::auth_service::{AuthError, AuthService, AuthUser, LoginResult};
use crate::services::mailer::{Mailer, OutgoingMail};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
    mailer: Arc<dyn Mailer>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(store: Store, security: SecurityConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store,
            security,
            mailer,
        }
    }

    async fn insert_person(
        &self,
        full_name: &str,
        email: &str,
        role: Role,
        password: &str,
    ) -> Result<Person, AuthError> {
        if email.trim().is_empty() || password.is_empty() || full_name.trim().is_empty() {
            return Err(AuthError::Validation("validation failed".to_string()));
        }

        let person = self
            .store
            .create_person(full_name.trim(), email, role, password, &self.security)
            .await?;

        Ok(Person::from(person))
    }
}

/// Random 64-character hex string for single-use reset tokens.
#[must_use]
pub fn generate_reset_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

fn reset_token_expiry(now: DateTime<Utc>, ttl_minutes: i64) -> Option<DateTime<Utc>> {
    Duration::try_minutes(ttl_minutes).and_then(|ttl| now.checked_add_signed(ttl))
}

fn reset_token_expired(expires_at: Option<&str>, now: DateTime<Utc>) -> bool {
    expires_at
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .is_none_or(|expiry| expiry.with_timezone(&Utc) <= now)
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        let person = self
            .store
            .get_person_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&person.password_hash, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = uuid::Uuid::new_v4().to_string();
        let id = person.id;
        let user_role = person.role.parse().unwrap_or_default();

        self.store.set_person_token(person, &token).await?;

        Ok(LoginResult {
            token,
            id,
            user_role,
        })
    }

    async fn authenticate(&self, token: &str) -> Result<Option<AuthUser>, AuthError> {
        let person = self.store.get_person_by_token(token).await?;

        Ok(person.map(|p| AuthUser {
            id: p.id,
            role: p.role.parse().unwrap_or_default(),
            email: p.email,
        }))
    }

    async fn register(&self, new_person: NewPerson) -> Result<Person, AuthError> {
        if new_person.role.is_admin() {
            return Err(AuthError::Forbidden(
                "admin accounts cannot be self-registered".to_string(),
            ));
        }

        let person = self
            .insert_person(
                &new_person.full_name,
                &new_person.email,
                new_person.role,
                &new_person.password,
            )
            .await?;

        info!(person_id = person.id, role = %person.role, "Person registered");
        Ok(person)
    }

    async fn create_admin(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Person, AuthError> {
        let person = self
            .insert_person(full_name, email, Role::Admin, password)
            .await?;

        info!(person_id = person.id, "Admin account created");
        Ok(person)
    }

    async fn change_password(
        &self,
        actor: &AuthUser,
        person_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<Person, AuthError> {
        if !actor.can_manage(person_id) {
            return Err(AuthError::Forbidden(
                "not allowed to change this password".to_string(),
            ));
        }

        if new_password.is_empty() {
            return Err(AuthError::Validation("validation failed".to_string()));
        }

        let person = self
            .store
            .get_person(person_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !verify_password(&person.password_hash, current_password).await? {
            return Err(AuthError::InvalidPassword);
        }

        let updated = self
            .store
            .update_person_password(person, new_password, &self.security)
            .await?;

        info!(person_id, actor_id = actor.id, "Password changed");
        Ok(Person::from(updated))
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation("validation failed".to_string()));
        }

        let person = self
            .store
            .get_person_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let reset_token = generate_reset_token();
        let expires_at = reset_token_expiry(Utc::now(), self.security.reset_token_ttl_minutes)
            .ok_or_else(|| {
                AuthError::Internal(format!(
                    "reset token ttl of {} minutes is out of range",
                    self.security.reset_token_ttl_minutes
                ))
            })?
            .to_rfc3339();
        let to = person.email.clone();
        let person_id = person.id;

        self.store
            .set_person_reset_token(person, &reset_token, &expires_at)
            .await?;

        let mail = OutgoingMail {
            to,
            subject: "Codestack password reset".to_string(),
            text: format!(
                "A password reset was requested for your Codestack account.\n\n\
                 Reset code: {reset_token}\n\n\
                 The code expires at {expires_at}. If you did not request a reset, ignore this message."
            ),
        };

        self.mailer.send(mail).await?;

        info!(person_id, "Password reset requested");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if reset_token.is_empty() || new_password.is_empty() {
            return Err(AuthError::Validation("validation failed".to_string()));
        }

        let person = self
            .store
            .get_person_by_reset_token(reset_token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        if reset_token_expired(person.reset_expires_at.as_deref(), Utc::now()) {
            warn!(person_id = person.id, "Expired password reset token presented");
            return Err(AuthError::InvalidResetToken);
        }

        let person_id = person.id;
        self.store
            .complete_password_reset(person, new_password, &self.security)
            .await?;

        info!(person_id, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_tokens_are_hex_and_unique() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn expired_reset_tokens_are_detected() {
        let now = Utc::now();
        let later = (now + Duration::minutes(5)).to_rfc3339();
        let earlier = (now - Duration::minutes(5)).to_rfc3339();

        assert!(!reset_token_expired(Some(&later), now));
        assert!(reset_token_expired(Some(&earlier), now));
        assert!(reset_token_expired(None, now));
        assert!(reset_token_expired(Some("yesterday"), now));
    }

    #[test]
    fn reset_token_expiry_rejects_out_of_range_ttl() {
        let now = Utc::now();
        assert_eq!(
            reset_token_expiry(now, 30),
            Some(now + Duration::minutes(30))
        );
        assert!(reset_token_expiry(now, i64::MAX / 2).is_none());
        assert!(reset_token_expiry(now, i64::MAX).is_none());
    }

    #[test]
    fn only_owner_or_admin_can_manage() {
        let student = AuthUser {
            id: 1,
            email: "s@example.com".to_string(),
            role: Role::Student,
        };
        let admin = AuthUser {
            id: 9,
            email: "a@example.com".to_string(),
            role: Role::Admin,
        };

        assert!(student.can_manage(1));
        assert!(!student.can_manage(2));
        assert!(admin.can_manage(2));
    }
}
