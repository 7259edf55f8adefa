use anyhow::Context;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::db::{StoreResult, conflict_on_unique};
use crate::entities::people;
use crate::models::{Role, normalize_email};

const EMAIL_CONFLICT: &str = "email must be unique";

pub struct PersonRepository {
    conn: DatabaseConnection,
}

impl PersonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<people::Model>> {
        Ok(people::Entity::find()
            .order_by_asc(people::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<people::Model>> {
        Ok(people::Entity::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> StoreResult<Option<people::Model>> {
        Ok(people::Entity::find()
            .filter(people::Column::Email.eq(normalize_email(email)))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_by_token(&self, token: &str) -> StoreResult<Option<people::Model>> {
        Ok(people::Entity::find()
            .filter(people::Column::Token.eq(token))
            .one(&self.conn)
            .await?)
    }

    pub async fn get_by_reset_token(
        &self,
        reset_token: &str,
    ) -> StoreResult<Option<people::Model>> {
        Ok(people::Entity::find()
            .filter(people::Column::ResetToken.eq(reset_token))
            .one(&self.conn)
            .await?)
    }

    /// Inserts a person. The UNIQUE constraint on `email` is the duplicate check.
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        role: Role,
        password: &str,
        security: &SecurityConfig,
    ) -> StoreResult<people::Model> {
        let password_hash = hash_password(password, security).await?;
        let now = chrono::Utc::now().to_rfc3339();

        let active = people::ActiveModel {
            full_name: Set(full_name.to_string()),
            email: Set(normalize_email(email).to_string()),
            role: Set(role.as_str().to_string()),
            password_hash: Set(password_hash),
            token: Set(None),
            reset_token: Set(None),
            reset_expires_at: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .map_err(|e| conflict_on_unique(e, EMAIL_CONFLICT))
    }

    pub async fn update_profile(
        &self,
        person: people::Model,
        full_name: Option<String>,
        email: Option<String>,
    ) -> StoreResult<people::Model> {
        let mut active: people::ActiveModel = person.into();
        if let Some(full_name) = full_name {
            active.full_name = Set(full_name);
        }
        if let Some(email) = email {
            active.email = Set(normalize_email(&email).to_string());
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        active
            .update(&self.conn)
            .await
            .map_err(|e| conflict_on_unique(e, EMAIL_CONFLICT))
    }

    pub async fn update_password(
        &self,
        person: people::Model,
        new_password: &str,
        security: &SecurityConfig,
    ) -> StoreResult<people::Model> {
        let new_hash = hash_password(new_password, security).await?;

        let mut active: people::ActiveModel = person.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        Ok(active.update(&self.conn).await?)
    }

    pub async fn set_token(&self, person: people::Model, token: &str) -> StoreResult<()> {
        let mut active: people::ActiveModel = person.into();
        active.token = Set(Some(token.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;
        Ok(())
    }

    pub async fn set_reset_token(
        &self,
        person: people::Model,
        reset_token: &str,
        expires_at: &str,
    ) -> StoreResult<()> {
        let mut active: people::ActiveModel = person.into();
        active.reset_token = Set(Some(reset_token.to_string()));
        active.reset_expires_at = Set(Some(expires_at.to_string()));
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;
        Ok(())
    }

    /// Replaces the password and burns both the reset token and the bearer token.
    pub async fn complete_reset(
        &self,
        person: people::Model,
        new_password: &str,
        security: &SecurityConfig,
    ) -> StoreResult<()> {
        let new_hash = hash_password(new_password, security).await?;

        let mut active: people::ActiveModel = person.into();
        active.password_hash = Set(new_hash);
        active.reset_token = Set(None);
        active.reset_expires_at = Set(None);
        active.token = Set(None);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.conn).await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = people::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}

/// Hash a password with Argon2id on the blocking pool.
pub async fn hash_password(password: &str, config: &SecurityConfig) -> anyhow::Result<String> {
    let password = password.to_string();
    let config = config.clone();

    task::spawn_blocking(move || hash_password_blocking(&password, &config))
        .await
        .context("Password hashing task panicked")?
}

fn hash_password_blocking(password: &str, config: &SecurityConfig) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify `password` against a stored PHC string.
/// Uses `spawn_blocking` because Argon2 is CPU-intensive.
pub async fn verify_password(password_hash: &str, password: &str) -> anyhow::Result<bool> {
    let password_hash = password_hash.to_string();
    let password = password.to_string();

    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn hashes_verify_only_the_original_password() {
        let hash = hash_password("hunter2", &cheap_params()).await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "hunter2").await.unwrap());
        assert!(!verify_password(&hash, "hunter3").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_an_error() {
        assert!(verify_password("plaintext", "plaintext").await.is_err());
    }
}
