use crate::config::SecurityConfig;
use crate::entities::{courses, favorites, people, surveys};
use crate::models::{CourseChanges, CourseStatus, NewCourse, NewFavorite, NewSurvey, Role};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::person::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Maps a unique constraint violation to [`StoreError::Conflict`] with `message`.
pub(crate) fn conflict_on_unique(err: DbErr, message: &str) -> StoreError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        StoreError::Conflict(message.to_string())
    } else {
        StoreError::Database(err)
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> anyhow::Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> StoreResult<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn person_repo(&self) -> repositories::person::PersonRepository {
        repositories::person::PersonRepository::new(self.conn.clone())
    }

    fn course_repo(&self) -> repositories::course::CourseRepository {
        repositories::course::CourseRepository::new(self.conn.clone())
    }

    fn favorite_repo(&self) -> repositories::favorite::FavoriteRepository {
        repositories::favorite::FavoriteRepository::new(self.conn.clone())
    }

    fn survey_repo(&self) -> repositories::survey::SurveyRepository {
        repositories::survey::SurveyRepository::new(self.conn.clone())
    }

    // People

    pub async fn list_people(&self) -> StoreResult<Vec<people::Model>> {
        self.person_repo().list().await
    }

    pub async fn get_person(&self, id: i32) -> StoreResult<Option<people::Model>> {
        self.person_repo().get(id).await
    }

    pub async fn get_person_by_email(&self, email: &str) -> StoreResult<Option<people::Model>> {
        self.person_repo().get_by_email(email).await
    }

    pub async fn get_person_by_token(&self, token: &str) -> StoreResult<Option<people::Model>> {
        self.person_repo().get_by_token(token).await
    }

    pub async fn get_person_by_reset_token(
        &self,
        reset_token: &str,
    ) -> StoreResult<Option<people::Model>> {
        self.person_repo().get_by_reset_token(reset_token).await
    }

    pub async fn create_person(
        &self,
        full_name: &str,
        email: &str,
        role: Role,
        password: &str,
        security: &SecurityConfig,
    ) -> StoreResult<people::Model> {
        self.person_repo()
            .create(full_name, email, role, password, security)
            .await
    }

    pub async fn update_person_profile(
        &self,
        person: people::Model,
        full_name: Option<String>,
        email: Option<String>,
    ) -> StoreResult<people::Model> {
        self.person_repo()
            .update_profile(person, full_name, email)
            .await
    }

    pub async fn update_person_password(
        &self,
        person: people::Model,
        new_password: &str,
        security: &SecurityConfig,
    ) -> StoreResult<people::Model> {
        self.person_repo()
            .update_password(person, new_password, security)
            .await
    }

    pub async fn set_person_token(&self, person: people::Model, token: &str) -> StoreResult<()> {
        self.person_repo().set_token(person, token).await
    }

    pub async fn set_person_reset_token(
        &self,
        person: people::Model,
        reset_token: &str,
        expires_at: &str,
    ) -> StoreResult<()> {
        self.person_repo()
            .set_reset_token(person, reset_token, expires_at)
            .await
    }

    pub async fn complete_password_reset(
        &self,
        person: people::Model,
        new_password: &str,
        security: &SecurityConfig,
    ) -> StoreResult<()> {
        self.person_repo()
            .complete_reset(person, new_password, security)
            .await
    }

    pub async fn delete_person(&self, id: i32) -> StoreResult<bool> {
        self.person_repo().delete(id).await
    }

    // Courses

    pub async fn list_courses(&self) -> StoreResult<Vec<courses::Model>> {
        self.course_repo().list().await
    }

    pub async fn get_course(&self, id: i32) -> StoreResult<Option<courses::Model>> {
        self.course_repo().get(id).await
    }

    pub async fn create_course(&self, course: &NewCourse) -> StoreResult<courses::Model> {
        self.course_repo().create(course).await
    }

    pub async fn update_course(
        &self,
        course: courses::Model,
        changes: &CourseChanges,
    ) -> StoreResult<courses::Model> {
        self.course_repo().update(course, changes).await
    }

    pub async fn set_course_status(
        &self,
        course: courses::Model,
        status: CourseStatus,
    ) -> StoreResult<courses::Model> {
        self.course_repo().set_status(course, status).await
    }

    pub async fn delete_course(&self, id: i32) -> StoreResult<bool> {
        self.course_repo().delete(id).await
    }

    // Favorites

    pub async fn list_favorites(&self) -> StoreResult<Vec<favorites::Model>> {
        self.favorite_repo().list().await
    }

    pub async fn create_favorite(&self, favorite: NewFavorite) -> StoreResult<favorites::Model> {
        self.favorite_repo().create(favorite).await
    }

    pub async fn delete_favorite(&self, id: i32) -> StoreResult<bool> {
        self.favorite_repo().delete(id).await
    }

    // Surveys

    pub async fn list_surveys(&self) -> StoreResult<Vec<surveys::Model>> {
        self.survey_repo().list().await
    }

    pub async fn create_survey(&self, survey: NewSurvey) -> StoreResult<surveys::Model> {
        self.survey_repo().create(survey).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> Store {
        let path = std::env::temp_dir().join(format!("codestack-store-{}.db", uuid::Uuid::new_v4()));
        Store::new(&format!("sqlite:{}", path.display())).await.unwrap()
    }

    fn cheap_security() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = temp_store().await;
        let security = cheap_security();

        store
            .create_person("Ada", "ada@example.com", Role::Teacher, "pw", &security)
            .await
            .unwrap();
        let err = store
            .create_person("Ada 2", "ada@example.com", Role::Student, "pw", &security)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(ref msg) if msg == "email must be unique"));
        assert_eq!(store.list_people().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn emails_are_stored_and_matched_trimmed() {
        let store = temp_store().await;
        let security = cheap_security();

        let person = store
            .create_person("Cy", "  cy@example.com ", Role::Student, "pw", &security)
            .await
            .unwrap();
        assert_eq!(person.email, "cy@example.com");

        let found = store.get_person_by_email("cy@example.com  ").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(person.id));

        let updated = store
            .update_person_profile(person, None, Some(" cy2@example.com".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.email, "cy2@example.com");
    }

    #[tokio::test]
    async fn favorites_pair_is_unique() {
        let store = temp_store().await;
        let pair = NewFavorite {
            user_id: 1,
            course_id: 2,
        };

        store.create_favorite(pair).await.unwrap();
        let err = store.create_favorite(pair).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store
            .create_favorite(NewFavorite {
                user_id: 1,
                course_id: 3,
            })
            .await
            .unwrap();
        assert_eq!(store.list_favorites().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reset_completion_clears_tokens() {
        let store = temp_store().await;
        let security = cheap_security();

        let person = store
            .create_person("Bo", "bo@example.com", Role::Student, "pw", &security)
            .await
            .unwrap();
        store.set_person_token(person.clone(), "bearer").await.unwrap();

        let person = store.get_person(person.id).await.unwrap().unwrap();
        store
            .set_person_reset_token(person, "reset", "2099-01-01T00:00:00+00:00")
            .await
            .unwrap();

        let person = store.get_person_by_reset_token("reset").await.unwrap().unwrap();
        store
            .complete_password_reset(person, "new", &security)
            .await
            .unwrap();

        assert!(store.get_person_by_token("bearer").await.unwrap().is_none());
        assert!(store.get_person_by_reset_token("reset").await.unwrap().is_none());
        store.ping().await.unwrap();
    }

    #[tokio::test]
    async fn deleting_missing_rows_reports_false() {
        let store = temp_store().await;
        assert!(!store.delete_person(42).await.unwrap());
        assert!(!store.delete_course(42).await.unwrap());
        assert!(!store.delete_favorite(42).await.unwrap());
    }
}
