use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::db::StoreResult;
use crate::entities::courses;
use crate::models::{CourseChanges, CourseStatus, NewCourse};

pub struct CourseRepository {
    conn: DatabaseConnection,
}

impl CourseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> StoreResult<Vec<courses::Model>> {
        Ok(courses::Entity::find()
            .order_by_asc(courses::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> StoreResult<Option<courses::Model>> {
        Ok(courses::Entity::find_by_id(id).one(&self.conn).await?)
    }

    /// Inserts the metadata row only; the attachment is written by the caller.
    pub async fn create(&self, course: &NewCourse) -> StoreResult<courses::Model> {
        let created_at = course
            .created_at
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        let active = courses::ActiveModel {
            name: Set(course.name.clone()),
            description: Set(course.description.clone()),
            teacher: Set(course.teacher.clone()),
            teacher_id: Set(course.teacher_id),
            status: Set(course.status.as_str().to_string()),
            created_at: Set(created_at),
            file_name: Set(course.file_name.clone()),
            ..Default::default()
        };

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn update(
        &self,
        course: courses::Model,
        changes: &CourseChanges,
    ) -> StoreResult<courses::Model> {
        let mut active: courses::ActiveModel = course.into();
        if let Some(name) = &changes.name {
            active.name = Set(name.clone());
        }
        if let Some(description) = &changes.description {
            active.description = Set(description.clone());
        }
        if let Some(file_name) = &changes.file_name {
            active.file_name = Set(file_name.clone());
        }

        Ok(active.update(&self.conn).await?)
    }

    pub async fn set_status(
        &self,
        course: courses::Model,
        status: CourseStatus,
    ) -> StoreResult<courses::Model> {
        let mut active: courses::ActiveModel = course.into();
        active.status = Set(status.as_str().to_string());
        Ok(active.update(&self.conn).await?)
    }

    pub async fn delete(&self, id: i32) -> StoreResult<bool> {
        let result = courses::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
