use thiserror::Error;
use tracing::{error, info};

use crate::db::{Store, StoreError};
use crate::models::{Course, CourseChanges, CourseStatus, NewCourse};
use crate::services::attachments::{AttachmentError, AttachmentStore, decode_data_url, encode_base64};

#[derive(Debug, Error)]
pub enum CourseError {
    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Keeps course rows and their PDF attachments in step.
#[derive(Clone)]
pub struct CourseService {
    store: Store,
    attachments: AttachmentStore,
}

impl CourseService {
    #[must_use]
    pub const fn new(store: Store, attachments: AttachmentStore) -> Self {
        Self { store, attachments }
    }

    pub async fn list(&self) -> Result<Vec<Course>, CourseError> {
        let courses = self.store.list_courses().await?;
        Ok(courses.into_iter().map(Course::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Course, CourseError> {
        self.store
            .get_course(id)
            .await?
            .map(Course::from)
            .ok_or(CourseError::NotFound)
    }

    /// Inserts the row and writes the attachment. The body is decoded before
    /// anything is persisted; a failed write removes the new row again.
    pub async fn create(&self, new_course: NewCourse) -> Result<Course, CourseError> {
        let attachment = decode_optional(&new_course.file_body)?;

        let course = self.store.create_course(&new_course).await?;

        if let Some(bytes) = attachment
            && let Err(e) = self.attachments.write(course.id, &bytes).await
        {
            error!(course_id = course.id, error = %e, "Attachment write failed, rolling back course");
            if let Err(cleanup) = self.store.delete_course(course.id).await {
                error!(course_id = course.id, error = %cleanup, "Failed to roll back course row");
            }
            return Err(e.into());
        }

        info!(course_id = course.id, name = %course.name, "Course created");
        Ok(Course::from(course))
    }

    pub async fn update(&self, id: i32, changes: CourseChanges) -> Result<Course, CourseError> {
        let course = self
            .store
            .get_course(id)
            .await?
            .ok_or(CourseError::NotFound)?;

        let attachment = changes
            .file_body
            .as_deref()
            .map(decode_optional)
            .transpose()?
            .flatten();

        if let Some(bytes) = attachment {
            self.attachments.write(id, &bytes).await?;
        }

        let updated = self.store.update_course(course, &changes).await?;
        Ok(Course::from(updated))
    }

    pub async fn set_status(&self, id: i32, status: CourseStatus) -> Result<Course, CourseError> {
        let course = self
            .store
            .get_course(id)
            .await?
            .ok_or(CourseError::NotFound)?;

        let updated = self.store.set_course_status(course, status).await?;
        info!(course_id = id, status = %status, "Course status changed");
        Ok(Course::from(updated))
    }

    /// Deletes the row, then removes the attachment best-effort.
    pub async fn delete(&self, id: i32) -> Result<(), CourseError> {
        if !self.store.delete_course(id).await? {
            return Err(CourseError::NotFound);
        }

        self.attachments.remove(id).await;
        info!(course_id = id, "Course deleted");
        Ok(())
    }

    /// Returns the attachment as standard base64.
    pub async fn open(&self, id: i32) -> Result<String, CourseError> {
        if self.store.get_course(id).await?.is_none() {
            return Err(CourseError::NotFound);
        }

        let bytes = self.attachments.read(id).await?;
        Ok(encode_base64(&bytes))
    }
}

/// An empty body means "no attachment supplied".
fn decode_optional(body: &str) -> Result<Option<Vec<u8>>, AttachmentError> {
    if body.trim().is_empty() {
        Ok(None)
    } else {
        decode_data_url(body).map(Some)
    }
}
