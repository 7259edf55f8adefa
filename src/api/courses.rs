use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_required;
use super::{ApiError, AppState, EntityId, JsonBody};
use crate::models::{Course, CourseChanges, CourseStatus, NewCourse};

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct StatusRequest {
    pub status: String,
}

/// GET /courses
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.course_service().list().await?))
}

/// GET /courses/{id}
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(state.course_service().get(id).await?))
}

/// POST /courses
/// Create a course; `file_body` carries the PDF as a base64 data URL
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<NewCourse>,
) -> Result<impl IntoResponse, ApiError> {
    validate_required(&payload.name)?;

    let course = state.course_service().create(payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/courses/{}", course.id))],
    ))
}

/// PUT|PATCH /courses/{id}
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    JsonBody(changes): JsonBody<CourseChanges>,
) -> Result<Json<Course>, ApiError> {
    if let Some(name) = &changes.name {
        validate_required(name)?;
    }

    Ok(Json(state.course_service().update(id, changes).await?))
}

/// PUT|PATCH /courses/{id}/status
pub async fn update_course_status(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
    JsonBody(payload): JsonBody<StatusRequest>,
) -> Result<Json<Course>, ApiError> {
    let status: CourseStatus = validate_required(&payload.status)?
        .parse()
        .map_err(|e: crate::models::UnknownVariant| ApiError::validation(e.to_string()))?;

    Ok(Json(state.course_service().set_status(id, status).await?))
}

/// DELETE /courses/{id}
pub async fn delete_course(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    state.course_service().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /courses/{id}/open
/// Attachment bytes as a base64 JSON string
pub async fn open_course(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<String>, ApiError> {
    Ok(Json(state.course_service().open(id).await?))
}
