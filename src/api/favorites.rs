use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;

use super::validation::validate_positive_id;
use super::{ApiError, AppState, EntityId, JsonBody};
use crate::models::{Favorite, NewFavorite};

/// GET /favorite
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Favorite>>, ApiError> {
    let favorites = state.store().list_favorites().await?;
    Ok(Json(favorites.into_iter().map(Favorite::from).collect()))
}

/// POST /favorite
/// Mark a course as favorite for a person; a repeated pair is a 409
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<NewFavorite>,
) -> Result<impl IntoResponse, ApiError> {
    validate_positive_id(payload.user_id, "user_id")?;
    validate_positive_id(payload.course_id, "course_id")?;

    let store = state.store();
    if store.get_person(payload.user_id).await?.is_none()
        || store.get_course(payload.course_id).await?.is_none()
    {
        return Err(ApiError::not_found());
    }

    let favorite = store.create_favorite(payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/favorite/{}", favorite.id))],
    ))
}

/// DELETE /favorite/{id}
pub async fn delete_favorite(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    if !state.store().delete_favorite(id).await? {
        return Err(ApiError::not_found());
    }

    Ok(StatusCode::NO_CONTENT)
}
