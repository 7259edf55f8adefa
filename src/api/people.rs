use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_required};
use super::{ApiError, AppState, EntityId, JsonBody};
use crate::models::{NewPerson, Person, PersonChanges};
use crate::services::AuthUser;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ChangePasswordRequest {
    pub password: String,
    pub new_password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ResetConfirmRequest {
    pub token: String,
    pub new_password: String,
}

/// GET /people
pub async fn list_people(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let people = state.store().list_people().await?;
    Ok(Json(people.into_iter().map(Person::from).collect()))
}

/// GET /people/{id}
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    EntityId(id): EntityId,
) -> Result<Json<Person>, ApiError> {
    let person = state
        .store()
        .get_person(id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(Person::from(person)))
}

/// POST /people
/// Public registration
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
    validate_email(&payload.email)?;

    let person = state.auth_service().register(payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/people/{}", person.id))],
    ))
}

/// PUT|PATCH /people/{id}
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    EntityId(id): EntityId,
    JsonBody(changes): JsonBody<PersonChanges>,
) -> Result<Json<Person>, ApiError> {
    if !caller.can_manage(id) {
        return Err(ApiError::Forbidden("not allowed to update this person".to_string()));
    }

    if let Some(full_name) = &changes.full_name {
        validate_required(full_name)?;
    }
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }

    let person = state
        .store()
        .get_person(id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    if changes.is_empty() {
        return Ok(Json(Person::from(person)));
    }

    let updated = state
        .store()
        .update_person_profile(person, changes.full_name, changes.email)
        .await?;

    Ok(Json(Person::from(updated)))
}

/// PUT|PATCH /people/{id}/update
/// Change password after verifying the current one
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    EntityId(id): EntityId,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> Result<Json<Person>, ApiError> {
    let person = state
        .auth_service()
        .change_password(&caller, id, &payload.password, &payload.new_password)
        .await?;

    Ok(Json(person))
}

/// DELETE /people/{id}
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    EntityId(id): EntityId,
) -> Result<StatusCode, ApiError> {
    if !caller.can_manage(id) {
        return Err(ApiError::Forbidden("not allowed to delete this person".to_string()));
    }

    if !state.store().delete_person(id).await? {
        return Err(ApiError::not_found());
    }

    tracing::info!(person_id = id, actor_id = caller.id, "Person deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /people/reset
/// Mail a single-use reset code to the account owner
pub async fn request_reset(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<ResetRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service()
        .request_password_reset(&payload.email)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /people/reset/confirm
pub async fn confirm_reset(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<ResetConfirmRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .auth_service()
        .confirm_password_reset(&payload.token, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
