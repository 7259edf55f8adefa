use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_positive_id;
use super::{ApiError, AppState, JsonBody};
use crate::models::{NewSurvey, Survey};

/// GET /survey
pub async fn list_surveys(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Survey>>, ApiError> {
    let surveys = state.store().list_surveys().await?;
    Ok(Json(surveys.into_iter().map(Survey::from).collect()))
}

/// POST /survey
pub async fn create_survey(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<NewSurvey>,
) -> Result<StatusCode, ApiError> {
    validate_positive_id(payload.course_id, "course_id")?;

    if state.store().get_course(payload.course_id).await?.is_none() {
        return Err(ApiError::not_found());
    }

    let survey = state.store().create_survey(payload).await?;
    tracing::debug!(survey_id = survey.id, course_id = survey.course_id, "Survey recorded");

    Ok(StatusCode::CREATED)
}
