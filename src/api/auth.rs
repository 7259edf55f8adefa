use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, AppState, JsonBody};
use crate::services::LoginResult;

const MALFORMED_HEADER: &str =
    "Authorization token should be in the form of Authorization: Bearer <token>";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Id of the authenticated caller, carried on the response so the request
/// logging middleware can attach it to its span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestUser(pub i32);

/// Requires `Authorization: Bearer <token>` naming a logged-in person and
/// attaches the resolved [`AuthUser`](crate::services::AuthUser) to the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| ApiError::unauthorized(MALFORMED_HEADER))?;

    let user = state
        .auth_service()
        .authenticate(token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not Authorized"))?;

    let user_id = user.id;
    request.extensions_mut().insert(user);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(RequestUser(user_id));
    Ok(response)
}

/// Splits the header on single spaces; exactly `Bearer` and a token are accepted.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    match value.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] if !token.is_empty() => Some(*token),
        _ => None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth
/// Exchange email and password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(StatusCode, Json<LoginResult>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("validation failed"));
    }

    let result = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    tracing::info!(person_id = result.id, "Login succeeded");

    Ok((StatusCode::CREATED, Json(result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn accepts_bearer_with_single_token() {
        assert_eq!(bearer_token(&headers_with("Bearer abc-123")), Some("abc-123"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers_with("Bearer")), None);
        assert_eq!(bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(bearer_token(&headers_with("bearer abc")), None);
        assert_eq!(bearer_token(&headers_with("Bearer a b")), None);
        assert_eq!(bearer_token(&headers_with("Bearer  abc")), None);
    }
}
