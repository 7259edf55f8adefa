use axum::{
    extract::{MatchedPath, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, error, info, info_span};

use super::AppState;
use super::auth::RequestUser;

/// GET /metrics
/// Prometheus text exposition
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.prometheus_handle {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics are disabled").into_response(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    ClientError,
    ServerError,
}

impl Outcome {
    fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::ServerError
        } else if status.is_client_error() {
            Self::ClientError
        } else {
            Self::Success
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ClientError => "client_error",
            Self::ServerError => "error",
        }
    }
}

fn record_request_metrics(method: &str, route: &str, status: StatusCode, elapsed: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.as_u16().to_string()),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

/// Wraps every request in a `request` span. `user_id` is filled from the
/// [`RequestUser`] the auth middleware leaves on the response; one
/// "Request finished" event is emitted per request.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // Route templates keep metric label cardinality bounded.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |mp| mp.as_str().to_string());

    let origin = req
        .headers()
        .get(axum::http::header::ORIGIN)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let span = info_span!(
        "request",
        request_id = %uuid::Uuid::new_v4(),
        method = %method,
        path = %path,
        route = %route,
        user_id = tracing::field::Empty,
    );

    async move {
        let response = next.run(req).await;
        if let Some(RequestUser(user_id)) = response.extensions().get::<RequestUser>() {
            tracing::Span::current().record("user_id", user_id);
        }

        let elapsed = start.elapsed();
        let status = response.status();
        let outcome = Outcome::from_status(status);

        record_request_metrics(&method, &route, status, elapsed);

        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        if outcome == Outcome::ServerError {
            error!(
                duration_ms,
                status_code = status.as_u16(),
                origin = %origin,
                outcome = outcome.as_str(),
                "Request finished"
            );
        } else {
            info!(
                duration_ms,
                status_code = status.as_u16(),
                origin = %origin,
                outcome = outcome.as_str(),
                "Request finished"
            );
        }

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_follows_status_class() {
        assert_eq!(Outcome::from_status(StatusCode::CREATED), Outcome::Success);
        assert_eq!(Outcome::from_status(StatusCode::CONFLICT), Outcome::ClientError);
        assert_eq!(
            Outcome::from_status(StatusCode::SERVICE_UNAVAILABLE).as_str(),
            "error"
        );
    }
}
