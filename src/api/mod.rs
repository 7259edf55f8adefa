use axum::{
    Router,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::Mailer;
use crate::state::SharedState;

pub mod auth;
pub mod cors;
mod courses;
mod error;
mod extract;
mod favorites;
mod observability;
mod people;
mod surveys;
mod system;
mod validation;

pub use error::{ApiError, ErrorBody, ErrorKind};
pub use extract::{EntityId, JsonBody};

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn course_service(&self) -> &crate::services::CourseService {
        &self.shared.course_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn create_app_state_with_mailer(
    config: Config,
    mailer: Arc<dyn Mailer>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_mailer(config, mailer).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let require_auth = middleware::from_fn_with_state(state.clone(), auth::auth_middleware);

    // `/people` mixes a public POST (registration) with a protected GET.
    let public_routes = Router::new()
        .route("/auth", post(auth::login))
        .route("/health", get(system::health))
        .route(
            "/people",
            get(people::list_people)
                .route_layer(require_auth.clone())
                .post(people::create_person),
        )
        .route("/people/reset", post(people::request_reset))
        .route("/people/reset/confirm", post(people::confirm_reset));

    Router::new()
        .merge(public_routes)
        .merge(create_protected_router().route_layer(require_auth))
        .with_state(state)
        .layer(cors::cors_layer())
        .layer(middleware::from_fn(cors::cors_defaults))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/people/{id}",
            get(people::get_person)
                .put(people::update_person)
                .patch(people::update_person)
                .delete(people::delete_person),
        )
        .route(
            "/people/{id}/update",
            put(people::change_password).patch(people::change_password),
        )
        .route(
            "/favorite",
            get(favorites::list_favorites).post(favorites::add_favorite),
        )
        .route(
            "/favorite/{id}",
            axum::routing::delete(favorites::delete_favorite),
        )
        .route(
            "/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route(
            "/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .patch(courses::update_course)
                .delete(courses::delete_course),
        )
        .route(
            "/courses/{id}/status",
            put(courses::update_course_status).patch(courses::update_course_status),
        )
        .route("/courses/{id}/open", get(courses::open_course))
        .route(
            "/survey",
            get(surveys::list_surveys).post(surveys::create_survey),
        )
        .route("/metrics", get(observability::get_metrics))
}
