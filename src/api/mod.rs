use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::state::SharedState;

mod attendance;
pub mod auth;
mod embeddings;
mod error;
mod observability;
mod system;
mod tasks;
mod trainings;
mod types;
mod upload;
mod user;

pub use auth::CurrentUser;
pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(shared: Arc<SharedState>, prometheus_handle: Option<PrometheusHandle>) -> Arc<Self> {
        Arc::new(Self {
            shared,
            start_time: std::time::Instant::now(),
            prometheus_handle,
        })
    }

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
    pub fn user_service(&self) -> &Arc<dyn crate::services::UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn attendance_service(&self) -> &Arc<dyn crate::services::AttendanceService> {
        &self.shared.attendance_service
    }

    #[must_use]
    pub fn task_service(&self) -> &Arc<dyn crate::services::TaskService> {
        &self.shared.task_service
    }

    #[must_use]
    pub fn training_service(&self) -> &Arc<dyn crate::services::TrainingService> {
        &self.shared.training_service
    }

    #[must_use]
    pub fn embedding_service(&self) -> &Arc<dyn crate::services::EmbeddingService> {
        &self.shared.embedding_service
    }
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(AppState::new(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let config = state.config();
    let uploads_path = config.general.uploads_path.clone();
    let cors_origins = config.server.cors_allowed_origins.clone();
    let api_prefix = config.server.api_prefix.trim_end_matches('/').to_string();
    let body_limit = config.server.max_upload_bytes;
    let metrics_enabled = config.observability.metrics_enabled;

    let mut public_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/health", get(system::health));
    if metrics_enabled {
        public_routes = public_routes.route("/metrics", get(observability::get_metrics));
    }

    let api_router = Router::new()
        .merge(public_routes)
        .merge(create_embedding_router(state.clone()))
        .merge(create_protected_router(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let app = if api_prefix.is_empty() {
        api_router
    } else {
        Router::new().nest(&api_prefix, api_router)
    };

    app.nest_service("/uploads", ServeDir::new(uploads_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Routes for the recognition service. Guarded only when an API key is configured.
fn create_embedding_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/embeddings", post(embeddings::save_embedding))
        .route(
            "/embeddings/user/{user_id}",
            get(embeddings::get_embedding).delete(embeddings::delete_embedding),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            embeddings::embedding_key_middleware,
        ))
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/attendance/clock-in", post(attendance::clock_in))
        .route("/attendance/clock-out", post(attendance::clock_out))
        .route("/attendance/today", get(attendance::today))
        .route("/attendance/history", get(attendance::history))
        .route(
            "/user/upload-profile-photo",
            post(user::upload_profile_photo),
        )
        .route("/user/profile", put(user::update_profile))
        .route("/user/change-password", put(user::change_password))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/trainings", get(trainings::list_trainings))
        .route("/trainings/{id}", get(trainings::get_training))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
