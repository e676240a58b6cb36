pub mod activities;
pub mod attendance;
pub mod classes;
pub mod me;
pub mod reports;
pub mod students;

use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use common::types::Health;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use crate::identity;
use crate::observability;
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Trimmed query value, `None` when absent or blank.
pub(crate) fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Routes under `/api`, all behind the identity middleware.
fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/students", get(students::list).post(students::create))
        .route(
            "/api/students/:id",
            get(students::get).put(students::update).delete(students::delete),
        )
        .route("/api/students/:id/summary", get(reports::student_summary))
        .route("/api/classes", get(classes::list).post(classes::create))
        .route(
            "/api/classes/:id",
            get(classes::get).put(classes::update).delete(classes::delete),
        )
        .route("/api/attendance", get(attendance::list).post(attendance::create))
        .route(
            "/api/attendance/:id",
            get(attendance::get).put(attendance::update).delete(attendance::delete),
        )
        .route("/api/activities", get(activities::list))
        .route("/api/dashboard/stats", get(reports::dashboard))
        .route("/api/reports/attendance", get(reports::attendance))
        .route("/api/reports/students", get(reports::students))
        .route("/api/my-attendance", get(me::my_attendance))
        .route("/api/my-profile", get(me::my_profile))
        .route_layer(middleware::from_fn_with_state(state, identity::require_identity))
}

/// Build the full application router: public probes plus the protected API.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    public
        .merge(api_routes(state.clone()))
        .with_state(state)
        .layer(middleware::from_fn(observability::track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
