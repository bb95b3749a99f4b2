pub mod appointments;
pub mod services;
pub mod users;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse))
)]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics(State(state): State<ServerState>) -> impl IntoResponse {
    state.metrics.encode()
}

/// Resource routes, mounted both at the root and under `/api/v1`.
fn api_routes() -> Router<ServerState> {
    Router::new()
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route("/appointments/:id", get(appointments::get))
        .route("/appointments/:id/confirm", post(appointments::confirm))
        .route("/appointments/:id/cancel", post(appointments::cancel))
        .route("/services", get(services::list).post(services::create))
        .route("/services/:id", get(services::get).put(services::update).delete(services::delete))
        .route("/users", get(users::list).post(users::create))
        .route("/users/:id", get(users::get).put(users::update).delete(users::delete))
}

/// Build the full application router: health, metrics, API docs and the resource routes
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = api_routes();

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(api.clone())
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
