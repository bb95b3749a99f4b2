use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use service::catalog::domain::{CreateServiceInput, ListServicesQuery, Service, UpdateServiceInput};
use service::pagination::Page;

use crate::errors::JsonApiError;
use crate::extractor::Auth;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/services", tag = "services",
    params(crate::openapi::ServiceListParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of services", body = crate::openapi::ServicePageDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    auth: Auth,
    query: Result<Query<ListServicesQuery>, QueryRejection>,
) -> Result<Json<Page<Service>>, JsonApiError> {
    auth.require()?;
    let Query(query) = query?;
    Ok(Json(state.catalog.list(auth.0.as_ref(), query).await?))
}

#[utoipa::path(
    get, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Service", body = crate::openapi::ServiceDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 404, description = "Service not found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<Json<Service>, JsonApiError> {
    Ok(Json(state.catalog.get(identity.as_ref(), &id).await?))
}

#[utoipa::path(
    post, path = "/services", tag = "services",
    request_body = crate::openapi::ServiceInputDoc,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = crate::openapi::ServiceDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    auth: Auth,
    payload: Result<Json<CreateServiceInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Service>), JsonApiError> {
    auth.require()?;
    let Json(input) = payload?;
    let created = state.catalog.create(auth.0.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    request_body = crate::openapi::ServiceInputDoc,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ServiceDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::openapi::ErrorResponse),
        (status = 404, description = "Service not found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    auth: Auth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateServiceInput>, JsonRejection>,
) -> Result<Json<Service>, JsonApiError> {
    auth.require()?;
    let Json(input) = payload?;
    Ok(Json(state.catalog.update(auth.0.as_ref(), &id, input).await?))
}

#[utoipa::path(
    delete, path = "/services/{id}", tag = "services",
    params(("id" = String, Path, description = "Service id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::openapi::ErrorResponse),
        (status = 404, description = "Service not found", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Service has appointments", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn delete(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.catalog.delete(identity.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
