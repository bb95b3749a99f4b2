use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use service::pagination::Page;
use service::users::domain::{CreateUserInput, ListUsersQuery, UpdateUserInput, User};

use crate::errors::JsonApiError;
use crate::extractor::Auth;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/users", tag = "users",
    params(crate::openapi::PageParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of users", body = crate::openapi::UserPageDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    auth: Auth,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<Page<User>>, JsonApiError> {
    auth.require()?;
    let Query(query) = query?;
    Ok(Json(state.users.list(auth.0.as_ref(), query).await?))
}

#[utoipa::path(
    get, path = "/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User", body = crate::openapi::UserDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Self or admin only", body = crate::openapi::ErrorResponse),
        (status = 404, description = "User not found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<Json<User>, JsonApiError> {
    Ok(Json(state.users.get(identity.as_ref(), &id).await?))
}

#[utoipa::path(
    post, path = "/users", tag = "users",
    request_body = crate::openapi::UserInputDoc,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error or email in use", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    auth: Auth,
    payload: Result<Json<CreateUserInput>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), JsonApiError> {
    auth.require()?;
    let Json(input) = payload?;
    let created = state.users.create(auth.0.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put, path = "/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    request_body = crate::openapi::UserInputDoc,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Self or admin only", body = crate::openapi::ErrorResponse),
        (status = 404, description = "User not found", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    auth: Auth,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserInput>, JsonRejection>,
) -> Result<Json<User>, JsonApiError> {
    auth.require()?;
    let Json(input) = payload?;
    Ok(Json(state.users.update(auth.0.as_ref(), &id, input).await?))
}

#[utoipa::path(
    delete, path = "/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Admin only", body = crate::openapi::ErrorResponse),
        (status = 404, description = "User not found", body = crate::openapi::ErrorResponse),
        (status = 409, description = "User has appointments", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn delete(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<StatusCode, JsonApiError> {
    state.users.delete(identity.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
