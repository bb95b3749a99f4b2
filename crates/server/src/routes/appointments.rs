use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    http::StatusCode,
    Json,
};
use service::appointments::domain::{Appointment, CreateAppointmentInput, ListAppointmentsQuery};
use service::pagination::Page;
use service::ServiceError;

use crate::errors::JsonApiError;
use crate::extractor::Auth;
use crate::state::ServerState;

#[utoipa::path(
    get, path = "/appointments", tag = "appointments",
    params(crate::openapi::AppointmentListParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Page of appointments; plain users only see their own", body = crate::openapi::AppointmentPageDoc),
        (status = 400, description = "Invalid status filter", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    auth: Auth,
    query: Result<Query<ListAppointmentsQuery>, QueryRejection>,
) -> Result<Json<Page<Appointment>>, JsonApiError> {
    auth.require()?;
    let Query(query) = query?;
    Ok(Json(state.appointments.list(auth.0.as_ref(), query).await?))
}

#[utoipa::path(
    get, path = "/appointments/{id}", tag = "appointments",
    params(("id" = String, Path, description = "Appointment id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Appointment", body = crate::openapi::AppointmentDoc),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Not owner, operator or admin", body = crate::openapi::ErrorResponse),
        (status = 404, description = "No such appointment", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn get(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<Json<Appointment>, JsonApiError> {
    Ok(Json(state.appointments.get(identity.as_ref(), &id).await?))
}

#[utoipa::path(
    post, path = "/appointments", tag = "appointments",
    request_body = crate::openapi::CreateAppointmentDoc,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Booked", body = crate::openapi::AppointmentDoc),
        (status = 400, description = "Invalid input or unknown serviceId", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 409, description = "Time slot not available", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    auth: Auth,
    payload: Result<Json<CreateAppointmentInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), JsonApiError> {
    auth.require()?;
    let Json(input) = payload?;
    match state.appointments.create(auth.0.as_ref(), input).await {
        Ok(created) => {
            state.metrics.bookings_total.inc();
            Ok((StatusCode::CREATED, Json(created)))
        }
        Err(e @ ServiceError::Conflict(_)) => {
            state.metrics.booking_conflicts_total.inc();
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post, path = "/appointments/{id}/confirm", tag = "appointments",
    params(("id" = String, Path, description = "Appointment id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Confirmed (idempotent)", body = crate::openapi::AppointmentDoc),
        (status = 400, description = "Canceled or in the past", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Operator or admin only", body = crate::openapi::ErrorResponse),
        (status = 404, description = "No such appointment", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn confirm(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<Json<Appointment>, JsonApiError> {
    let (confirmed, changed) = state.appointments.confirm_reporting(identity.as_ref(), &id).await?;
    if changed {
        state.metrics.confirmations_total.inc();
    }
    Ok(Json(confirmed))
}

#[utoipa::path(
    post, path = "/appointments/{id}/cancel", tag = "appointments",
    params(("id" = String, Path, description = "Appointment id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Canceled", body = crate::openapi::AppointmentDoc),
        (status = 400, description = "Already canceled or in the past", body = crate::openapi::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::openapi::ErrorResponse),
        (status = 403, description = "Not owner, operator or admin", body = crate::openapi::ErrorResponse),
        (status = 404, description = "No such appointment", body = crate::openapi::ErrorResponse)
    )
)]
pub async fn cancel(State(state): State<ServerState>, Auth(identity): Auth, Path(id): Path<String>) -> Result<Json<Appointment>, JsonApiError> {
    let canceled = state.appointments.cancel(identity.as_ref(), &id).await?;
    state.metrics.cancellations_total.inc();
    Ok(Json(canceled))
}
