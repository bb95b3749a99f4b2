use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDoc {
    pub id: Uuid,
    pub user_id: String,
    pub service_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[schema(example = "booked")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPageDoc { pub items: Vec<AppointmentDoc>, pub page: u64, pub page_size: u64 }

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentDoc {
    pub service_id: String,
    /// Preferred over `startAt`.
    pub scheduled_for: Option<String>,
    pub start_at: Option<String>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDoc {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 30)]
    pub duration_min: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePageDoc { pub items: Vec<ServiceDoc>, pub page: u64, pub page_size: u64 }

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInputDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_min: Option<i64>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPageDoc { pub items: Vec<UserDoc>, pub page: u64, pub page_size: u64 }

#[derive(ToSchema)]
pub struct UserInputDoc { pub name: Option<String>, pub email: Option<String> }

#[derive(IntoParams)]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct AppointmentListParams {
    pub page: Option<i64>,
    /// Clamped to 100.
    pub page_size: Option<i64>,
    /// booked, confirmed, canceled, or scheduled (alias of booked).
    pub status: Option<String>,
    /// Operators and admins only.
    pub user_id: Option<String>,
    /// Operators and admins only.
    pub service_id: Option<String>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ServiceListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Case-insensitive substring.
    pub name: Option<String>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::appointments::list,
        crate::routes::appointments::get,
        crate::routes::appointments::create,
        crate::routes::appointments::confirm,
        crate::routes::appointments::cancel,
        crate::routes::services::list,
        crate::routes::services::get,
        crate::routes::services::create,
        crate::routes::services::update,
        crate::routes::services::delete,
        crate::routes::users::list,
        crate::routes::users::get,
        crate::routes::users::create,
        crate::routes::users::update,
        crate::routes::users::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            AppointmentDoc,
            AppointmentPageDoc,
            CreateAppointmentDoc,
            ServiceDoc,
            ServicePageDoc,
            ServiceInputDoc,
            UserDoc,
            UserPageDoc,
            UserInputDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "appointments", description = "Booking workflow"),
        (name = "services", description = "Service catalog"),
        (name = "users", description = "User directory"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for p in ["/health", "/appointments", "/appointments/{id}", "/appointments/{id}/confirm", "/appointments/{id}/cancel", "/services/{id}", "/users/{id}"] {
            assert!(paths.iter().any(|k| k.as_str() == p), "missing {p}");
        }
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["components"]["securitySchemes"]["bearer"].is_object());
    }
}
