//! Full stack over a real socket and Postgres. Skipped unless DATABASE_URL
//! is set and SKIP_DB_TESTS is not.

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use serde_json::{json, Value};
use server::metrics::Metrics;
use server::routes::build_router;
use server::ServerState;
use service::auth::{AuthManager, HmacAuthenticator, TokenRules};
use tower_http::cors::CorsLayer;

const SECRET: &[u8] = b"e2e-test-secret-0123456789abcdef";

async fn spawn_app() -> anyhow::Result<Option<String>> {
    dotenvy::dotenv().ok();
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let Ok(url) = std::env::var("DATABASE_URL") else { return Ok(None) };
    let cfg = configs::DatabaseConfig { url, ..configs::DatabaseConfig::default() };
    let db = models::db::connect_with_config(&cfg).await?;
    Migrator::up(&db, None).await?;

    let auth = AuthManager::new().with_authenticator(HmacAuthenticator::new(SECRET, TokenRules::default(), 600));
    let state = ServerState::with_database(db, auth, Metrics::new()?);
    let app = build_router(state, CorsLayer::very_permissive());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Some(format!("http://{addr}")))
}

#[tokio::test]
async fn book_confirm_cancel_over_http() -> anyhow::Result<()> {
    let Some(base) = spawn_app().await? else {
        eprintln!("skipping: no database configured");
        return Ok(());
    };
    let minter = Arc::new(HmacAuthenticator::new(SECRET, TokenRules::default(), 600));
    let admin = minter.issue("e2e-admin", &["admin"])?;
    let user = minter.issue(&format!("e2e-user-{}", uuid::Uuid::new_v4()), &["user"])?;
    let client = reqwest::Client::new();

    let health = client.get(format!("{base}/health")).send().await?;
    assert_eq!(health.status(), 200);

    let svc: Value = client
        .post(format!("{base}/api/v1/services"))
        .bearer_auth(&admin)
        .json(&json!({ "name": format!("E2E {}", uuid::Uuid::new_v4()), "durationMin": 45 }))
        .send()
        .await?
        .json()
        .await?;
    let service_id = svc["id"].as_str().unwrap_or_default().to_string();

    // far enough ahead that reruns never collide with the past check
    let start = chrono::Utc::now() + chrono::Duration::days(365);
    let booked = client
        .post(format!("{base}/api/v1/appointments"))
        .bearer_auth(&user)
        .json(&json!({ "serviceId": service_id, "scheduledFor": start.to_rfc3339() }))
        .send()
        .await?;
    assert_eq!(booked.status(), 201);
    let booked: Value = booked.json().await?;
    let id = booked["id"].as_str().unwrap_or_default().to_string();

    let clash = client
        .post(format!("{base}/api/v1/appointments"))
        .bearer_auth(&user)
        .json(&json!({ "serviceId": service_id, "scheduledFor": (start + chrono::Duration::minutes(20)).to_rfc3339() }))
        .send()
        .await?;
    assert_eq!(clash.status(), 409);

    let confirmed: Value = client
        .post(format!("{base}/api/v1/appointments/{id}/confirm"))
        .bearer_auth(&admin)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(confirmed["status"], "confirmed");

    let canceled = client.post(format!("{base}/api/v1/appointments/{id}/cancel")).bearer_auth(&user).send().await?;
    assert_eq!(canceled.status(), 200);

    let blocked = client.delete(format!("{base}/api/v1/services/{service_id}")).bearer_auth(&admin).send().await?;
    assert_eq!(blocked.status(), 409);
    Ok(())
}
