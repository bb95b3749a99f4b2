use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, AuthConfig};
use migration::{Migrator, MigratorTrait};
use service::auth::{AuthManager, HmacAuthenticator, JwksAuthenticator, TokenRules};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::metrics::Metrics;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Register the RS256 key set first when configured, then the shared secret.
pub async fn build_auth_manager(cfg: &AuthConfig) -> anyhow::Result<AuthManager> {
    let mut manager = AuthManager::new();
    if let Some(uri) = cfg.jwks_uri.as_deref() {
        match JwksAuthenticator::fetch(uri, TokenRules::from_config(cfg)).await {
            Ok(jwks) => {
                info!(event = "jwks_loaded", keys = jwks.key_count(), %uri, "key set loaded");
                manager = manager.with_authenticator(jwks);
            }
            Err(e) => warn!(event = "jwks_fetch_failed", %uri, error = %e, "key set unavailable; RS256 tokens will be rejected"),
        }
    }
    if let Some(hmac) = HmacAuthenticator::from_config(cfg) {
        manager = manager.with_authenticator(hmac);
    }
    if manager.is_empty() {
        anyhow::bail!("no token authenticator could be configured");
    }
    Ok(manager)
}

/// Connect, migrate and assemble the application without binding a socket.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    models::db::test_connection(&db).await?;
    Migrator::up(&db, None).await?;
    info!(event = "migrations_applied", "database schema up to date");

    let auth = build_auth_manager(&cfg.auth).await?;
    info!(event = "auth_ready", schemes = ?auth.schemes(), "authenticators registered");

    let state = ServerState::with_database(db, auth, Metrics::new()?);
    Ok(routes::build_router(state, build_cors()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(event = "signal_error", error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!(event = "shutdown_signal", "draining connections");
}

/// Public entry: build the app and serve until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, event = "listening", "booking api listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
