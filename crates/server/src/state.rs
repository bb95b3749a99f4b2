use std::sync::Arc;

use sea_orm::DatabaseConnection;
use service::appointments::repo::seaorm::SeaOrmAppointmentRepository;
use service::appointments::repository::{mock::MockAppointmentRepository, AppointmentRepository};
use service::appointments::AppointmentService;
use service::auth::AuthManager;
use service::catalog::repo::seaorm::SeaOrmCatalogRepository;
use service::catalog::repository::{mock::MockCatalogRepository, CatalogRepository};
use service::catalog::CatalogService;
use service::clock::{Clock, SystemClock};
use service::users::repo::seaorm::SeaOrmUserRepository;
use service::users::repository::{mock::MockUserRepository, UserRepository};
use service::users::UserService;

use crate::metrics::Metrics;

/// Everything handlers need, cheap to clone per request.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthManager>,
    pub appointments: Arc<AppointmentService>,
    pub catalog: Arc<CatalogService>,
    pub users: Arc<UserService>,
    pub metrics: Arc<Metrics>,
}

impl ServerState {
    pub fn new(
        auth: AuthManager,
        appointment_repo: Arc<dyn AppointmentRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        user_repo: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        metrics: Metrics,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            appointments: Arc::new(AppointmentService::new(appointment_repo.clone(), catalog_repo.clone(), clock)),
            catalog: Arc::new(CatalogService::new(catalog_repo, appointment_repo.clone())),
            users: Arc::new(UserService::new(user_repo, appointment_repo)),
            metrics: Arc::new(metrics),
        }
    }

    /// SeaORM-backed repositories sharing one connection pool.
    pub fn with_database(db: DatabaseConnection, auth: AuthManager, metrics: Metrics) -> Self {
        Self::new(
            auth,
            Arc::new(SeaOrmAppointmentRepository::new(db.clone())),
            Arc::new(SeaOrmCatalogRepository::new(db.clone())),
            Arc::new(SeaOrmUserRepository::new(db)),
            Arc::new(SystemClock),
            metrics,
        )
    }

    /// In-memory repositories; nothing survives a restart.
    pub fn in_memory(auth: AuthManager, clock: Arc<dyn Clock>, metrics: Metrics) -> Self {
        Self::new(
            auth,
            Arc::new(MockAppointmentRepository::new()),
            Arc::new(MockCatalogRepository::new()),
            Arc::new(MockUserRepository::new()),
            clock,
            metrics,
        )
    }
}
