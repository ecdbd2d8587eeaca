use std::sync::Arc;

use access_gateway::ApiGate;
use axum::Router;

use crate::api::rest::routes;
use crate::domain::repo::MailLogRepository;
use crate::domain::service::{Service, ServiceConfig};

/// Dashboard module: owns the mail log service and exposes its routes.
pub struct Dashboard {
    service: Arc<Service>,
}

impl Dashboard {
    #[must_use]
    pub fn new(repo: Arc<dyn MailLogRepository>, config: ServiceConfig) -> Self {
        Self {
            service: Arc::new(Service::new(repo, config)),
        }
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// Routes to merge into the gateway router.
    #[must_use]
    pub fn router(&self, gate: &ApiGate) -> Router {
        tracing::info!(
            me = routes::ME_PATH,
            mail_logs = routes::MAIL_LOGS_PATH,
            "Dashboard routes registered"
        );
        routes::router(self.service(), gate)
    }
}
