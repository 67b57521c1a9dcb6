use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{CredentialStore, TicketStore};
use crate::handlers::{
    credentials_handler, health_handler, password_for_ticket_handler, validate_ticket_handler,
};
use crate::service::{CredentialQueryService, TicketOrchestrator, TicketService};

#[derive(Clone)]
pub struct KeygateState {
    pub query: Arc<CredentialQueryService>,
    pub tickets: Arc<TicketService>,
    pub orchestrator: Arc<TicketOrchestrator>,
}

impl KeygateState {
    /// All three services in-process: the orchestrator calls the local ticket
    /// and credential services directly.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tickets: Arc<dyn TicketStore>,
        step_timeout: Duration,
    ) -> Self {
        let query = Arc::new(CredentialQueryService::new(credentials));
        let tickets = Arc::new(TicketService::new(tickets));
        let orchestrator = Arc::new(TicketOrchestrator::new(
            tickets.clone(),
            query.clone(),
            step_timeout,
        ));
        Self {
            query,
            tickets,
            orchestrator,
        }
    }

    /// Replace the in-process orchestrator, e.g. with one backed by remote services.
    pub fn with_orchestrator(mut self, orchestrator: TicketOrchestrator) -> Self {
        self.orchestrator = Arc::new(orchestrator);
        self
    }
}

pub fn keygate_router(state: KeygateState) -> Router {
    Router::new()
        .route("/credentials", get(credentials_handler))
        .route("/validate", post(validate_ticket_handler))
        .route("/getPasswordForTicket", post(password_for_ticket_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        // Fleet endpoints and browser tooling call from arbitrary origins.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
