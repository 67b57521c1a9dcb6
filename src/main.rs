use mimalloc::MiMalloc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use keygate::config::{CONFIG, Config};
use keygate::db::CredentialsStorage;
use keygate::router::{KeygateState, keygate_router};
use keygate::service::{
    HttpCredentialSource, HttpTicketValidator, TicketOrchestrator, upstream_client,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        query_timeout_secs = cfg.query_timeout_secs,
        max_connections = cfg.max_connections,
        upstream_timeout_secs = cfg.upstream_timeout_secs
    );

    let storage = match CredentialsStorage::connect_read_only(cfg).await {
        Ok(storage) => storage,
        Err(e) => {
            error!(database_url = %cfg.database_url, error = %e, "failed to open credential store");
            return Err(e.into());
        }
    };
    info!("connected to credential store (read-only)");

    let mut state = KeygateState::new(
        Arc::new(storage.clone()),
        Arc::new(storage.tickets()),
        cfg.upstream_timeout(),
    );
    if let Some(orchestrator) = remote_orchestrator(cfg)? {
        state = state.with_orchestrator(orchestrator);
    }
    let app = keygate_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("credential service listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    storage.close().await;
    info!("credential service stopped");
    Ok(())
}

/// Ticket retrieval against separately deployed services, when both URLs are set.
fn remote_orchestrator(cfg: &Config) -> Result<Option<TicketOrchestrator>, keygate::KeygateError> {
    let (Some(validator_url), Some(credentials_url)) =
        (&cfg.ticket_validator_url, &cfg.credential_service_url)
    else {
        if cfg.ticket_validator_url.is_some() || cfg.credential_service_url.is_some() {
            warn!("only one upstream url configured; ticket retrieval stays in-process");
        }
        return Ok(None);
    };

    let client = upstream_client(cfg.upstream_timeout())?;
    info!(%validator_url, %credentials_url, "ticket retrieval uses remote services");
    Ok(Some(TicketOrchestrator::new(
        Arc::new(HttpTicketValidator::new(client.clone(), validator_url.as_str())),
        Arc::new(HttpCredentialSource::new(client, credentials_url.as_str())),
        cfg.upstream_timeout(),
    )))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
