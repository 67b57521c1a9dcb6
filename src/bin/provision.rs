//! Creates the credential database and seeds the synthetic ATM fleet.
//!
//! Destructive: existing `Devices`, `Credentials` and `Tickets` tables are dropped first.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use keygate::config::CONFIG;
use keygate::db::Provisioner;

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

    info!(database_url = %cfg.database_url, "starting database setup");
    let provisioner = Provisioner::connect(&cfg.database_url).await?;
    let summary = provisioner.seed_fleet().await?;
    for device in provisioner.list_devices().await? {
        info!(
            device_id = %device.device_id,
            location = device.location.as_deref().unwrap_or("-"),
            ip_address = device.ip_address.as_deref().unwrap_or("-"),
            "device provisioned"
        );
    }
    provisioner.close().await;

    info!(
        devices = summary.devices,
        credentials = summary.credentials,
        tickets = summary.tickets,
        "database setup complete"
    );
    Ok(())
}
