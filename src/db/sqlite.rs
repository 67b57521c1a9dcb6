use crate::config::Config;
use crate::db::models::{DbCredential, DbTicket};
use crate::db::schema::{SELECT_CREDENTIALS, SELECT_TICKET};
use crate::db::store::{CredentialStore, TicketStore};
use crate::error::KeygateError;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

/// Read-only handle on the credential database, shared by all requests.
#[derive(Clone)]
pub struct CredentialsStorage {
    pool: SqlitePool,
    query_timeout: Duration,
}

impl CredentialsStorage {
    pub fn new(pool: SqlitePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Open an existing database in read-only mode. A missing file is an error,
    /// never silently created.
    pub async fn connect_read_only(cfg: &Config) -> Result<Self, KeygateError> {
        let connect_opts = SqliteConnectOptions::from_str(&cfg.database_url)?
            .read_only(true)
            .create_if_missing(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections.max(1))
            .acquire_timeout(cfg.query_timeout())
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool, cfg.query_timeout()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ticket lookups over the same read-only pool.
    pub fn tickets(&self) -> TicketsStorage {
        TicketsStorage {
            pool: self.pool.clone(),
            query_timeout: self.query_timeout,
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl CredentialStore for CredentialsStorage {
    async fn lookup(
        &self,
        device_id: &str,
        credential_type: &str,
    ) -> Result<Vec<DbCredential>, KeygateError> {
        // Both values are bound; nothing from the caller reaches the SQL text.
        let rows = bounded(
            self.query_timeout,
            sqlx::query_as::<_, DbCredential>(SELECT_CREDENTIALS)
                .bind(device_id)
                .bind(credential_type)
                .fetch_all(&self.pool),
        )
        .await?;
        debug!(
            device_id,
            credential_type,
            matches = rows.len(),
            "credential lookup completed"
        );
        Ok(rows)
    }
}

/// Read-only view of the `Tickets` table.
#[derive(Clone)]
pub struct TicketsStorage {
    pool: SqlitePool,
    query_timeout: Duration,
}

#[async_trait]
impl TicketStore for TicketsStorage {
    async fn find_ticket(&self, ticket_number: &str) -> Result<Option<DbTicket>, KeygateError> {
        let row = bounded(
            self.query_timeout,
            sqlx::query_as::<_, DbTicket>(SELECT_TICKET)
                .bind(ticket_number)
                .fetch_optional(&self.pool),
        )
        .await?;
        debug!(ticket_number, found = row.is_some(), "ticket lookup completed");
        Ok(row)
    }
}

/// Run a store future under `limit`; expiry is reported as `StoreUnavailable`.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, KeygateError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(KeygateError::from),
        Err(_) => Err(KeygateError::StoreUnavailable(format!(
            "store access exceeded {} ms",
            limit.as_millis()
        ))),
    }
}
