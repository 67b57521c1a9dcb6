use crate::db::models::{DbCredential, DbTicket};
use crate::error::KeygateError;
use async_trait::async_trait;

/// Read-only access to stored credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// All credentials matching `(device_id, credential_type)` exactly.
    ///
    /// Fails with `StoreUnavailable` or `StoreQuery`; an empty result is not an error.
    async fn lookup(
        &self,
        device_id: &str,
        credential_type: &str,
    ) -> Result<Vec<DbCredential>, KeygateError>;
}

/// Read-only access to support tickets.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// The ticket with exactly this number, if any.
    async fn find_ticket(&self, ticket_number: &str) -> Result<Option<DbTicket>, KeygateError>;
}
