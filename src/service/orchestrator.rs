use crate::error::KeygateError;
use crate::service::credential_query::CredentialQueryService;
use crate::service::ticket::{TicketService, TicketVerdict};
use crate::types::credential::CredentialRequest;
use crate::types::ticket::{TicketPasswordRequest, TicketPasswordResponse};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// First step of a ticket-based retrieval.
#[async_trait]
pub trait TicketValidator: Send + Sync {
    async fn check(&self, ticket_number: &str) -> Result<TicketVerdict, KeygateError>;
}

/// Second step: the secret for a device. `NotFound` means no such credential.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn fetch(&self, device_id: &str, credential_type: &str) -> Result<String, KeygateError>;
}

#[async_trait]
impl TicketValidator for TicketService {
    async fn check(&self, ticket_number: &str) -> Result<TicketVerdict, KeygateError> {
        self.validate(ticket_number).await
    }
}

#[async_trait]
impl CredentialSource for CredentialQueryService {
    async fn fetch(&self, device_id: &str, credential_type: &str) -> Result<String, KeygateError> {
        let resp = self
            .handle(CredentialRequest::new(device_id, credential_type))
            .await?;
        Ok(resp.value)
    }
}

/// Releases a device secret to whoever holds a valid support ticket for it.
#[derive(Clone)]
pub struct TicketOrchestrator {
    validator: Arc<dyn TicketValidator>,
    credentials: Arc<dyn CredentialSource>,
    step_timeout: Duration,
}

impl TicketOrchestrator {
    pub fn new(
        validator: Arc<dyn TicketValidator>,
        credentials: Arc<dyn CredentialSource>,
        step_timeout: Duration,
    ) -> Self {
        Self {
            validator,
            credentials,
            step_timeout,
        }
    }

    pub async fn handle(
        &self,
        request: TicketPasswordRequest,
    ) -> Result<TicketPasswordResponse, KeygateError> {
        info!("received ticket password request");
        let Some((ticket_number, password_type)) = request.fields() else {
            warn!("bad request: missing ticket_number or password_type");
            return Err(KeygateError::MissingTicketFields);
        };

        info!(ticket_number, "checking ticket");
        let verdict = match tokio::time::timeout(
            self.step_timeout,
            self.validator.check(ticket_number),
        )
        .await
        {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                error!(ticket_number, error = %e, "ticket validation failed");
                return Err(KeygateError::TicketCheckFailed(e.to_string()));
            }
            Err(_) => {
                error!(ticket_number, "ticket validation timed out");
                return Err(KeygateError::TicketCheckFailed(format!(
                    "timed out after {} ms",
                    self.step_timeout.as_millis()
                )));
            }
        };

        let device_id = match verdict {
            TicketVerdict::Valid { device_id } => device_id,
            TicketVerdict::Invalid => {
                info!(ticket_number, "ticket is invalid");
                return Err(KeygateError::TicketRejected);
            }
        };
        info!(ticket_number, device_id = %device_id, "ticket is valid");

        let fetched = tokio::time::timeout(
            self.step_timeout,
            self.credentials.fetch(&device_id, password_type),
        )
        .await;
        let password = match fetched {
            Ok(Ok(password)) => password,
            Ok(Err(KeygateError::NotFound)) => {
                warn!(device_id = %device_id, password_type, "credential not found");
                return Err(KeygateError::PasswordNotFound {
                    password_type: password_type.to_string(),
                });
            }
            Ok(Err(e)) => return Err(classify_fetch_failure(&device_id, e)),
            Err(_) => {
                error!(device_id = %device_id, "credential retrieval timed out");
                return Err(KeygateError::CredentialServiceUnreachable(format!(
                    "timed out after {} ms",
                    self.step_timeout.as_millis()
                )));
            }
        };

        warn!(
            ticket_number,
            password_type,
            "[AUDIT] Successfully retrieved password for device {device_id}."
        );
        Ok(TicketPasswordResponse::success(password))
    }
}

/// Transport failures mean the credential service could not be reached;
/// anything else is an unexpected retrieval error.
fn classify_fetch_failure(device_id: &str, e: KeygateError) -> KeygateError {
    match e {
        KeygateError::Reqwest(ref re) if !re.is_decode() => {
            error!(device_id, error = %e, "credential service unreachable");
            KeygateError::CredentialServiceUnreachable(e.to_string())
        }
        other => {
            error!(device_id, error = %other, "credential retrieval failed");
            KeygateError::CredentialRetrievalFailed(other.to_string())
        }
    }
}
