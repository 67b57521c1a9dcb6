use crate::db::store::TicketStore;
use crate::error::KeygateError;
use crate::types::ticket::{ValidateTicketRequest, ValidateTicketResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Valid,
    Invalid,
    Closed,
}

impl TicketStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "valid" => Some(Self::Valid),
            "invalid" => Some(Self::Invalid),
            "closed" => Some(Self::Closed),
            _ => None,
        }
    }
}

/// Outcome of checking a ticket. Only a valid ticket names a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketVerdict {
    Valid { device_id: String },
    Invalid,
}

/// Validates support tickets against the `Tickets` table.
#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    /// Unknown, invalid and closed tickets are all `Invalid`; so is a valid
    /// ticket that names no device.
    pub async fn validate(&self, ticket_number: &str) -> Result<TicketVerdict, KeygateError> {
        let Some(ticket) = self.store.find_ticket(ticket_number).await? else {
            return Ok(TicketVerdict::Invalid);
        };
        match TicketStatus::parse(&ticket.status) {
            Some(TicketStatus::Valid) => match ticket.device_id.filter(|d| !d.is_empty()) {
                Some(device_id) => Ok(TicketVerdict::Valid { device_id }),
                None => {
                    warn!(ticket_number, "valid ticket has no device");
                    Ok(TicketVerdict::Invalid)
                }
            },
            Some(TicketStatus::Invalid | TicketStatus::Closed) => Ok(TicketVerdict::Invalid),
            None => {
                warn!(ticket_number, status = %ticket.status, "unknown ticket status");
                Ok(TicketVerdict::Invalid)
            }
        }
    }

    pub async fn handle(
        &self,
        request: ValidateTicketRequest,
    ) -> Result<ValidateTicketResponse, KeygateError> {
        let Some(ticket_number) = request.ticket_number.filter(|t| !t.is_empty()) else {
            warn!("bad request: missing ticket_number");
            return Err(KeygateError::MissingTicketNumber);
        };
        info!(ticket_number = %ticket_number, "validating ticket");

        match self.validate(&ticket_number).await {
            Ok(TicketVerdict::Valid { device_id }) => {
                info!(ticket_number = %ticket_number, device_id = %device_id, "ticket is valid");
                Ok(ValidateTicketResponse {
                    ticket_number,
                    status: "valid",
                    device_id,
                })
            }
            Ok(TicketVerdict::Invalid) => {
                info!(ticket_number = %ticket_number, "ticket is invalid or not found");
                Err(KeygateError::TicketInvalid { ticket_number })
            }
            Err(e) => {
                error!(ticket_number = %ticket_number, error = %e, "ticket lookup failed");
                Err(e)
            }
        }
    }
}
