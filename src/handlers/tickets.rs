use axum::{Json, extract::State};

use crate::middleware::TicketJson;
use crate::types::ticket::{
    TicketPasswordRequest, TicketPasswordResponse, ValidateTicketRequest, ValidateTicketResponse,
};
use crate::{KeygateError, router::KeygateState};

/// POST /validate
pub async fn validate_ticket_handler(
    State(state): State<KeygateState>,
    TicketJson(request): TicketJson<ValidateTicketRequest>,
) -> Result<Json<ValidateTicketResponse>, KeygateError> {
    let body = state.tickets.handle(request).await?;
    Ok(Json(body))
}

/// POST /getPasswordForTicket
pub async fn password_for_ticket_handler(
    State(state): State<KeygateState>,
    TicketJson(request): TicketJson<TicketPasswordRequest>,
) -> Result<Json<TicketPasswordResponse>, KeygateError> {
    let body = state.orchestrator.handle(request).await?;
    Ok(Json(body))
}
