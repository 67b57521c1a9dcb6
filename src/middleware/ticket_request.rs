use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::KeygateError;
use crate::types::ticket::{TicketPasswordRequest, ValidateTicketRequest};

/// JSON request bodies that report any decode failure as their own 400.
pub trait TicketPayload: DeserializeOwned + Send {
    fn rejection() -> KeygateError;
}

impl TicketPayload for ValidateTicketRequest {
    fn rejection() -> KeygateError {
        KeygateError::MissingTicketNumber
    }
}

impl TicketPayload for TicketPasswordRequest {
    fn rejection() -> KeygateError {
        KeygateError::MissingTicketFields
    }
}

/// Body extractor for the ticket endpoints. A missing, non-JSON or malformed
/// body is treated like a body without the required fields.
pub struct TicketJson<T>(pub T);

impl<S, T> FromRequest<S> for TicketJson<T>
where
    S: Send + Sync,
    T: TicketPayload,
{
    type Rejection = KeygateError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(body)) => Ok(TicketJson(body)),
            Err(rejection) => {
                warn!(error = %rejection, "rejected ticket request body");
                Err(T::rejection())
            }
        }
    }
}
