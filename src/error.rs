use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

/// SQLite primary result codes that mean the database itself cannot be used,
/// as opposed to a bad statement against a healthy database.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_IOERR: i32 = 10;
const SQLITE_CORRUPT: i32 = 11;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_NOTADB: i32 = 26;

#[derive(Debug, ThisError)]
pub enum KeygateError {
    #[error("Missing required query parameters: deviceId, credentialType")]
    Validation,

    #[error("Credential not found")]
    NotFound,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store query error: {0}")]
    StoreQuery(String),

    #[error("Missing 'ticket_number' in request body")]
    MissingTicketNumber,

    #[error("Ticket {ticket_number} is invalid or not found")]
    TicketInvalid { ticket_number: String },

    #[error("Missing 'ticket_number' or 'password_type' in request body")]
    MissingTicketFields,

    #[error("Ticket is not valid or has been closed")]
    TicketRejected,

    #[error("Ticket validation failed: {0}")]
    TicketCheckFailed(String),

    #[error("No {password_type} password for the ticket's device")]
    PasswordNotFound { password_type: String },

    #[error("Credential retrieval failed: {0}")]
    CredentialRetrievalFailed(String),

    #[error("Credential service unreachable: {0}")]
    CredentialServiceUnreachable(String),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),
}

impl From<SqlxError> for KeygateError {
    fn from(e: SqlxError) -> Self {
        match &e {
            SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::Protocol(_)
            | SqlxError::Configuration(_)
            | SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::WorkerCrashed => KeygateError::StoreUnavailable(e.to_string()),
            SqlxError::Database(db_err) => {
                let primary = db_err
                    .code()
                    .and_then(|c| c.parse::<i32>().ok())
                    .map(|c| c & 0xff);
                match primary {
                    Some(
                        SQLITE_BUSY | SQLITE_LOCKED | SQLITE_IOERR | SQLITE_CORRUPT
                        | SQLITE_CANTOPEN | SQLITE_NOTADB,
                    ) => KeygateError::StoreUnavailable(e.to_string()),
                    _ => KeygateError::StoreQuery(e.to_string()),
                }
            }
            _ => KeygateError::StoreQuery(e.to_string()),
        }
    }
}

impl IntoResponse for KeygateError {
    fn into_response(self) -> axum::response::Response {
        // Store and upstream detail stays in the logs; callers only see fixed messages.
        let (status, body) = match self {
            KeygateError::Validation => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Missing required query parameters: deviceId, credentialType"}),
            ),
            KeygateError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({"error": "Credential not found"}),
            ),
            KeygateError::StoreUnavailable(_) | KeygateError::StoreQuery(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "Internal server error"}),
            ),
            KeygateError::MissingTicketNumber => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Missing 'ticket_number' in request body"}),
            ),
            KeygateError::TicketInvalid { ticket_number } => (
                StatusCode::NOT_FOUND,
                json!({"ticket_number": ticket_number, "status": "invalid"}),
            ),
            KeygateError::MissingTicketFields => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Missing 'ticket_number' or 'password_type' in request body"}),
            ),
            KeygateError::TicketRejected => (
                StatusCode::BAD_REQUEST,
                status_error("The provided ticket number is not valid or has been closed."),
            ),
            KeygateError::TicketCheckFailed(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                status_error(
                    "There was a problem validating the ticket. Please try again later.",
                ),
            ),
            KeygateError::PasswordNotFound { password_type } => (
                StatusCode::NOT_FOUND,
                status_error(&format!(
                    "The ticket is valid, but a {password_type} password could not be found for the associated device."
                )),
            ),
            KeygateError::CredentialRetrievalFailed(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                status_error("An unexpected error occurred while retrieving the credential."),
            ),
            KeygateError::CredentialServiceUnreachable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                status_error("Could not connect to the internal credential service."),
            ),
            KeygateError::Reqwest(_) | KeygateError::UpstreamStatus(_) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "Upstream service is unavailable."}),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Body shape used by the ticket retrieval endpoint: `{ "status": "error", "message": ... }`.
fn status_error(message: &str) -> serde_json::Value {
    json!({"status": "error", "message": message})
}
