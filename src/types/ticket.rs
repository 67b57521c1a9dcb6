use serde::{Deserialize, Serialize};
use std::fmt;

/// `POST /validate` body.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ValidateTicketRequest {
    #[serde(default)]
    pub ticket_number: Option<String>,
}

/// `POST /validate` success body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidateTicketResponse {
    pub ticket_number: String,
    pub status: &'static str,
    #[serde(rename = "deviceId")]
    pub device_id: String,
}

/// `POST /getPasswordForTicket` body.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TicketPasswordRequest {
    #[serde(default)]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub password_type: Option<String>,
}

impl TicketPasswordRequest {
    pub fn new(ticket_number: impl Into<String>, password_type: impl Into<String>) -> Self {
        Self {
            ticket_number: Some(ticket_number.into()),
            password_type: Some(password_type.into()),
        }
    }

    /// Both fields present and non-empty.
    pub fn fields(&self) -> Option<(&str, &str)> {
        let ticket = self.ticket_number.as_deref().filter(|s| !s.is_empty())?;
        let kind = self.password_type.as_deref().filter(|s| !s.is_empty())?;
        Some((ticket, kind))
    }
}

/// `POST /getPasswordForTicket` success body.
#[derive(Clone, Serialize, PartialEq)]
pub struct TicketPasswordResponse {
    pub status: &'static str,
    pub password: String,
}

impl TicketPasswordResponse {
    pub fn success(password: String) -> Self {
        Self {
            status: "success",
            password,
        }
    }
}

impl fmt::Debug for TicketPasswordResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketPasswordResponse")
            .field("status", &self.status)
            .field("password", &"<redacted>")
            .finish()
    }
}
