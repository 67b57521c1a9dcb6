use sqlx::FromRow;
use std::fmt;

/// Row of the `Devices` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbDevice {
    pub device_id: String,
    pub location: Option<String>,
    pub ip_address: Option<String>,
}

/// Row of the `Credentials` table.
///
/// `Debug` never prints `value`.
#[derive(Clone, PartialEq, FromRow)]
pub struct DbCredential {
    pub credential_id: i64,
    pub device_id: String,
    pub credential_type: String,
    pub value: String,
}

impl fmt::Debug for DbCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbCredential")
            .field("credential_id", &self.credential_id)
            .field("device_id", &self.device_id)
            .field("credential_type", &self.credential_type)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// A credential to be written by the provisioning tool; the id is assigned by SQLite.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCredential {
    pub device_id: String,
    pub credential_type: String,
    pub value: String,
}

impl NewCredential {
    pub fn new(
        device_id: impl Into<String>,
        credential_type: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            credential_type: credential_type.into(),
            value: value.into(),
        }
    }
}

/// Row of the `Tickets` table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbTicket {
    pub ticket_number: String,
    pub status: String,
    pub device_id: Option<String>,
}

impl DbTicket {
    pub fn new(
        ticket_number: impl Into<String>,
        status: impl Into<String>,
        device_id: Option<&str>,
    ) -> Self {
        Self {
            ticket_number: ticket_number.into(),
            status: status.into(),
            device_id: device_id.map(str::to_string),
        }
    }
}
