//! SQL DDL for the credential store. Only the provisioning tool runs this;
//! the query path opens an existing database read-only.

/// Drops and recreates all tables:
/// - `Devices.DeviceID` TEXT PRIMARY KEY
/// - `Credentials.CredentialID` INTEGER PRIMARY KEY AUTOINCREMENT, so ids only grow
/// - `(DeviceID, Type)` is deliberately not unique
/// - `Tickets.Status` is one of `valid`, `invalid`, `closed`
pub const SQLITE_INIT: &str = r#"
DROP TABLE IF EXISTS Tickets;
DROP TABLE IF EXISTS Credentials;
DROP TABLE IF EXISTS Devices;

CREATE TABLE Devices (
    DeviceID TEXT PRIMARY KEY,
    Location TEXT,
    IPAddress TEXT
);

CREATE TABLE Credentials (
    CredentialID INTEGER PRIMARY KEY AUTOINCREMENT,
    DeviceID TEXT,
    Type TEXT NOT NULL,
    Value TEXT NOT NULL,
    FOREIGN KEY (DeviceID) REFERENCES Devices (DeviceID)
);

CREATE INDEX IF NOT EXISTS idx_credentials_device_type ON Credentials(DeviceID, Type);

CREATE TABLE Tickets (
    TicketNumber TEXT PRIMARY KEY,
    Status TEXT NOT NULL,
    DeviceID TEXT
);
"#;

/// Exact-match lookup, newest row first.
pub const SELECT_CREDENTIALS: &str = r#"
SELECT CredentialID AS credential_id,
       DeviceID AS device_id,
       Type AS credential_type,
       Value AS value
FROM Credentials
WHERE DeviceID = ? AND Type = ?
ORDER BY CredentialID DESC
"#;

pub const SELECT_TICKET: &str = r#"
SELECT TicketNumber AS ticket_number,
       Status AS status,
       DeviceID AS device_id
FROM Tickets
WHERE TicketNumber = ?
"#;
