//! Read-write setup of the credential database: schema plus seed data.
//! The query service never touches this module.

use crate::db::models::{DbDevice, DbTicket, NewCredential};
use crate::db::schema::SQLITE_INIT;
use crate::db::sqlite::SqlitePool;
use crate::error::KeygateError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const FLEET_DEVICES: &[(&str, &str, &str)] = &[
    ("ATM-CLE-001", "Downtown Cleveland", "10.1.10.5"),
    ("ATM-CHI-007", "O'Hare Airport", "10.2.15.12"),
    ("ATM-NYC-003", "Times Square", "10.3.5.25"),
];

const FLEET_CREDENTIALS: &[(&str, &str, &str)] = &[
    (
        "ATM-CLE-001",
        "BitLocker",
        "111111-222222-333333-444444-555555-666666-777777-888888",
    ),
    ("ATM-CLE-001", "BIOS", "b!0s-cle-@dm!n"),
    (
        "ATM-CHI-007",
        "BitLocker",
        "888888-777777-666666-555555-444444-333333-222222-111111",
    ),
    ("ATM-CHI-007", "BIOS", "Ch!c@g0-S3cure"),
    (
        "ATM-NYC-003",
        "BitLocker",
        "555555-123456-777777-987654-333333-112233-445566-778899",
    ),
    ("ATM-NYC-003", "BIOS", "N3wY0rk-P@ss"),
];

const FLEET_TICKETS: &[(&str, &str, Option<&str>)] = &[
    ("TICKET-12345", "valid", Some("ATM-CLE-001")),
    ("TICKET-67890", "valid", Some("ATM-CHI-007")),
    ("TICKET-54321", "valid", Some("ATM-NYC-003")),
    ("TICKET-99999", "invalid", None),
    ("TICKET-11223", "valid", Some("ATM-CLE-001")),
    ("TICKET-33445", "valid", Some("ATM-CHI-007")),
    ("TICKET-55667", "valid", Some("ATM-NYC-003")),
    ("TICKET-77889", "valid", Some("ATM-LAX-001")),
    ("TICKET-24680", "closed", Some("ATM-CLE-001")),
    ("TICKET-13579", "invalid", None),
];

/// Synthetic device fleet used for demos and tests.
pub fn fleet_devices() -> Vec<DbDevice> {
    FLEET_DEVICES
        .iter()
        .map(|(id, location, ip)| DbDevice {
            device_id: id.to_string(),
            location: Some(location.to_string()),
            ip_address: Some(ip.to_string()),
        })
        .collect()
}

pub fn fleet_credentials() -> Vec<NewCredential> {
    FLEET_CREDENTIALS
        .iter()
        .map(|(device, kind, value)| NewCredential::new(*device, *kind, *value))
        .collect()
}

/// Support tickets for the fleet. `TICKET-77889` points at a device with no credentials.
pub fn fleet_tickets() -> Vec<DbTicket> {
    FLEET_TICKETS
        .iter()
        .map(|(number, status, device)| DbTicket::new(*number, *status, *device))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionSummary {
    pub devices: usize,
    pub credentials: usize,
    pub tickets: usize,
}

/// Writable handle, opened only by the provisioning tool and tests.
pub struct Provisioner {
    pool: SqlitePool,
}

impl Provisioner {
    /// Open (or create) the database file for writing.
    pub async fn connect(database_url: &str) -> Result<Self, KeygateError> {
        // Credentials.DeviceID is a logical reference only; orphan rows are allowed.
        let connect_opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(false);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_opts)
            .await?;
        Ok(Self { pool })
    }

    /// Drop and recreate all tables, then insert `devices`, `credentials` and
    /// `tickets`, all inside one transaction.
    pub async fn provision(
        &self,
        devices: &[DbDevice],
        credentials: &[NewCredential],
        tickets: &[DbTicket],
    ) -> Result<ProvisionSummary, KeygateError> {
        let mut tx = self.pool.begin().await?;

        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&mut *tx).await?;
        }
        info!("credential schema recreated");

        for device in devices {
            sqlx::query("INSERT INTO Devices (DeviceID, Location, IPAddress) VALUES (?, ?, ?)")
                .bind(&device.device_id)
                .bind(&device.location)
                .bind(&device.ip_address)
                .execute(&mut *tx)
                .await?;
        }
        info!(count = devices.len(), "devices inserted");

        for cred in credentials {
            sqlx::query("INSERT INTO Credentials (DeviceID, Type, Value) VALUES (?, ?, ?)")
                .bind(&cred.device_id)
                .bind(&cred.credential_type)
                .bind(&cred.value)
                .execute(&mut *tx)
                .await?;
        }
        info!(count = credentials.len(), "credentials inserted");

        for ticket in tickets {
            sqlx::query("INSERT INTO Tickets (TicketNumber, Status, DeviceID) VALUES (?, ?, ?)")
                .bind(&ticket.ticket_number)
                .bind(&ticket.status)
                .bind(&ticket.device_id)
                .execute(&mut *tx)
                .await?;
        }
        info!(count = tickets.len(), "tickets inserted");

        tx.commit().await?;
        Ok(ProvisionSummary {
            devices: devices.len(),
            credentials: credentials.len(),
            tickets: tickets.len(),
        })
    }

    pub async fn seed_fleet(&self) -> Result<ProvisionSummary, KeygateError> {
        self.provision(&fleet_devices(), &fleet_credentials(), &fleet_tickets())
            .await
    }

    /// Append credentials to an already provisioned store. Returns the assigned ids in order.
    pub async fn insert_credentials(
        &self,
        credentials: &[NewCredential],
    ) -> Result<Vec<i64>, KeygateError> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(credentials.len());
        for cred in credentials {
            let done = sqlx::query("INSERT INTO Credentials (DeviceID, Type, Value) VALUES (?, ?, ?)")
                .bind(&cred.device_id)
                .bind(&cred.credential_type)
                .bind(&cred.value)
                .execute(&mut *tx)
                .await?;
            ids.push(done.last_insert_rowid());
        }
        tx.commit().await?;
        Ok(ids)
    }

    pub async fn list_devices(&self) -> Result<Vec<DbDevice>, KeygateError> {
        let rows = sqlx::query_as::<_, DbDevice>(
            r#"SELECT DeviceID AS device_id, Location AS location, IPAddress AS ip_address
               FROM Devices ORDER BY DeviceID"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
