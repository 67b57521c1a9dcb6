//! Database module: rows, schema and SQLite access for credentials and support tickets.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL and the lookup statements
//! - `store.rs`: the read-only `CredentialStore` and `TicketStore` seams used by the services
//! - `sqlite.rs`: read-only SQLite implementations of both stores over one pool
//! - `provision.rs`: read-write schema setup and seeding, used outside the query path

pub mod models;
pub mod provision;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use models::{DbCredential, DbDevice, DbTicket, NewCredential};
pub use provision::{ProvisionSummary, Provisioner};
pub use sqlite::{CredentialsStorage, SqlitePool, TicketsStorage};
pub use store::{CredentialStore, TicketStore};
