pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod types;

#[cfg(test)]
mod test_support;

pub use error::KeygateError;
pub use service::{CredentialQueryService, TicketOrchestrator, TicketService};
