pub mod credentials;
pub mod tickets;

pub use credentials::{credentials_handler, health_handler};
pub use tickets::{password_for_ticket_handler, validate_ticket_handler};
