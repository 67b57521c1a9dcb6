pub mod credential_request;
pub mod ticket_request;

pub use credential_request::CredentialQuery;
pub use ticket_request::{TicketJson, TicketPayload};
