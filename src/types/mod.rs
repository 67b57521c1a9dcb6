pub mod credential;
pub mod ticket;

pub use credential::{CredentialRequest, CredentialResponse};
pub use ticket::{
    TicketPasswordRequest, TicketPasswordResponse, ValidateTicketRequest, ValidateTicketResponse,
};
