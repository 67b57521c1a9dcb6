pub mod credential_query;
pub mod orchestrator;
pub mod ticket;
pub mod upstream;

pub use credential_query::CredentialQueryService;
pub use orchestrator::{CredentialSource, TicketOrchestrator, TicketValidator};
pub use ticket::{TicketService, TicketVerdict};
pub use upstream::{HttpCredentialSource, HttpTicketValidator, upstream_client};
