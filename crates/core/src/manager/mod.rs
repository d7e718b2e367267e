//! Ticket Lifecycle

mod errors;
mod service;
mod state;

pub use errors::TicketManagerError;
pub use service::TicketManager;
pub use state::TicketState;
