//! Access ticket lifecycle for the ARCA authentication service (WSAA).
//!
//! The [`TicketManager`](manager::TicketManager) returns a valid access ticket
//! for a tenant, reusing the one kept in a [`TicketStore`](store::TicketStore)
//! while it is inside its validity window and requesting a new one through the
//! [`Signer`](signer::Signer) and [`LoginExchange`](login::LoginExchange)
//! collaborators when it is not.

pub mod clock;
pub mod cuit;
pub mod login;
pub mod manager;
pub mod request;
pub mod signer;
pub mod store;
pub mod ticket;

pub use cuit::Cuit;
pub use manager::{TicketManager, TicketManagerError};
pub use ticket::{AccessTicket, AuthorizationPayload};
