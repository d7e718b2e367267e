//! ARCA service adapters: WSAA login, `openssl` signing, WSFE calls and the
//! configuration that wires them into an [`arca::TicketManager`].

pub mod config;
pub mod context;
pub mod environment;
pub mod observability;
pub mod signer;
pub mod wsaa;
pub mod wsfe;

mod xml;
