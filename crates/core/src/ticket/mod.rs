//! Access Tickets

mod authorization;
mod models;

pub use authorization::AuthorizationPayload;
pub use models::*;
