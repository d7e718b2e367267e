//! Ticket manager errors.

use jiff::Timestamp;
use thiserror::Error;

use crate::{login::LoginError, signer::SignerError, store::StoreError, ticket::AccessTicket};

/// Reasons [`TicketManager::get_valid_ticket`](crate::TicketManager::get_valid_ticket) can fail.
#[derive(Debug, Error)]
pub enum TicketManagerError {
    /// The stored record could not be loaded.
    #[error("failed to load stored ticket")]
    Store(#[source] StoreError),

    /// The ticket request could not be signed.
    #[error("failed to sign ticket request")]
    Signing(#[from] SignerError),

    /// The issuer could not be reached or refused the request.
    #[error("login exchange failed")]
    Login(#[from] LoginError),

    /// The issuer handed back a ticket that is already expired.
    #[error("issued ticket already expired at {expiration_time}")]
    IssuedExpired { expiration_time: Timestamp },

    /// A fresh ticket was obtained but could not be stored.
    #[error("failed to persist refreshed ticket")]
    Persist {
        /// The valid ticket that was not stored.
        ticket: Box<AccessTicket>,
        #[source]
        source: StoreError,
    },
}

impl TicketManagerError {
    /// The fresh ticket carried by a [`TicketManagerError::Persist`] failure.
    ///
    /// The ticket is valid, only caching it failed; callers may choose to
    /// use it anyway.
    #[must_use]
    pub fn into_unpersisted_ticket(self) -> Option<AccessTicket> {
        match self {
            Self::Persist { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}
