//! Ticket lifecycle states.

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;

use crate::ticket::AccessTicket;

/// Where a tenant's credential stands, as reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketState {
    /// Nothing stored for the tenant.
    NoCredential,

    /// A stored ticket is inside its validity window.
    CredentialValid,

    /// A stored ticket exists but its window has closed.
    CredentialExpired,

    /// A new ticket is being requested from the issuer.
    Refreshing,

    /// The last refresh attempt failed.
    RefreshFailed,
}

impl TicketState {
    /// Classify what the store returned for a tenant at `now`.
    #[must_use]
    pub fn of(stored: Option<&AccessTicket>, now: Timestamp) -> Self {
        match stored {
            None => Self::NoCredential,
            Some(ticket) if ticket.is_valid(now) => Self::CredentialValid,
            Some(_) => Self::CredentialExpired,
        }
    }

    /// Stable `snake_case` name used as a log field value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoCredential => "no_credential",
            Self::CredentialValid => "credential_valid",
            Self::CredentialExpired => "credential_expired",
            Self::Refreshing => "refreshing",
            Self::RefreshFailed => "refresh_failed",
        }
    }
}

impl Display for TicketState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
