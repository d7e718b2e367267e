//! Access ticket models.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{cuit::Cuit, ticket::AuthorizationPayload};

/// Issuing context and validity window of an access ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketHeader {
    /// Distinguished name of the issuing authority.
    pub source: String,

    /// Distinguished name of the identity the ticket was issued to.
    pub destination: String,

    /// Identifier assigned by the issuer.
    #[serde(rename = "uniqueid")]
    pub unique_id: String,

    /// Start of the validity window.
    #[serde(rename = "generationtime")]
    pub generation_time: Timestamp,

    /// End of the validity window.
    #[serde(rename = "expirationtime")]
    pub expiration_time: Timestamp,
}

/// Opaque credential pair presented on every authenticated call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketCredentials {
    /// Session token.
    pub token: String,

    /// Issuer signature over the token.
    pub sign: String,
}

impl fmt::Debug for TicketCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TicketCredentials(**redacted**)")?;
        Ok(())
    }
}

/// Structured result of a successful remote login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Validity window and parties.
    pub header: TicketHeader,

    /// Credential pair to present on calls.
    pub credentials: TicketCredentials,
}

/// Time-boxed credential issued by the authentication service.
///
/// Tickets are immutable; a refreshed ticket replaces the old one instead of
/// updating it. The serialized form is the persisted credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessTicket {
    header: TicketHeader,
    credentials: TicketCredentials,
}

impl AccessTicket {
    /// Ticket from its parts.
    #[must_use]
    pub const fn new(header: TicketHeader, credentials: TicketCredentials) -> Self {
        Self {
            header,
            credentials,
        }
    }

    /// Issuing context and validity window.
    #[must_use]
    pub const fn header(&self) -> &TicketHeader {
        &self.header
    }

    /// Token and sign pair.
    #[must_use]
    pub const fn credentials(&self) -> &TicketCredentials {
        &self.credentials
    }

    /// Session token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.credentials.token
    }

    /// Issuer signature over the token.
    #[must_use]
    pub fn sign(&self) -> &str {
        &self.credentials.sign
    }

    /// End of the validity window.
    #[must_use]
    pub const fn expiration_time(&self) -> Timestamp {
        self.header.expiration_time
    }

    /// Whether the ticket can still be presented at `now`.
    #[must_use]
    pub fn is_valid(&self, now: Timestamp) -> bool {
        now < self.header.expiration_time
    }

    /// Whether the validity window has closed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        !self.is_valid(now)
    }

    /// Build the `Auth` block expected by authenticated operations.
    #[must_use]
    pub fn to_authorization_payload(&self, cuit: Cuit) -> AuthorizationPayload {
        AuthorizationPayload {
            token: self.credentials.token.clone(),
            sign: self.credentials.sign.clone(),
            cuit,
        }
    }
}

impl From<LoginResponse> for AccessTicket {
    fn from(response: LoginResponse) -> Self {
        Self::new(response.header, response.credentials)
    }
}
