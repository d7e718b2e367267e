//! Per-call authorization payload.

use std::fmt;

use serde::Serialize;

use crate::cuit::Cuit;

/// Credentials attached to an authenticated remote call.
///
/// Serializes with the element names of the `Auth` block (`Token`, `Sign`,
/// `Cuit`).
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthorizationPayload {
    /// Session token of the current ticket.
    pub token: String,

    /// Signature matching `token`.
    pub sign: String,

    /// Tenant the call is made for.
    pub cuit: Cuit,
}

impl fmt::Debug for AuthorizationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationPayload")
            .field("token", &"**redacted**")
            .field("sign", &"**redacted**")
            .field("cuit", &self.cuit)
            .finish()
    }
}
