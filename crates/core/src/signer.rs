//! Request signing contract.

use std::{fmt, io, path::PathBuf};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

/// X.509 identity used to sign ticket requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// PEM certificate issued for the tenant.
    pub certificate: PathBuf,

    /// PEM private key matching `certificate`.
    pub private_key: PathBuf,
}

/// Envelope-ready signed request, base64 encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedRequest(String);

impl SignedRequest {
    /// Wrap an already base64-encoded signature.
    #[must_use]
    pub const fn new(encoded: String) -> Self {
        Self(encoded)
    }

    /// Encoded signature, as sent to the issuer.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedRequest({} bytes)", self.0.len())
    }
}

/// Errors produced while signing a request.
#[derive(Debug, Error)]
pub enum SignerError {
    /// Certificate or private key could not be used.
    #[error("invalid signing identity: {0}")]
    InvalidIdentity(String),

    /// The signing backend could not be run.
    #[error("signing backend i/o error")]
    Io(#[from] io::Error),

    /// The signing backend ran but did not produce a signature.
    #[error("signing failed: {0}")]
    Failed(String),
}

/// Produces signed payloads from canonical request documents.
#[automock]
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign `document` with `identity`.
    async fn sign(&self, document: &str, identity: &Identity)
    -> Result<SignedRequest, SignerError>;
}
