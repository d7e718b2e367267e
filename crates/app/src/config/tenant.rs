//! Tenant Config

use std::path::PathBuf;

use arca::{Cuit, signer::Identity};
use clap::Args;

/// Tenant identity settings.
#[derive(Debug, Args)]
pub struct TenantConfig {
    /// Tenant CUIT (11 digits)
    #[arg(long, env = "ARCA_CUIT")]
    pub cuit: Cuit,

    /// PEM certificate issued for the tenant
    #[arg(long, env = "ARCA_CERTIFICATE")]
    pub certificate: PathBuf,

    /// PEM private key matching the certificate
    #[arg(long, env = "ARCA_PRIVATE_KEY")]
    pub private_key: PathBuf,
}

impl TenantConfig {
    /// Signing identity built from the configured key pair.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            certificate: self.certificate.clone(),
            private_key: self.private_key.clone(),
        }
    }
}
