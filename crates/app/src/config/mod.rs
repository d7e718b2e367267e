//! Application configuration module

use clap::Args;

pub use crate::config::{
    endpoints::EndpointsConfig,
    logging::{LogFormat, LoggingConfig},
    storage::{SignerConfig, StorageConfig},
    tenant::TenantConfig,
};

mod endpoints;
mod logging;
mod storage;
mod tenant;

/// Settings shared by every `arca-app` command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Tenant identity settings.
    #[command(flatten)]
    pub tenant: TenantConfig,

    /// Remote service settings.
    #[command(flatten)]
    pub endpoints: EndpointsConfig,

    /// Credential store settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Request signer settings.
    #[command(flatten)]
    pub signer: SignerConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}
