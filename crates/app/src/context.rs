//! App Context

use std::{sync::Arc, time::Duration};

use arca::{Cuit, TicketManager, store::FsTicketStore};
use thiserror::Error;

use crate::{config::AppConfig, signer::OpensslSigner, wsaa::WsaaClient, wsfe::WsfeClient};

/// Errors raised while wiring the application.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The shared HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Services wired from an [`AppConfig`].
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Tenant every command acts for.
    pub cuit: Cuit,

    /// Access ticket lifecycle for the configured service.
    pub tickets: Arc<TicketManager>,

    /// Invoicing service client.
    pub wsfe: WsfeClient,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.endpoints.request_timeout_seconds))
            .build()
            .map_err(AppInitError::HttpClient)?;

        let environment = config.endpoints.environment;

        let store = FsTicketStore::new(&config.storage.credentials_dir);
        let signer = OpensslSigner::new(&config.signer.openssl_bin);
        let login = WsaaClient::new(environment.wsaa_url(), http.clone());

        let tickets = TicketManager::new(
            config.tenant.identity(),
            Arc::new(store),
            Arc::new(signer),
            Arc::new(login),
        )
        .with_service(config.endpoints.service.clone());

        Ok(Self {
            cuit: config.tenant.cuit,
            tickets: Arc::new(tickets),
            wsfe: WsfeClient::new(environment.wsfe_url(), http),
        })
    }
}
