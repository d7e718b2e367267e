//! Endpoints Config

use clap::Args;

use crate::environment::Environment;

/// Remote service settings.
#[derive(Debug, Args)]
pub struct EndpointsConfig {
    /// Service environment (testing, production)
    #[arg(long, env = "ARCA_ENVIRONMENT", value_enum, default_value_t = Environment::Testing)]
    pub environment: Environment,

    /// Service the access ticket is requested for
    #[arg(long, env = "ARCA_SERVICE", default_value = arca::request::WSFE)]
    pub service: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "ARCA_REQUEST_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub request_timeout_seconds: u64,
}
