//! Service environments.

/// Which ARCA deployment to talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Environment {
    /// Homologation (test) services.
    Testing,

    /// Production services.
    Production,
}

impl Environment {
    /// `LoginCms` endpoint of the authentication service.
    #[must_use]
    pub const fn wsaa_url(self) -> &'static str {
        match self {
            Self::Testing => "https://wsaahomo.afip.gov.ar/ws/services/LoginCms",
            Self::Production => "https://wsaa.afip.gov.ar/ws/services/LoginCms",
        }
    }

    /// Endpoint of the electronic invoicing service.
    #[must_use]
    pub const fn wsfe_url(self) -> &'static str {
        match self {
            Self::Testing => "https://wswhomo.afip.gov.ar/wsfev1/service.asmx",
            Self::Production => "https://servicios1.afip.gov.ar/wsfev1/service.asmx",
        }
    }
}
