//! Storage & Signer Config

use std::path::PathBuf;

use arca::store::DEFAULT_CREDENTIALS_DIR;
use clap::Args;

use crate::signer::DEFAULT_OPENSSL;

/// Credential store settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding persisted access tickets
    #[arg(long, env = "ARCA_CREDENTIALS_DIR", default_value = DEFAULT_CREDENTIALS_DIR)]
    pub credentials_dir: PathBuf,
}

/// Request signer settings.
#[derive(Debug, Args)]
pub struct SignerConfig {
    /// `openssl` binary used to sign ticket requests
    #[arg(long = "openssl", env = "ARCA_OPENSSL_BIN", default_value = DEFAULT_OPENSSL)]
    pub openssl_bin: PathBuf,
}
