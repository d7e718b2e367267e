//! CMS signing through the `openssl` command line tool.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Stdio,
};

use arca::signer::{Identity, SignedRequest, Signer, SignerError};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use tokio::{fs, io::AsyncWriteExt, process::Command};
use tracing::{debug, instrument};

/// Default program name, resolved through `PATH`.
pub const DEFAULT_OPENSSL: &str = "openssl";

/// Signs ticket requests with `openssl cms -sign`.
#[derive(Debug, Clone)]
pub struct OpensslSigner {
    program: PathBuf,
}

impl OpensslSigner {
    /// Signer running `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments producing a DER-encoded, attached CMS signature.
    fn arguments(identity: &Identity) -> Vec<&OsStr> {
        vec![
            OsStr::new("cms"),
            OsStr::new("-sign"),
            OsStr::new("-signer"),
            identity.certificate.as_os_str(),
            OsStr::new("-inkey"),
            identity.private_key.as_os_str(),
            OsStr::new("-nodetach"),
            OsStr::new("-binary"),
            OsStr::new("-outform"),
            OsStr::new("DER"),
        ]
    }
}

impl Default for OpensslSigner {
    fn default() -> Self {
        Self::new(DEFAULT_OPENSSL)
    }
}

#[async_trait]
impl Signer for OpensslSigner {
    #[instrument(skip_all, fields(program = %self.program.display()))]
    async fn sign(
        &self,
        document: &str,
        identity: &Identity,
    ) -> Result<SignedRequest, SignerError> {
        ensure_readable(&identity.certificate, "certificate").await?;
        ensure_readable(&identity.private_key, "private key").await?;

        let mut child = Command::new(&self.program)
            .args(Self::arguments(identity))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(document.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(SignerError::Failed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(SignerError::Failed("empty signature".to_string()));
        }

        debug!(bytes = output.stdout.len(), "signed ticket request");

        Ok(SignedRequest::new(STANDARD.encode(&output.stdout)))
    }
}

async fn ensure_readable(path: &Path, what: &str) -> Result<(), SignerError> {
    match fs::try_exists(path).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(SignerError::InvalidIdentity(format!(
            "{what} not found: {}",
            path.display()
        ))),
        Err(error) => Err(SignerError::InvalidIdentity(format!(
            "{what} not accessible: {}: {error}",
            path.display()
        ))),
    }
}
