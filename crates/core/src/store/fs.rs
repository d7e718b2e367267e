//! Filesystem-backed credential store.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;
use uuid::Uuid;

use crate::{
    cuit::Cuit,
    store::{StoreError, TicketStore},
    ticket::AccessTicket,
};

/// Default directory for ticket records.
pub const DEFAULT_CREDENTIALS_DIR: &str = "credentials";

/// Stores one JSON record per tenant and service under a root directory.
///
/// Records live at `<root>/TA-<cuit>-<service>.json`. Writes go through a
/// temporary file in the same directory that is renamed over the record, so
/// readers see either the previous record or the new one.
#[derive(Debug, Clone)]
pub struct FsTicketStore {
    root: PathBuf,
}

impl FsTicketStore {
    /// Store keeping its records under `root`, created on first save.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the records.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the record `cuit` holds for `service`.
    #[must_use]
    pub fn path_for(&self, cuit: Cuit, service: &str) -> PathBuf {
        self.root.join(file_name(cuit, service))
    }

    fn temp_path_for(&self, cuit: Cuit, service: &str) -> PathBuf {
        self.root.join(format!(
            ".{}.{}.tmp",
            file_name(cuit, service),
            Uuid::now_v7().simple()
        ))
    }
}

#[async_trait]
impl TicketStore for FsTicketStore {
    async fn load(&self, cuit: Cuit, service: &str) -> Result<Option<AccessTicket>, StoreError> {
        let path = self.path_for(cuit, service);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(%cuit, path = %path.display(), "no stored ticket");

                return Ok(None);
            }
            Err(source) => return Err(StoreError::Unreadable { path, source }),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::Malformed { path, source })
    }

    async fn save(
        &self,
        cuit: Cuit,
        service: &str,
        ticket: &AccessTicket,
    ) -> Result<(), StoreError> {
        let path = self.path_for(cuit, service);
        let data = serde_json::to_vec_pretty(ticket).map_err(StoreError::Serialize)?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StoreError::Persist {
                path: path.clone(),
                source,
            })?;

        let temp_path = self.temp_path_for(cuit, service);

        if let Err(source) = write_and_rename(&temp_path, &path, &data).await {
            // Best-effort cleanup.
            let _cleanup = fs::remove_file(&temp_path).await;

            return Err(StoreError::Persist { path, source });
        }

        debug!(%cuit, path = %path.display(), "stored ticket");

        Ok(())
    }
}

fn file_name(cuit: Cuit, service: &str) -> String {
    format!("TA-{cuit}-{service}.json")
}

async fn write_and_rename(temp_path: &Path, path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;

    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(temp_path, path).await
}
