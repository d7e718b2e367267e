//! Credential store errors.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures reading or writing ticket records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record exists but could not be read.
    #[error("failed to read ticket record at {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A record exists but is not a valid ticket.
    #[error("malformed ticket record at {}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The ticket could not be serialized.
    #[error("failed to serialize ticket record")]
    Serialize(#[source] serde_json::Error),

    /// The record could not be written.
    #[error("failed to write ticket record at {}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
