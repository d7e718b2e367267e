//! Credential Store

mod errors;
mod fs;
mod service;

pub use errors::StoreError;
pub use fs::{DEFAULT_CREDENTIALS_DIR, FsTicketStore};
pub use service::*;
