//! Credential store.

use async_trait::async_trait;
use mockall::automock;

use crate::{cuit::Cuit, store::StoreError, ticket::AccessTicket};

/// Durable storage holding at most one ticket per tenant and service.
#[automock]
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Read the stored ticket `cuit` holds for `service`, if any.
    ///
    /// Absence is `Ok(None)`; an unreadable or malformed record is an error.
    async fn load(&self, cuit: Cuit, service: &str) -> Result<Option<AccessTicket>, StoreError>;

    /// Replace the stored ticket `cuit` holds for `service`.
    async fn save(&self, cuit: Cuit, service: &str, ticket: &AccessTicket)
    -> Result<(), StoreError>;
}
