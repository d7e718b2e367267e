use arca::{AccessTicket, TicketManagerError};
use arca_app::context::AppContext;
use tracing::{info, warn};

use super::describe;

pub(crate) async fn run(context: &AppContext) -> Result<(), String> {
    let ticket = valid_ticket(context).await?;
    let payload = ticket.to_authorization_payload(context.cuit);

    let json = serde_json::to_string_pretty(&payload)
        .map_err(|error| format!("failed to encode authorization payload: {error}"))?;

    info!(expiration_time = %ticket.expiration_time(), "access ticket ready");

    println!("{json}");

    Ok(())
}

/// Fetch a valid ticket, falling back to a fresh one that could not be stored.
pub(crate) async fn valid_ticket(context: &AppContext) -> Result<AccessTicket, String> {
    match context.tickets.get_valid_ticket(context.cuit).await {
        Ok(ticket) => Ok(ticket),
        Err(error @ TicketManagerError::Persist { .. }) => {
            warn!(error = %describe(&error), "using access ticket that was not stored");

            error
                .into_unpersisted_ticket()
                .ok_or_else(|| "access ticket missing from persist error".to_string())
        }
        Err(error) => Err(describe(&error)),
    }
}
